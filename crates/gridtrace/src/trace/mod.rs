//! Network traces: the traversal engine walking terminal to terminal.
//!
//! A [`NetworkTrace`] visits [`NetworkTraceStep`]s. After an internal step
//! (including a start step) it crosses the connectivity node into other
//! equipment; after an external step it moves through the equipment to its
//! other terminals. Which phases survive each hop comes from the
//! [`connectivity`](crate::connectivity) resolver.

mod assign;
pub mod conditions;
mod options;
mod step;
mod tree;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

pub use assign::{assign_directions, assign_feeders, downstream_equipment, equipment_tree};
pub use options::{ActionType, TraceOptions};
pub use step::{NetworkTraceStep, StepPath, TerminalPhaseTracker};
pub use tree::{EquipmentTree, EquipmentTreeBuilder, TreeCursor, TreeNode, TreeNodeDocument, TreeNodeId};

use crate::connectivity::{between, connected_terminals};
use crate::error::{Error, Result};
use crate::network::{EquipmentId, FeederDirection, Network, TerminalId};
use crate::phase::{PhaseCode, SinglePhaseKind};
use crate::traversal::{
    BranchingQueueSink, ContextValueComputer, QueueCondition, QueueSink, QueueType, StepAction, StepContext,
    StopCondition, Traversal, VisitTracker,
};

type Fault = Rc<RefCell<Option<Error>>>;

/// A traversal over a network, carrying a payload `D` computed per step.
///
/// ```
/// use gridtrace::v1::*;
///
/// let network = Network::from_document(
///     &NetworkDocument::new()
///         .with_equipment(EquipmentSpec::new("src", EquipmentKind::EnergySource).with_terminal(PhaseCode::ABC, "n0"))
///         .with_equipment(
///             EquipmentSpec::new("line", EquipmentKind::AcLineSegment)
///                 .with_terminal(PhaseCode::ABC, "n0")
///                 .with_terminal(PhaseCode::AB, "n1"),
///         ),
/// )
/// .unwrap();
///
/// let src = network.equipment_by_mrid("src").unwrap().id;
/// let hops = std::cell::RefCell::new(Vec::new());
/// let mut trace = NetworkTrace::new(&network, &TraceOptions::default(), |step: &NetworkTraceStep<usize>, _: &StepPath| {
///     step.data + 1
/// });
/// trace
///     .add_start_equipment(src, 0)
///     .add_step_action(|step: &NetworkTraceStep<usize>, _: &StepContext| hops.borrow_mut().push(step.data));
/// trace.run(true).unwrap();
/// drop(trace);
///
/// assert_eq!(hops.into_inner(), vec![0, 1, 2]);
/// ```
pub struct NetworkTrace<'a, D> {
    network: &'a Network,
    traversal: Traversal<'a, NetworkTraceStep<D>>,
    fault: Fault,
    branch_hops: Rc<RefCell<HashSet<(TerminalId, TerminalId)>>>,
}

impl<'a, D: Clone + 'a> NetworkTrace<'a, D> {
    /// Build a trace over `network`. `compute_data` produces the payload of a
    /// step from the step it was queued from and the hop being taken.
    pub fn new(
        network: &'a Network,
        options: &TraceOptions,
        compute_data: impl Fn(&NetworkTraceStep<D>, &StepPath) -> D + 'a,
    ) -> Self {
        let fault: Fault = Rc::default();
        let branch_hops: Rc<RefCell<HashSet<(TerminalId, TerminalId)>>> = Rc::default();

        let queue_type = if options.branching {
            let fault = fault.clone();
            let branch_hops = branch_hops.clone();
            QueueType::branching(
                options.order,
                move |step: &NetworkTraceStep<D>, _: &StepContext, sink: &mut BranchingQueueSink<NetworkTraceStep<D>>| {
                    let next = match next_steps(network, step, &compute_data) {
                        Ok(next) => next,
                        Err(e) => return record_fault(&fault, e),
                    };
                    if next.len() == 1 {
                        next.into_iter().for_each(|s| sink.queue_item(s));
                        return;
                    }
                    // Each hop seeds at most one branch per run, so meshed
                    // networks cannot branch forever.
                    let mut hops = branch_hops.borrow_mut();
                    for s in next {
                        if hops.insert((s.path.from_terminal, s.path.to_terminal)) {
                            sink.queue_branch(s);
                        }
                    }
                },
            )
        } else {
            let fault = fault.clone();
            QueueType::basic(
                options.order,
                move |step: &NetworkTraceStep<D>, _: &StepContext, sink: &mut QueueSink<NetworkTraceStep<D>>| {
                    match next_steps(network, step, &compute_data) {
                        Ok(next) => next.into_iter().for_each(|s| sink.queue_item(s)),
                        Err(e) => record_fault(&fault, e),
                    }
                },
            )
        };

        let mut traversal = Traversal::new(queue_type);
        traversal.set_visit_tracker(TerminalPhaseTracker::new());

        let faulted = fault.clone();
        traversal.add_stop_condition(move |_: &NetworkTraceStep<D>, _: &StepContext| faulted.borrow().is_some());

        if options.stop_at_open {
            traversal.add_queue_condition(conditions::stop_at_open::<D>(network, options.state));
        }
        if let Some(direction) = options.direction {
            traversal.add_queue_condition(conditions::direction::<D>(network, options.state, direction));
        }
        if let Some(limit) = options.step_limit {
            traversal.add_stop_condition(move |_: &NetworkTraceStep<D>, ctx: &StepContext| ctx.step_number >= limit);
        }
        if options.action_type == ActionType::FirstStepOnEquipment {
            traversal.set_action_admission(|step: &NetworkTraceStep<D>, ctx: &StepContext| {
                ctx.is_start_item || step.path.traced_externally()
            });
        }

        Self {
            network,
            traversal,
            fault,
            branch_hops,
        }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Start at `terminal`, carrying `phases` (all of the terminal's phases
    /// when `None`).
    pub fn add_start_terminal(&mut self, terminal: TerminalId, phases: Option<PhaseCode>, data: D) -> &mut Self {
        let step = self.start_step(terminal, phases, data);
        self.traversal.add_start_item(step);
        self
    }

    /// Start at every terminal of `equipment`.
    pub fn add_start_equipment(&mut self, equipment: EquipmentId, data: D) -> &mut Self {
        let network = self.network;
        for terminal in &network.equipment(equipment).terminals {
            self.add_start_terminal(*terminal, None, data.clone());
        }
        self
    }

    pub fn add_stop_condition(&mut self, condition: impl StopCondition<NetworkTraceStep<D>> + 'a) -> &mut Self {
        self.traversal.add_stop_condition(condition);
        self
    }

    pub fn add_queue_condition(&mut self, condition: impl QueueCondition<NetworkTraceStep<D>> + 'a) -> &mut Self {
        self.traversal.add_queue_condition(condition);
        self
    }

    pub fn add_step_action(&mut self, action: impl StepAction<NetworkTraceStep<D>> + 'a) -> &mut Self {
        self.traversal.add_step_action(action);
        self
    }

    pub fn add_context_value_computer<C>(&mut self, computer: C) -> &mut Self
    where
        C: ContextValueComputer<NetworkTraceStep<D>> + 'a,
    {
        self.traversal.add_context_value_computer(computer);
        self
    }

    pub fn set_visit_tracker(&mut self, tracker: impl VisitTracker<NetworkTraceStep<D>> + 'static) -> &mut Self {
        self.traversal.set_visit_tracker(tracker);
        self
    }

    /// Register `builder` as both the action and the value computer it needs.
    pub fn add_tree_builder(&mut self, builder: &EquipmentTreeBuilder) -> &mut Self {
        self.traversal
            .add_context_value_computer(builder.clone())
            .add_step_action(builder.clone());
        self
    }

    /// Run from the registered start terminals.
    ///
    /// Fails with the first resolver error met while working out next
    /// steps; the results of the actions are then incomplete and should be
    /// discarded.
    pub fn run(&mut self, can_stop_on_start_item: bool) -> Result<()> {
        self.clear_run_state();
        tracing::debug!(
            start_items = self.traversal.start_items().len(),
            branching = self.traversal.queue_type().is_branching(),
            "running network trace"
        );
        self.traversal.run(None, can_stop_on_start_item);
        self.take_fault()
    }

    /// Run from `terminal` alone, ignoring registered start terminals.
    pub fn run_from_terminal(
        &mut self,
        terminal: TerminalId,
        phases: Option<PhaseCode>,
        data: D,
        can_stop_on_start_item: bool,
    ) -> Result<()> {
        let step = self.start_step(terminal, phases, data);
        self.clear_run_state();
        tracing::debug!(terminal = %self.network.terminal(terminal).mrid, "running network trace");
        self.traversal.run(step, can_stop_on_start_item);
        self.take_fault()
    }

    fn clear_run_state(&self) {
        self.fault.borrow_mut().take();
        self.branch_hops.borrow_mut().clear();
    }

    fn take_fault(&self) -> Result<()> {
        match self.fault.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start_step(&self, terminal: TerminalId, phases: Option<PhaseCode>, data: D) -> NetworkTraceStep<D> {
        let carried = self.network.terminal(terminal).phases;
        let phases: Vec<SinglePhaseKind> = phases
            .unwrap_or(carried)
            .single_phases()
            .iter()
            .copied()
            .filter(|p| carried.contains(*p))
            .collect();
        NetworkTraceStep::start(StepPath::start(self.network, terminal, &phases), data)
    }
}

fn record_fault(fault: &Fault, error: Error) {
    let mut slot = fault.borrow_mut();
    if slot.is_none() {
        *slot = Some(error);
    }
}

fn next_steps<D>(
    network: &Network,
    step: &NetworkTraceStep<D>,
    compute_data: &impl Fn(&NetworkTraceStep<D>, &StepPath) -> D,
) -> Result<Vec<NetworkTraceStep<D>>> {
    let terminal = step.path.to_terminal;
    let phases = step.path.to_phases();

    let paths: Vec<StepPath> = if step.path.traced_internally() {
        connected_terminals(network, terminal, &phases)?
            .into_iter()
            .map(|result| StepPath::from_connectivity(network, result))
            .collect()
    } else {
        network
            .other_terminals(terminal)
            .map(|other| between(network, terminal, other, &phases))
            .filter(|result| !result.is_empty())
            .map(|result| StepPath::from_connectivity(network, result))
            .collect()
    };

    Ok(paths
        .into_iter()
        .map(|path| {
            let data = compute_data(step, &path);
            step.next(path, data)
        })
        .collect())
}

/// Payload that records whether each step leads away from or towards the
/// start, as seen from the terminal it arrives at.
pub fn direction_data(_step: &NetworkTraceStep<FeederDirection>, path: &StepPath) -> FeederDirection {
    if path.traced_internally() {
        FeederDirection::Downstream
    } else {
        FeederDirection::Upstream
    }
}
