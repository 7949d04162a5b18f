//! Traces that answer whole-network questions and write results back.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::network::{EquipmentId, FeederDirection, FeederId, Network, NetworkState, TerminalId};
use crate::trace::{
    ActionType, EquipmentTree, EquipmentTreeBuilder, NetworkTrace, NetworkTraceStep, StepPath, TraceOptions,
    direction_data,
};
use crate::traversal::{AdmitAll, StepContext};

/// Assign feeder directions to every terminal reachable from a feeder head,
/// replacing any directions previously assigned for `state`.
///
/// Terminals a trace leaves equipment through are downstream; terminals it
/// enters equipment through are upstream. A terminal reached both ways (a
/// loop, or two feeders meeting) ends up with both.
pub fn assign_directions(network: &mut Network, state: NetworkState) -> Result<()> {
    network.clear_directions(state);

    let assigned: RefCell<BTreeMap<TerminalId, FeederDirection>> = RefCell::new(BTreeMap::new());
    {
        let network: &Network = network;
        let options = TraceOptions::default().with_state(state);

        for feeder in network.feeders() {
            let head = network.terminal(feeder.head_terminal);
            if head.node.is_none() {
                tracing::warn!(feeder = %feeder.mrid, terminal = %head.mrid, "feeder head terminal is not connected");
            }
            tracing::debug!(feeder = %feeder.mrid, "assigning feeder directions");

            let mut trace = NetworkTrace::new(network, &options, direction_data);
            trace
                .set_visit_tracker(AdmitAll)
                .add_stop_condition(|step: &NetworkTraceStep<FeederDirection>, _: &StepContext| {
                    network.is_feeder_head_terminal(step.path.to_terminal)
                })
                .add_queue_condition(
                    |next: &NetworkTraceStep<FeederDirection>, _: &StepContext, _: &NetworkTraceStep<FeederDirection>, _: &StepContext| {
                        !assigned
                            .borrow()
                            .get(&next.path.to_terminal)
                            .is_some_and(|d| d.contains(next.data))
                    },
                )
                .add_step_action(|step: &NetworkTraceStep<FeederDirection>, _: &StepContext| {
                    let mut assigned = assigned.borrow_mut();
                    let entry = assigned.entry(step.path.to_terminal).or_default();
                    *entry = entry.plus(step.data);
                });
            trace.run_from_terminal(head.id, None, FeederDirection::Downstream, false)?;
        }
    }

    for (terminal, direction) in assigned.into_inner() {
        network.add_direction(terminal, state, direction);
    }
    Ok(())
}

/// Assign each piece of equipment to the feeders that reach it, replacing
/// any assignment previously made for `state`. Traces stop at open switches
/// and at the heads of other feeders.
pub fn assign_feeders(network: &mut Network, state: NetworkState) -> Result<()> {
    network.clear_feeders(state);

    let mut assignments: Vec<(FeederId, BTreeSet<EquipmentId>)> = Vec::new();
    {
        let network: &Network = network;
        let options = TraceOptions::default()
            .with_state(state)
            .with_action_type(ActionType::FirstStepOnEquipment);

        for feeder in network.feeders() {
            let reached = RefCell::new(BTreeSet::new());
            let mut trace = NetworkTrace::new(network, &options, |_: &NetworkTraceStep<()>, _: &StepPath| ());
            trace
                .add_stop_condition(|step: &NetworkTraceStep<()>, _: &StepContext| {
                    network.is_feeder_head_terminal(step.path.to_terminal)
                })
                .add_step_action(|step: &NetworkTraceStep<()>, _: &StepContext| {
                    reached.borrow_mut().insert(step.path.to_equipment);
                });
            trace.run_from_terminal(feeder.head_terminal, None, (), false)?;
            drop(trace);

            let reached = reached.into_inner();
            tracing::debug!(feeder = %feeder.mrid, equipment = reached.len(), "assigned feeder");
            assignments.push((feeder.id, reached));
        }
    }

    for (feeder, equipment) in assignments {
        for eq in equipment {
            network.assign_feeder(eq, state, feeder);
        }
    }
    Ok(())
}

/// Equipment downstream of `from`, in the order first reached, `from` included.
///
/// Relies on directions from [`assign_directions`] for `options.state`;
/// `options.direction` is overridden.
pub fn downstream_equipment(network: &Network, from: EquipmentId, options: &TraceOptions) -> Result<Vec<EquipmentId>> {
    let options = options.clone().with_direction(FeederDirection::Downstream);
    let reached = RefCell::new(Vec::new());
    let mut trace = NetworkTrace::new(network, &options, |_: &NetworkTraceStep<()>, _: &StepPath| ());
    trace
        .add_start_equipment(from, ())
        .add_step_action(|step: &NetworkTraceStep<()>, _: &StepContext| {
            let mut reached = reached.borrow_mut();
            if !reached.contains(&step.path.to_equipment) {
                reached.push(step.path.to_equipment);
            }
        });
    trace.run(true)?;
    drop(trace);
    Ok(reached.into_inner())
}

/// The tree of equipment reached from `from` under `options`.
pub fn equipment_tree(network: &Network, from: EquipmentId, options: &TraceOptions) -> Result<EquipmentTree> {
    let builder = EquipmentTreeBuilder::new();
    let mut trace = NetworkTrace::new(network, options, |_: &NetworkTraceStep<()>, _: &StepPath| ());
    trace.add_start_equipment(from, ()).add_tree_builder(&builder);
    trace.run(true)?;
    Ok(builder.tree())
}
