use std::collections::HashSet;

use crate::connectivity::ConnectivityResult;
use crate::network::{EquipmentId, Network, TerminalId};
use crate::phase::{NominalPhasePath, SinglePhaseKind};
use crate::traversal::{StepContext, VisitTracker};

/// One hop of a network trace, from a terminal to a terminal.
///
/// A hop between terminals of the same equipment is traced internally; one
/// across a connectivity node into other equipment is traced externally.
/// Start steps go from a terminal to itself and count as internal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPath {
    pub from_terminal: TerminalId,
    pub to_terminal: TerminalId,
    pub from_equipment: EquipmentId,
    pub to_equipment: EquipmentId,
    pub nominal_phase_paths: Vec<NominalPhasePath>,
}

impl StepPath {
    pub fn start(network: &Network, terminal: TerminalId, phases: &[SinglePhaseKind]) -> Self {
        let equipment = network.terminal(terminal).equipment;
        Self {
            from_terminal: terminal,
            to_terminal: terminal,
            from_equipment: equipment,
            to_equipment: equipment,
            nominal_phase_paths: phases.iter().copied().map(NominalPhasePath::straight).collect(),
        }
    }

    pub fn from_connectivity(network: &Network, result: ConnectivityResult) -> Self {
        Self {
            from_terminal: result.from_terminal,
            to_terminal: result.to_terminal,
            from_equipment: network.terminal(result.from_terminal).equipment,
            to_equipment: network.terminal(result.to_terminal).equipment,
            nominal_phase_paths: result.nominal_phase_paths,
        }
    }

    pub fn traced_internally(&self) -> bool {
        self.from_equipment == self.to_equipment
    }

    pub fn traced_externally(&self) -> bool {
        !self.traced_internally()
    }

    /// Phases arriving at `to_terminal`, in path order without repeats.
    pub fn to_phases(&self) -> Vec<SinglePhaseKind> {
        let mut phases = Vec::with_capacity(self.nominal_phase_paths.len());
        for path in &self.nominal_phase_paths {
            if !phases.contains(&path.to) {
                phases.push(path.to);
            }
        }
        phases
    }
}

/// The item a network trace visits: a hop plus a caller computed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkTraceStep<D> {
    pub path: StepPath,
    /// Terminal hops since the start item.
    pub num_terminal_steps: usize,
    /// External hops since the start item.
    pub num_equipment_steps: usize,
    pub data: D,
}

impl<D> NetworkTraceStep<D> {
    pub fn start(path: StepPath, data: D) -> Self {
        Self {
            path,
            num_terminal_steps: 0,
            num_equipment_steps: 0,
            data,
        }
    }

    pub(crate) fn next(&self, path: StepPath, data: D) -> Self {
        let external = usize::from(path.traced_externally());
        Self {
            path,
            num_terminal_steps: self.num_terminal_steps + 1,
            num_equipment_steps: self.num_equipment_steps + external,
            data,
        }
    }
}

/// Visits a step only if it reaches a (terminal, phase) pair not seen
/// before on this walk.
#[derive(Debug, Clone, Default)]
pub struct TerminalPhaseTracker {
    visited: HashSet<(TerminalId, SinglePhaseKind)>,
}

impl TerminalPhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_visited(&self, terminal: TerminalId, phase: SinglePhaseKind) -> bool {
        self.visited.contains(&(terminal, phase))
    }
}

impl<D> VisitTracker<NetworkTraceStep<D>> for TerminalPhaseTracker {
    fn visit(&mut self, step: &NetworkTraceStep<D>, _context: &StepContext) -> bool {
        let mut any_new = false;
        for phase in step.path.to_phases() {
            any_new |= self.visited.insert((step.path.to_terminal, phase));
        }
        any_new
    }

    fn clear(&mut self) {
        self.visited.clear();
    }

    fn fork(&self) -> Box<dyn VisitTracker<NetworkTraceStep<D>>> {
        Box::new(self.clone())
    }
}
