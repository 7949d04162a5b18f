//! Nominal phase connectivity between terminals.
//!
//! [`between`] answers the question for two terminals of the same piece of
//! equipment; [`terminal_connectivity`] and [`connected_terminals`] answer it
//! across a connectivity node, resolving `X`/`Y` laterals with
//! [`XyCandidatePhasePaths`] where one side is unphased.

mod connected;
mod internal;
mod transformer;
mod xy;

use serde::{Deserialize, Serialize};

use crate::network::TerminalId;
use crate::phase::{NominalPhasePath, SinglePhaseKind};

pub use connected::{connected_terminals, find_xy_phases, terminal_connectivity};
pub use internal::{between, between_all};
pub use transformer::transformer_phase_paths;
pub use xy::XyCandidatePhasePaths;

/// The phases that continue from `from_terminal` to `to_terminal`.
///
/// Each source phase appears at most once, except [`SinglePhaseKind::NONE`]
/// which marks a phase with no inbound source (a transformer introduced
/// neutral, or the grounded side of a shunt compensator).
///
/// ```
/// use gridtrace::v1::{ConnectivityResult, NominalPhasePath, SinglePhaseKind as P, TerminalId};
///
/// let result = ConnectivityResult::new(TerminalId(0), TerminalId(1), vec![NominalPhasePath::new(P::B, P::X)]);
/// assert_eq!(result.from_phases(), vec![P::B]);
/// assert_eq!(result.to_phases(), vec![P::X]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityResult {
    pub from_terminal: TerminalId,
    pub to_terminal: TerminalId,
    pub nominal_phase_paths: Vec<NominalPhasePath>,
}

impl ConnectivityResult {
    pub fn new(from_terminal: TerminalId, to_terminal: TerminalId, nominal_phase_paths: Vec<NominalPhasePath>) -> Self {
        Self {
            from_terminal,
            to_terminal,
            nominal_phase_paths,
        }
    }

    pub fn from_phases(&self) -> Vec<SinglePhaseKind> {
        self.nominal_phase_paths.iter().map(|p| p.from).collect()
    }

    pub fn to_phases(&self) -> Vec<SinglePhaseKind> {
        self.nominal_phase_paths.iter().map(|p| p.to).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nominal_phase_paths.is_empty()
    }
}
