//! Nominal phases, phase codes, and phase paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A single electrical phase as carried by a terminal.
///
/// `X` and `Y` are placeholders for single-phase laterals whose physical
/// phase was never recorded. `NONE` is the explicit "no phase" sentinel: a
/// disconnected or undetermined phase, or the source of a neutral introduced
/// by a transformer winding.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SinglePhaseKind {
    NONE,
    A,
    B,
    C,
    N,
    X,
    Y,
}

impl SinglePhaseKind {
    /// `true` for the ambiguous lateral markers `X` and `Y`.
    pub fn is_xy(self) -> bool {
        matches!(self, SinglePhaseKind::X | SinglePhaseKind::Y)
    }

    /// `true` for the physical line phases `A`, `B` and `C`.
    pub fn is_line_phase(self) -> bool {
        matches!(
            self,
            SinglePhaseKind::A | SinglePhaseKind::B | SinglePhaseKind::C
        )
    }
}

impl fmt::Display for SinglePhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for SinglePhaseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(SinglePhaseKind::NONE),
            "A" => Ok(SinglePhaseKind::A),
            "B" => Ok(SinglePhaseKind::B),
            "C" => Ok(SinglePhaseKind::C),
            "N" => Ok(SinglePhaseKind::N),
            "X" => Ok(SinglePhaseKind::X),
            "Y" => Ok(SinglePhaseKind::Y),
            other => Err(Error::InvalidPhase(other.to_string())),
        }
    }
}

/// The set of nominal phases carried by a terminal.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseCode {
    NONE,
    A,
    B,
    C,
    N,
    AB,
    AC,
    AN,
    BC,
    BN,
    CN,
    ABC,
    ABN,
    ACN,
    BCN,
    ABCN,
    X,
    XN,
    XY,
    XYN,
    Y,
    YN,
}

impl PhaseCode {
    pub const ALL: [PhaseCode; 22] = [
        PhaseCode::NONE,
        PhaseCode::A,
        PhaseCode::B,
        PhaseCode::C,
        PhaseCode::N,
        PhaseCode::AB,
        PhaseCode::AC,
        PhaseCode::AN,
        PhaseCode::BC,
        PhaseCode::BN,
        PhaseCode::CN,
        PhaseCode::ABC,
        PhaseCode::ABN,
        PhaseCode::ACN,
        PhaseCode::BCN,
        PhaseCode::ABCN,
        PhaseCode::X,
        PhaseCode::XN,
        PhaseCode::XY,
        PhaseCode::XYN,
        PhaseCode::Y,
        PhaseCode::YN,
    ];

    /// The single phases making up this code, neutral last.
    pub fn single_phases(self) -> &'static [SinglePhaseKind] {
        use SinglePhaseKind as P;
        match self {
            PhaseCode::NONE => &[],
            PhaseCode::A => &[P::A],
            PhaseCode::B => &[P::B],
            PhaseCode::C => &[P::C],
            PhaseCode::N => &[P::N],
            PhaseCode::AB => &[P::A, P::B],
            PhaseCode::AC => &[P::A, P::C],
            PhaseCode::AN => &[P::A, P::N],
            PhaseCode::BC => &[P::B, P::C],
            PhaseCode::BN => &[P::B, P::N],
            PhaseCode::CN => &[P::C, P::N],
            PhaseCode::ABC => &[P::A, P::B, P::C],
            PhaseCode::ABN => &[P::A, P::B, P::N],
            PhaseCode::ACN => &[P::A, P::C, P::N],
            PhaseCode::BCN => &[P::B, P::C, P::N],
            PhaseCode::ABCN => &[P::A, P::B, P::C, P::N],
            PhaseCode::X => &[P::X],
            PhaseCode::XN => &[P::X, P::N],
            PhaseCode::XY => &[P::X, P::Y],
            PhaseCode::XYN => &[P::X, P::Y, P::N],
            PhaseCode::Y => &[P::Y],
            PhaseCode::YN => &[P::Y, P::N],
        }
    }

    /// Find the code carrying exactly the given phases. `NONE` entries are
    /// ignored; an empty set maps to [`PhaseCode::NONE`].
    pub fn from_single_phases(phases: impl IntoIterator<Item = SinglePhaseKind>) -> Option<Self> {
        let wanted: BTreeSet<SinglePhaseKind> = phases
            .into_iter()
            .filter(|p| *p != SinglePhaseKind::NONE)
            .collect();
        Self::ALL.into_iter().find(|code| {
            let have: BTreeSet<SinglePhaseKind> = code.single_phases().iter().copied().collect();
            have == wanted
        })
    }

    pub fn contains(self, phase: SinglePhaseKind) -> bool {
        self.single_phases().contains(&phase)
    }

    pub fn has_neutral(self) -> bool {
        self.contains(SinglePhaseKind::N)
    }

    /// `true` when any phase of this code is an `X`/`Y` marker.
    pub fn has_xy(self) -> bool {
        self.single_phases().iter().any(|p| p.is_xy())
    }

    /// The phases of this code other than the neutral.
    pub fn without_neutral(self) -> Vec<SinglePhaseKind> {
        self.single_phases()
            .iter()
            .copied()
            .filter(|p| *p != SinglePhaseKind::N)
            .collect()
    }
}

impl fmt::Display for PhaseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for PhaseCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.to_string() == wanted)
            .ok_or(Error::InvalidPhase(wanted))
    }
}

/// Phase `from` at one terminal is electrically continuous with phase `to`
/// at another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NominalPhasePath {
    pub from: SinglePhaseKind,
    pub to: SinglePhaseKind,
}

impl NominalPhasePath {
    pub fn new(from: SinglePhaseKind, to: SinglePhaseKind) -> Self {
        Self { from, to }
    }

    /// A path mapping a phase onto itself.
    pub fn straight(phase: SinglePhaseKind) -> Self {
        Self::new(phase, phase)
    }
}

impl fmt::Display for NominalPhasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SinglePhaseKind as P;

    #[test]
    fn test_single_phases_of_codes() {
        assert_eq!(PhaseCode::ABCN.single_phases(), &[P::A, P::B, P::C, P::N]);
        assert_eq!(PhaseCode::XY.single_phases(), &[P::X, P::Y]);
        assert!(PhaseCode::NONE.single_phases().is_empty());
    }

    #[test]
    fn test_from_single_phases_ignores_order_and_none() {
        assert_eq!(
            PhaseCode::from_single_phases([P::N, P::C, P::A, P::NONE]),
            Some(PhaseCode::ACN)
        );
        assert_eq!(
            PhaseCode::from_single_phases([P::Y, P::X]),
            Some(PhaseCode::XY)
        );
        assert_eq!(
            PhaseCode::from_single_phases(std::iter::empty()),
            Some(PhaseCode::NONE)
        );
    }

    #[test]
    fn test_from_single_phases_unknown_combination() {
        assert_eq!(PhaseCode::from_single_phases([P::A, P::X]), None);
    }

    #[test]
    fn test_every_code_roundtrips_through_its_phases() {
        for code in PhaseCode::ALL {
            let phases = code.single_phases().iter().copied();
            assert_eq!(PhaseCode::from_single_phases(phases), Some(code));
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("abcn".parse::<PhaseCode>().unwrap(), PhaseCode::ABCN);
        assert_eq!(PhaseCode::XYN.to_string(), "XYN");
        assert!("ABQ".parse::<PhaseCode>().is_err());
        assert_eq!("y".parse::<SinglePhaseKind>().unwrap(), P::Y);
        assert_eq!(P::NONE.to_string(), "NONE");
    }

    #[test]
    fn test_code_queries() {
        assert!(PhaseCode::XN.has_xy());
        assert!(!PhaseCode::ABC.has_xy());
        assert!(PhaseCode::BN.has_neutral());
        assert_eq!(PhaseCode::ABCN.without_neutral(), vec![P::A, P::B, P::C]);
    }

    #[test]
    fn test_phase_kind_queries() {
        assert!(P::X.is_xy());
        assert!(!P::A.is_xy());
        assert!(P::C.is_line_phase());
        assert!(!P::N.is_line_phase());
    }

    #[test]
    fn test_phase_code_serde_uses_names() {
        let json = serde_json::to_string(&PhaseCode::ABCN).unwrap();
        assert_eq!(json, "\"ABCN\"");
        let parsed: PhaseCode = serde_json::from_str("\"XY\"").unwrap();
        assert_eq!(parsed, PhaseCode::XY);
    }

    #[test]
    fn test_nominal_phase_path_display() {
        assert_eq!(NominalPhasePath::new(P::NONE, P::N).to_string(), "NONE->N");
        assert_eq!(NominalPhasePath::straight(P::B), NominalPhasePath::new(P::B, P::B));
    }
}
