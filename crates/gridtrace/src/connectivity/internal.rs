//! Connectivity between two terminals of the same piece of equipment.

use crate::connectivity::ConnectivityResult;
use crate::connectivity::transformer::transformer_phase_paths;
use crate::network::{EquipmentKind, Network, TerminalId};
use crate::phase::{NominalPhasePath, PhaseCode, SinglePhaseKind};

/// The phase paths from `terminal` to `other_terminal`, restricted to source
/// phases in `include_phases`.
///
/// Both terminals must belong to the same equipment; otherwise (or when they
/// are the same terminal) the result has no paths.
///
/// - transformers map windings through [`transformer_phase_paths`], keeping
///   `NONE -> N` introduced neutrals regardless of `include_phases`;
/// - from a shunt compensator's grounding terminal every phase on the other
///   terminal is fed from `NONE`, and into it only `NONE -> N` exists;
/// - everything else passes the common phases straight through.
pub fn between(
    network: &Network,
    terminal: TerminalId,
    other_terminal: TerminalId,
    include_phases: &[SinglePhaseKind],
) -> ConnectivityResult {
    let from = network.terminal(terminal);
    let to = network.terminal(other_terminal);
    if terminal == other_terminal || from.equipment != to.equipment {
        return ConnectivityResult::new(terminal, other_terminal, Vec::new());
    }

    let paths = match network.equipment(from.equipment).kind {
        EquipmentKind::PowerTransformer => transformer_phase_paths(from.phases, to.phases)
            .iter()
            .copied()
            .filter(|p| p.from == SinglePhaseKind::NONE || include_phases.contains(&p.from))
            .collect(),
        EquipmentKind::ShuntCompensator { .. } => {
            match network.grounding_terminal(from.equipment) {
                Some(ground) if ground == terminal => to
                    .phases
                    .single_phases()
                    .iter()
                    .map(|p| NominalPhasePath::new(SinglePhaseKind::NONE, *p))
                    .collect(),
                Some(ground) if ground == other_terminal => {
                    vec![NominalPhasePath::new(SinglePhaseKind::NONE, SinglePhaseKind::N)]
                }
                _ => straight_paths(from.phases, to.phases, include_phases),
            }
        }
        EquipmentKind::EnergySource
        | EquipmentKind::Junction
        | EquipmentKind::AcLineSegment
        | EquipmentKind::Switch { .. }
        | EquipmentKind::EnergyConsumer => straight_paths(from.phases, to.phases, include_phases),
    };

    ConnectivityResult::new(terminal, other_terminal, paths)
}

/// [`between`] with every phase of `terminal` included.
pub fn between_all(network: &Network, terminal: TerminalId, other_terminal: TerminalId) -> ConnectivityResult {
    let phases = network.terminal(terminal).phases.single_phases();
    between(network, terminal, other_terminal, phases)
}

pub(crate) fn straight_paths(
    from: PhaseCode,
    to: PhaseCode,
    include_phases: &[SinglePhaseKind],
) -> Vec<NominalPhasePath> {
    from.single_phases()
        .iter()
        .copied()
        .filter(|p| to.contains(*p) && include_phases.contains(p))
        .map(NominalPhasePath::straight)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{EquipmentSpec, NetworkDocument};
    use SinglePhaseKind as P;

    fn single(kind: EquipmentKind, from: PhaseCode, to: PhaseCode) -> Network {
        Network::from_document(&NetworkDocument::new().with_equipment(
            EquipmentSpec::new("eq", kind)
                .with_terminal(from, "n1")
                .with_terminal(to, "n2"),
        ))
        .unwrap()
    }

    fn terminals(network: &Network) -> (TerminalId, TerminalId) {
        let eq = network.equipment_by_mrid("eq").unwrap();
        (eq.terminals[0], eq.terminals[1])
    }

    #[test]
    fn test_straight_restricted_to_included_phases() {
        let network = single(EquipmentKind::AcLineSegment, PhaseCode::ABC, PhaseCode::ABC);
        let (t1, t2) = terminals(&network);
        let result = between(&network, t1, t2, &[P::A, P::B]);
        assert_eq!(result.from_terminal, t1);
        assert_eq!(result.to_terminal, t2);
        assert_eq!(
            result.nominal_phase_paths,
            vec![NominalPhasePath::straight(P::A), NominalPhasePath::straight(P::B)]
        );
    }

    #[test]
    fn test_straight_is_intersection() {
        let network = single(EquipmentKind::Switch { normally_open: false, currently_open: false }, PhaseCode::ABCN, PhaseCode::BN);
        let (t1, t2) = terminals(&network);
        assert_eq!(between_all(&network, t1, t2).to_phases(), vec![P::B, P::N]);
    }

    #[test]
    fn test_transformer_uses_winding_table() {
        let network = single(EquipmentKind::PowerTransformer, PhaseCode::ABC, PhaseCode::ABCN);
        let (t1, t2) = terminals(&network);
        let result = between(&network, t1, t2, &[P::B]);
        assert_eq!(
            result.nominal_phase_paths,
            vec![
                NominalPhasePath::straight(P::B),
                NominalPhasePath::new(P::NONE, P::N)
            ]
        );
    }

    #[test]
    fn test_shunt_from_grounding_terminal() {
        let network = single(
            EquipmentKind::ShuntCompensator {
                grounding_terminal: Some(1),
            },
            PhaseCode::N,
            PhaseCode::ABC,
        );
        let (ground, line) = terminals(&network);
        let result = between_all(&network, ground, line);
        assert_eq!(
            result.nominal_phase_paths,
            vec![
                NominalPhasePath::new(P::NONE, P::A),
                NominalPhasePath::new(P::NONE, P::B),
                NominalPhasePath::new(P::NONE, P::C),
            ]
        );
    }

    #[test]
    fn test_shunt_into_grounding_terminal() {
        let network = single(
            EquipmentKind::ShuntCompensator {
                grounding_terminal: Some(2),
            },
            PhaseCode::ABC,
            PhaseCode::N,
        );
        let (line, ground) = terminals(&network);
        assert_eq!(
            between_all(&network, line, ground).nominal_phase_paths,
            vec![NominalPhasePath::new(P::NONE, P::N)]
        );
    }

    #[test]
    fn test_shunt_without_grounding_is_straight() {
        let network = single(
            EquipmentKind::ShuntCompensator {
                grounding_terminal: None,
            },
            PhaseCode::ABC,
            PhaseCode::AB,
        );
        let (t1, t2) = terminals(&network);
        assert_eq!(between_all(&network, t1, t2).from_phases(), vec![P::A, P::B]);
    }

    #[test]
    fn test_different_equipment_or_same_terminal_has_no_paths() {
        let network = Network::from_document(
            &NetworkDocument::new()
                .with_equipment(EquipmentSpec::new("a", EquipmentKind::Junction).with_terminal(PhaseCode::A, "n"))
                .with_equipment(EquipmentSpec::new("b", EquipmentKind::Junction).with_terminal(PhaseCode::A, "n")),
        )
        .unwrap();
        let a = network.equipment_by_mrid("a").unwrap().terminals[0];
        let b = network.equipment_by_mrid("b").unwrap().terminals[0];
        assert!(between_all(&network, a, b).is_empty());
        assert!(between_all(&network, a, a).is_empty());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let network = single(EquipmentKind::PowerTransformer, PhaseCode::BC, PhaseCode::XYN);
        let (t1, t2) = terminals(&network);
        let first = between_all(&network, t1, t2);
        for _ in 0..5 {
            assert_eq!(between_all(&network, t1, t2), first);
        }
    }
}
