//! Connectivity between terminals of different equipment meeting at a
//! connectivity node.

use std::collections::{BTreeMap, HashSet};

use crate::connectivity::ConnectivityResult;
use crate::connectivity::internal::{between_all, straight_paths};
use crate::connectivity::xy::{XyCandidatePhasePaths, is_valid_candidate};
use crate::error::Result;
use crate::network::{Network, TerminalId};
use crate::phase::{NominalPhasePath, SinglePhaseKind};

/// Connectivity from `terminal` to every other terminal on its connectivity
/// node, skipping those that share no phases.
pub fn connected_terminals(
    network: &Network,
    terminal: TerminalId,
    include_phases: &[SinglePhaseKind],
) -> Result<Vec<ConnectivityResult>> {
    let mut results = Vec::new();
    for other in network.connected_terminals(terminal) {
        let result = terminal_connectivity(network, terminal, other, include_phases)?;
        if !result.is_empty() {
            results.push(result);
        }
    }
    Ok(results)
}

/// The phase paths from `terminal` to `other_terminal` across a connectivity
/// node, restricted to source phases in `include_phases`.
///
/// When exactly one side carries `X`/`Y` markers they are resolved with
/// [`find_xy_phases`]; a marker that resolves to a phase the other side does
/// not carry (or to nothing) has no path.
pub fn terminal_connectivity(
    network: &Network,
    terminal: TerminalId,
    other_terminal: TerminalId,
    include_phases: &[SinglePhaseKind],
) -> Result<ConnectivityResult> {
    if terminal == other_terminal {
        return Ok(ConnectivityResult::new(terminal, other_terminal, Vec::new()));
    }

    let from = network.terminal(terminal).phases;
    let to = network.terminal(other_terminal).phases;

    let paths = match (from.has_xy(), to.has_xy()) {
        (true, false) => {
            let resolved = find_xy_phases(network, terminal)?;
            from.single_phases()
                .iter()
                .copied()
                .filter_map(|phase| {
                    let target = if phase.is_xy() { resolved[&phase] } else { phase };
                    (target != SinglePhaseKind::NONE && to.contains(target))
                        .then(|| NominalPhasePath::new(phase, target))
                })
                .filter(|path| include_phases.contains(&path.from))
                .collect()
        }
        (false, true) => {
            let resolved = find_xy_phases(network, other_terminal)?;
            from.single_phases()
                .iter()
                .copied()
                .filter(|phase| include_phases.contains(phase))
                .filter_map(|phase| {
                    let marker = to
                        .single_phases()
                        .iter()
                        .copied()
                        .find(|m| m.is_xy() && resolved[m] == phase);
                    match marker {
                        Some(marker) => Some(NominalPhasePath::new(phase, marker)),
                        None if to.contains(phase) => Some(NominalPhasePath::straight(phase)),
                        None => None,
                    }
                })
                .collect()
        }
        _ => straight_paths(from, to, include_phases),
    };

    Ok(ConnectivityResult::new(terminal, other_terminal, paths))
}

/// Resolve the `X`/`Y` markers of `terminal` to physical phases.
///
/// Walks outward through connected `X`/`Y` phased terminals. Traced phases
/// found along the way are known evidence and stop the walk at that
/// terminal; concretely phased neighbours vote for the phases they carry.
/// The returned map always holds entries for `X` and `Y`, with
/// [`SinglePhaseKind::NONE`] for a marker that could not be resolved.
pub fn find_xy_phases(
    network: &Network,
    terminal: TerminalId,
) -> Result<BTreeMap<SinglePhaseKind, SinglePhaseKind>> {
    let mut xy = XyCandidatePhasePaths::new();
    let mut visited = HashSet::new();
    let mut stack = vec![terminal];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        let t = network.terminal(current);
        let markers: Vec<SinglePhaseKind> = t.phases.single_phases().iter().copied().filter(|p| p.is_xy()).collect();

        let mut known = false;
        for marker in &markers {
            if let Some(traced) = t.traced_phase(*marker).filter(|p| p.is_line_phase()) {
                xy.add_known(*marker, traced)?;
                known = true;
            }
        }
        if known {
            continue;
        }

        for connected in network.connected_terminals(current) {
            let phases = network.terminal(connected).phases;
            if phases.has_xy() {
                stack.push(connected);
                continue;
            }
            for marker in &markers {
                let votes = phases
                    .single_phases()
                    .iter()
                    .copied()
                    .filter(|p| is_valid_candidate(*p, *marker));
                xy.add_candidates(*marker, votes)?;
            }
        }

        for other in network.other_terminals(current) {
            if network.terminal(other).phases.has_xy() {
                stack.push(other);
                continue;
            }
            // A winding feeding the lateral names the phase behind each marker.
            for path in between_all(network, other, current).nominal_phase_paths {
                if path.to.is_xy() && is_valid_candidate(path.from, path.to) {
                    xy.add_candidates(path.to, [path.from])?;
                }
            }
        }
    }

    if !xy.has_evidence() {
        tracing::debug!(terminal = %network.terminal(terminal).mrid, "no phase evidence for X/Y lateral");
    }
    xy.calculate_paths()
}
