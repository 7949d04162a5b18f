//! Winding phase mapping for power transformers.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::phase::{NominalPhasePath, PhaseCode, SinglePhaseKind};

static TRANSFORMER_PHASE_PATHS: LazyLock<HashMap<(PhaseCode, PhaseCode), Vec<NominalPhasePath>>> =
    LazyLock::new(|| {
        let mut table = HashMap::new();
        for from in PhaseCode::ALL {
            for to in PhaseCode::ALL {
                if let Some(paths) = winding_paths(from, to) {
                    table.insert((from, to), paths);
                }
            }
        }
        table
    });

/// Phase paths through a transformer from a terminal carrying `from` to one
/// carrying `to`. Unsupported winding combinations have no paths.
///
/// A neutral on the `to` side with no neutral on the `from` side is reported
/// as `NONE -> N`: the transformer introduces it.
pub fn transformer_phase_paths(from: PhaseCode, to: PhaseCode) -> &'static [NominalPhasePath] {
    TRANSFORMER_PHASE_PATHS
        .get(&(from, to))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// Windings pair up phase for phase in order. Two line phases may only pair
// with themselves; X/Y markers may pair with anything.
fn winding_paths(from: PhaseCode, to: PhaseCode) -> Option<Vec<NominalPhasePath>> {
    let primary = from.without_neutral();
    let secondary = to.without_neutral();
    if primary.is_empty() || primary.len() != secondary.len() {
        return None;
    }

    let mut paths = Vec::with_capacity(primary.len() + 1);
    for (p, s) in primary.iter().zip(&secondary) {
        if p.is_line_phase() && s.is_line_phase() && p != s {
            return None;
        }
        paths.push(NominalPhasePath::new(*p, *s));
    }

    if to.has_neutral() {
        let source = if from.has_neutral() {
            SinglePhaseKind::N
        } else {
            SinglePhaseKind::NONE
        };
        paths.push(NominalPhasePath::new(source, SinglePhaseKind::N));
    }

    Some(paths)
}
