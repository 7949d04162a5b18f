//! Resolution of `X`/`Y` lateral markers to physical phases.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::phase::SinglePhaseKind;

const X_PRIORITY: [SinglePhaseKind; 3] = [SinglePhaseKind::A, SinglePhaseKind::B, SinglePhaseKind::C];
const Y_PRIORITY: [SinglePhaseKind; 2] = [SinglePhaseKind::C, SinglePhaseKind::B];

/// Accumulates evidence about which physical phases an `X`/`Y` lateral
/// carries, then resolves it.
///
/// Known phases come from paths where the phase was already established; the
/// first one recorded per marker wins. Candidate phases are votes, one per
/// path proposing them, so duplicates matter.
///
/// Resolution always keeps `X` before `Y` in the order `A < B < C` unless both
/// were known up front. A marker with nothing to go on resolves to
/// [`SinglePhaseKind::NONE`].
///
/// ```
/// use gridtrace::v1::{SinglePhaseKind as P, XyCandidatePhasePaths};
///
/// let mut xy = XyCandidatePhasePaths::new();
/// xy.add_known(P::X, P::A).unwrap();
/// xy.add_candidates(P::Y, [P::C, P::C, P::B, P::C]).unwrap();
///
/// let paths = xy.calculate_paths().unwrap();
/// assert_eq!(paths[&P::X], P::A);
/// assert_eq!(paths[&P::Y], P::C);
/// ```
#[derive(Debug, Clone, Default)]
pub struct XyCandidatePhasePaths {
    known: BTreeMap<SinglePhaseKind, SinglePhaseKind>,
    candidates: BTreeMap<SinglePhaseKind, Vec<SinglePhaseKind>>,
}

impl XyCandidatePhasePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an established phase for `xy`. Later calls for the same marker
    /// are ignored.
    pub fn add_known(&mut self, xy: SinglePhaseKind, phase: SinglePhaseKind) -> Result<()> {
        validate_for_tracking(xy)?;
        if !phase.is_line_phase() {
            return Err(Error::InvalidCandidate { xy, phase });
        }
        self.known.entry(xy).or_insert(phase);
        Ok(())
    }

    /// Record one vote for each phase in `phases`. Nothing is recorded if any
    /// phase is invalid for the marker.
    pub fn add_candidates(
        &mut self,
        xy: SinglePhaseKind,
        phases: impl IntoIterator<Item = SinglePhaseKind>,
    ) -> Result<()> {
        validate_for_tracking(xy)?;
        let phases: Vec<SinglePhaseKind> = phases.into_iter().collect();
        if let Some(phase) = phases.iter().copied().find(|p| !is_valid_candidate(*p, xy)) {
            return Err(Error::InvalidCandidate { xy, phase });
        }
        self.candidates.entry(xy).or_default().extend(phases);
        Ok(())
    }

    pub fn has_evidence(&self) -> bool {
        !self.known.is_empty() || self.candidates.values().any(|c| !c.is_empty())
    }

    /// Resolve both markers. The map always holds an entry for `X` and `Y`.
    ///
    /// Fails only with [`Error::Internal`] when the tie-break lists cannot
    /// decide between candidates that were accepted as valid.
    pub fn calculate_paths(&self) -> Result<BTreeMap<SinglePhaseKind, SinglePhaseKind>> {
        let known_x = self.known.get(&SinglePhaseKind::X).copied();
        let known_y = self.known.get(&SinglePhaseKind::Y).copied();

        let x_votes = self.votes(SinglePhaseKind::X);
        let y_votes = self.votes(SinglePhaseKind::Y);

        let (x, y) = match (known_x, known_y) {
            // A known Y clashing with the known X is dropped, not re-voted.
            (Some(x), Some(y)) if x == y => (x, SinglePhaseKind::NONE),
            (Some(x), Some(y)) => (x, y),
            (Some(x), None) => (x, find_candidate(&y_votes, &Y_PRIORITY, |c| is_before(x, c))?),
            (None, Some(y)) => (find_candidate(&x_votes, &X_PRIORITY, |c| is_before(c, y))?, y),
            (None, None) => resolve_unknown(&x_votes, &y_votes)?,
        };

        Ok(BTreeMap::from([
            (SinglePhaseKind::X, x),
            (SinglePhaseKind::Y, y),
        ]))
    }

    fn votes(&self, xy: SinglePhaseKind) -> BTreeMap<SinglePhaseKind, usize> {
        let mut votes = BTreeMap::new();
        for phase in self.candidates.get(&xy).into_iter().flatten() {
            *votes.entry(*phase).or_insert(0) += 1;
        }
        votes
    }
}

fn validate_for_tracking(xy: SinglePhaseKind) -> Result<()> {
    if xy.is_xy() {
        Ok(())
    } else {
        Err(Error::NotXyPhase(xy))
    }
}

pub(super) fn is_valid_candidate(phase: SinglePhaseKind, xy: SinglePhaseKind) -> bool {
    match xy {
        SinglePhaseKind::X => phase.is_line_phase(),
        SinglePhaseKind::Y => matches!(phase, SinglePhaseKind::B | SinglePhaseKind::C),
        _ => false,
    }
}

fn rank(phase: SinglePhaseKind) -> u8 {
    match phase {
        SinglePhaseKind::A => 0,
        SinglePhaseKind::B => 1,
        SinglePhaseKind::C => 2,
        _ => u8::MAX,
    }
}

/// `x` may sit before `y`. An unresolved side never conflicts.
fn is_before(x: SinglePhaseKind, y: SinglePhaseKind) -> bool {
    x == SinglePhaseKind::NONE || y == SinglePhaseKind::NONE || rank(x) < rank(y)
}

/// Most voted candidate passing `allowed`, ties broken by `priority`.
fn find_candidate(
    votes: &BTreeMap<SinglePhaseKind, usize>,
    priority: &[SinglePhaseKind],
    allowed: impl Fn(SinglePhaseKind) -> bool,
) -> Result<SinglePhaseKind> {
    let valid: Vec<(SinglePhaseKind, usize)> = votes
        .iter()
        .filter(|(phase, _)| allowed(**phase))
        .map(|(phase, count)| (*phase, *count))
        .collect();

    let Some(max) = valid.iter().map(|(_, count)| *count).max() else {
        return Ok(SinglePhaseKind::NONE);
    };
    let best: Vec<SinglePhaseKind> = valid
        .iter()
        .filter(|(_, count)| *count == max)
        .map(|(phase, _)| *phase)
        .collect();

    if let [only] = best.as_slice() {
        return Ok(*only);
    }
    priority
        .iter()
        .copied()
        .find(|p| best.contains(p))
        .ok_or_else(|| Error::Internal(format!("no tie-break priority for candidates {:?}", best)))
}

fn resolve_unknown(
    x_votes: &BTreeMap<SinglePhaseKind, usize>,
    y_votes: &BTreeMap<SinglePhaseKind, usize>,
) -> Result<(SinglePhaseKind, SinglePhaseKind)> {
    let x = find_candidate(x_votes, &X_PRIORITY, |_| true)?;
    let y = find_candidate(y_votes, &Y_PRIORITY, |_| true)?;
    if is_before(x, y) {
        return Ok((x, y));
    }

    let x_count = x_votes.get(&x).copied().unwrap_or(0);
    let y_count = y_votes.get(&y).copied().unwrap_or(0);

    match x_count.cmp(&y_count) {
        Ordering::Greater => Ok((x, find_candidate(y_votes, &Y_PRIORITY, |c| is_before(x, c))?)),
        Ordering::Less => Ok((find_candidate(x_votes, &X_PRIORITY, |c| is_before(c, y))?, y)),
        Ordering::Equal => {
            // X keeps one of its top picks if Y can move out of the way,
            // otherwise Y keeps one of its top picks if X can move.
            for tentative_x in X_PRIORITY.iter().copied().filter(|p| x_votes.get(p) == Some(&x_count)) {
                let other = find_candidate(y_votes, &Y_PRIORITY, |c| is_before(tentative_x, c))?;
                if other != SinglePhaseKind::NONE {
                    return Ok((tentative_x, other));
                }
            }
            for tentative_y in Y_PRIORITY.iter().copied().filter(|p| y_votes.get(p) == Some(&y_count)) {
                let other = find_candidate(x_votes, &X_PRIORITY, |c| is_before(c, tentative_y))?;
                if other != SinglePhaseKind::NONE {
                    return Ok((other, tentative_y));
                }
            }
            Ok((x, SinglePhaseKind::NONE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SinglePhaseKind as P;

    fn resolve(xy: &XyCandidatePhasePaths) -> (P, P) {
        let paths = xy.calculate_paths().unwrap();
        (paths[&P::X], paths[&P::Y])
    }

    #[test]
    fn test_known_x_picks_most_voted_y_after_it() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_known(P::X, P::A).unwrap();
        xy.add_candidates(P::Y, [P::C, P::C, P::C, P::B]).unwrap();
        assert_eq!(resolve(&xy), (P::A, P::C));
    }

    #[test]
    fn test_both_known_used_as_is() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_known(P::X, P::B).unwrap();
        xy.add_known(P::Y, P::C).unwrap();
        xy.add_candidates(P::X, [P::A, P::A]).unwrap();
        assert_eq!(resolve(&xy), (P::B, P::C));
    }

    #[test]
    fn test_first_known_wins() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_known(P::X, P::B).unwrap();
        xy.add_known(P::X, P::A).unwrap();
        assert_eq!(resolve(&xy).0, P::B);
    }

    #[test]
    fn test_known_y_equal_to_known_x_is_discarded() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_known(P::X, P::B).unwrap();
        xy.add_known(P::Y, P::B).unwrap();
        xy.add_candidates(P::Y, [P::C]).unwrap();
        assert_eq!(resolve(&xy), (P::B, P::NONE));

        let mut no_candidates = XyCandidatePhasePaths::new();
        no_candidates.add_known(P::X, P::B).unwrap();
        no_candidates.add_known(P::Y, P::B).unwrap();
        assert_eq!(resolve(&no_candidates), (P::B, P::NONE));
    }

    #[test]
    fn test_known_y_restricts_x_to_earlier_phases() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_known(P::Y, P::B).unwrap();
        xy.add_candidates(P::X, [P::C, P::C, P::A]).unwrap();
        assert_eq!(resolve(&xy), (P::A, P::B));
    }

    #[test]
    fn test_known_without_valid_candidate_resolves_none() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_known(P::X, P::C).unwrap();
        xy.add_candidates(P::Y, [P::B, P::C]).unwrap();
        assert_eq!(resolve(&xy), (P::C, P::NONE));
    }

    #[test]
    fn test_no_evidence_resolves_none() {
        let xy = XyCandidatePhasePaths::new();
        assert!(!xy.has_evidence());
        assert_eq!(resolve(&xy), (P::NONE, P::NONE));
    }

    #[test]
    fn test_unknown_uses_priority_on_ties() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_candidates(P::X, [P::A, P::B, P::C]).unwrap();
        xy.add_candidates(P::Y, [P::B, P::C]).unwrap();
        assert_eq!(resolve(&xy), (P::A, P::C));
    }

    #[test]
    fn test_unknown_higher_vote_count_is_fixed_first() {
        // X prefers C strongly, Y prefers C weakly: Y has to move.
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_candidates(P::X, [P::C, P::C, P::C, P::B]).unwrap();
        xy.add_candidates(P::Y, [P::C, P::C, P::B]).unwrap();
        assert_eq!(resolve(&xy), (P::C, P::NONE));

        // Y prefers B strongly, X prefers C weakly: X has to move.
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_candidates(P::X, [P::C, P::C, P::A]).unwrap();
        xy.add_candidates(P::Y, [P::B, P::B, P::B]).unwrap();
        assert_eq!(resolve(&xy), (P::A, P::B));
    }

    #[test]
    fn test_unknown_tied_conflict_moves_y_first() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_candidates(P::X, [P::B, P::B, P::A]).unwrap();
        xy.add_candidates(P::Y, [P::B, P::B, P::C]).unwrap();
        assert_eq!(resolve(&xy), (P::B, P::C));
    }

    #[test]
    fn test_unknown_tied_conflict_moves_x_when_y_cannot() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_candidates(P::X, [P::C, P::A]).unwrap();
        xy.add_candidates(P::X, [P::C]).unwrap();
        xy.add_candidates(P::Y, [P::C, P::C]).unwrap();
        assert_eq!(resolve(&xy), (P::A, P::C));
    }

    #[test]
    fn test_unknown_tied_conflict_with_no_alternatives() {
        let mut xy = XyCandidatePhasePaths::new();
        xy.add_candidates(P::X, [P::B]).unwrap();
        xy.add_candidates(P::Y, [P::B]).unwrap();
        assert_eq!(resolve(&xy), (P::B, P::NONE));
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let mut xy = XyCandidatePhasePaths::new();
        assert!(matches!(xy.add_known(P::A, P::B), Err(Error::NotXyPhase(P::A))));
        assert!(matches!(
            xy.add_candidates(P::N, [P::A]),
            Err(Error::NotXyPhase(P::N))
        ));
    }

    #[test]
    fn test_invalid_candidate_rejected_without_recording() {
        let mut xy = XyCandidatePhasePaths::new();
        let err = xy.add_candidates(P::Y, [P::C, P::A]).unwrap_err();
        assert!(matches!(err, Error::InvalidCandidate { xy: P::Y, phase: P::A }));
        assert!(!err.is_internal());
        assert!(!xy.has_evidence());

        assert!(xy.add_known(P::X, P::N).is_err());
    }

    #[test]
    fn test_resolution_is_ordered_and_deterministic() {
        let x_phases = [P::A, P::B, P::C];
        let y_phases = [P::B, P::C];
        for combo in 0..(3usize.pow(5)) {
            let mut counts = [0usize; 5];
            let mut rest = combo;
            for c in counts.iter_mut() {
                *c = rest % 3;
                rest /= 3;
            }

            let mut xy = XyCandidatePhasePaths::new();
            for (phase, count) in x_phases.iter().zip(&counts[..3]) {
                xy.add_candidates(P::X, std::iter::repeat_n(*phase, *count)).unwrap();
            }
            for (phase, count) in y_phases.iter().zip(&counts[3..]) {
                xy.add_candidates(P::Y, std::iter::repeat_n(*phase, *count)).unwrap();
            }

            let (x, y) = resolve(&xy);
            assert!(is_before(x, y), "{:?} resolved to X={} Y={}", counts, x, y);
            if x != P::NONE && y != P::NONE {
                assert!(rank(x) < rank(y));
            }
            assert_eq!(resolve(&xy), (x, y));
        }
    }
}
