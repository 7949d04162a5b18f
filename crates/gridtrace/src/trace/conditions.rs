//! Network conditions, expressed as plain traversal conditions.

use crate::network::{FeederDirection, Network, NetworkState};
use crate::trace::NetworkTraceStep;
use crate::traversal::StepContext;

/// Queue condition refusing to trace through a switch that is open in `state`.
pub fn stop_at_open<'a, D: 'a>(
    network: &'a Network,
    state: NetworkState,
) -> impl FnMut(&NetworkTraceStep<D>, &StepContext, &NetworkTraceStep<D>, &StepContext) -> bool + 'a {
    move |next: &NetworkTraceStep<D>, _: &StepContext, _: &NetworkTraceStep<D>, _: &StepContext| {
        next.path.traced_externally() || !network.is_open(next.path.to_equipment, state)
    }
}

/// Queue condition following only steps that go with the flow of supply.
pub fn downstream<'a, D: 'a>(
    network: &'a Network,
    state: NetworkState,
) -> impl FnMut(&NetworkTraceStep<D>, &StepContext, &NetworkTraceStep<D>, &StepContext) -> bool + 'a {
    direction(network, state, FeederDirection::Downstream)
}

/// Queue condition following only steps that go against the flow of supply.
pub fn upstream<'a, D: 'a>(
    network: &'a Network,
    state: NetworkState,
) -> impl FnMut(&NetworkTraceStep<D>, &StepContext, &NetworkTraceStep<D>, &StepContext) -> bool + 'a {
    direction(network, state, FeederDirection::Upstream)
}

/// Queue condition for travelling in `direction`.
///
/// Leaving equipment through a terminal needs that terminal to carry
/// `direction`; entering equipment through a terminal needs it to carry the
/// opposite one.
pub fn direction<'a, D: 'a>(
    network: &'a Network,
    state: NetworkState,
    direction: FeederDirection,
) -> impl FnMut(&NetworkTraceStep<D>, &StepContext, &NetworkTraceStep<D>, &StepContext) -> bool + 'a {
    move |next: &NetworkTraceStep<D>, _: &StepContext, _: &NetworkTraceStep<D>, _: &StepContext| {
        let wanted = if next.path.traced_internally() {
            direction
        } else {
            direction.complementary()
        };
        network
            .terminal(next.path.to_terminal)
            .direction(state)
            .contains(wanted)
    }
}

/// Queue condition refusing steps more than `limit` equipment away from the start.
pub fn limit_equipment_steps<D>(
    limit: usize,
) -> impl FnMut(&NetworkTraceStep<D>, &StepContext, &NetworkTraceStep<D>, &StepContext) -> bool {
    move |next: &NetworkTraceStep<D>, _: &StepContext, _: &NetworkTraceStep<D>, _: &StepContext| {
        next.num_equipment_steps <= limit
    }
}
