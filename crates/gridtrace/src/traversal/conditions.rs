use crate::traversal::StepContext;

/// Marks a step as stopping: it is still actioned, but nothing is queued
/// from it.
///
/// Implemented for any `FnMut(&T, &StepContext) -> bool`.
pub trait StopCondition<T> {
    fn should_stop(&mut self, item: &T, context: &StepContext) -> bool;
}

impl<T, F> StopCondition<T> for F
where
    F: FnMut(&T, &StepContext) -> bool,
{
    fn should_stop(&mut self, item: &T, context: &StepContext) -> bool {
        self(item, context)
    }
}

/// Gates whether a candidate `next` item, proposed from `current`, is queued.
///
/// Implemented for any `FnMut(&T, &StepContext, &T, &StepContext) -> bool`
/// taking `(next, next_context, current, current_context)`.
pub trait QueueCondition<T> {
    fn should_queue(&mut self, next: &T, next_context: &StepContext, current: &T, current_context: &StepContext) -> bool;
}

impl<T, F> QueueCondition<T> for F
where
    F: FnMut(&T, &StepContext, &T, &StepContext) -> bool,
{
    fn should_queue(&mut self, next: &T, next_context: &StepContext, current: &T, current_context: &StepContext) -> bool {
        self(next, next_context, current, current_context)
    }
}

/// Side effect run for every actioned step, in registration order.
///
/// Implemented for any `FnMut(&T, &StepContext)`.
pub trait StepAction<T> {
    fn apply(&mut self, item: &T, context: &StepContext);

    /// Called when the owning traversal resets, before a run starts.
    fn on_reset(&mut self) {}
}

impl<T, F> StepAction<T> for F
where
    F: FnMut(&T, &StepContext),
{
    fn apply(&mut self, item: &T, context: &StepContext) {
        self(item, context)
    }
}

/// Revisit bookkeeping: decides whether a dequeued item is visited.
///
/// Each branch walks with its own tracker, forked from its parent's at the
/// moment the branch is queued.
pub trait VisitTracker<T> {
    /// Record a visit, returning `false` if the item must be skipped.
    fn visit(&mut self, item: &T, context: &StepContext) -> bool;

    fn clear(&mut self);

    /// An independent copy of the current state.
    fn fork(&self) -> Box<dyn VisitTracker<T>>;
}

/// Admits every item. Cycle safety is up to stop and queue conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl<T> VisitTracker<T> for AdmitAll {
    fn visit(&mut self, _item: &T, _context: &StepContext) -> bool {
        true
    }

    fn clear(&mut self) {}

    fn fork(&self) -> Box<dyn VisitTracker<T>> {
        Box::new(AdmitAll)
    }
}
