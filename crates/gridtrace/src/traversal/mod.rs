//! Generic, single-threaded traversal engine.
//!
//! A [`Traversal`] walks items of any type `T`. What comes next is decided
//! by the [`QueueType`]'s callback; which of those items are queued, where
//! the walk stops and what happens at each step are pluggable through
//! [`QueueCondition`], [`StopCondition`] and [`StepAction`]. Revisits are
//! governed by a [`VisitTracker`].

mod conditions;
mod context;
mod queue;

use std::collections::VecDeque;

pub use conditions::{AdmitAll, QueueCondition, StepAction, StopCondition, VisitTracker};
pub use context::{ContextValueComputer, StepContext};
pub use queue::{BranchingQueueNext, BranchingQueueSink, QueueNext, QueueOrder, QueueSink, QueueType};

use context::{Erased, ErasedComputer};
use queue::{Candidate, WorkQueue};

type ActionAdmission<'a, T> = Box<dyn FnMut(&T, &StepContext) -> bool + 'a>;

/// One independent walk: its queue and its revisit bookkeeping.
struct Walk<T> {
    queue: WorkQueue<T>,
    tracker: Box<dyn VisitTracker<T>>,
}

/// A configurable walk over items of type `T`.
///
/// ```
/// use gridtrace::v1::{QueueOrder, QueueSink, QueueType, StepContext, Traversal};
/// use std::cell::RefCell;
///
/// let visited = RefCell::new(Vec::new());
/// let mut traversal = Traversal::new(QueueType::basic(
///     QueueOrder::DepthFirst,
///     |n: &u32, _: &StepContext, sink: &mut QueueSink<u32>| sink.queue_item(n + 1),
/// ));
/// traversal
///     .add_stop_condition(|n: &u32, _: &StepContext| *n == 3)
///     .add_step_action(|n: &u32, _: &StepContext| visited.borrow_mut().push(*n));
/// traversal.run(1, true);
/// drop(traversal);
///
/// assert_eq!(visited.into_inner(), vec![1, 2, 3]);
/// ```
pub struct Traversal<'a, T> {
    queue_type: QueueType<'a, T>,
    start_items: Vec<T>,
    stop_conditions: Vec<Box<dyn StopCondition<T> + 'a>>,
    queue_conditions: Vec<Box<dyn QueueCondition<T> + 'a>>,
    actions: Vec<Box<dyn StepAction<T> + 'a>>,
    action_admission: Option<ActionAdmission<'a, T>>,
    computers: Vec<Box<dyn ErasedComputer<T> + 'a>>,
    tracker: Box<dyn VisitTracker<T>>,
}

impl<'a, T: Clone> Traversal<'a, T> {
    pub fn new(queue_type: QueueType<'a, T>) -> Self {
        Self {
            queue_type,
            start_items: Vec::new(),
            stop_conditions: Vec::new(),
            queue_conditions: Vec::new(),
            actions: Vec::new(),
            action_admission: None,
            computers: Vec::new(),
            tracker: Box::new(AdmitAll),
        }
    }

    pub fn add_stop_condition(&mut self, condition: impl StopCondition<T> + 'a) -> &mut Self {
        self.stop_conditions.push(Box::new(condition));
        self
    }

    pub fn add_queue_condition(&mut self, condition: impl QueueCondition<T> + 'a) -> &mut Self {
        self.queue_conditions.push(Box::new(condition));
        self
    }

    pub fn add_step_action(&mut self, action: impl StepAction<T> + 'a) -> &mut Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Register a computer whose per-step value is read back with
    /// [`StepContext::value`]. A computer reusing a key replaces the earlier one.
    pub fn add_context_value_computer<C>(&mut self, computer: C) -> &mut Self
    where
        C: ContextValueComputer<T> + 'a,
    {
        self.computers.retain(|c| c.key() != computer.key());
        self.computers.push(Box::new(Erased(computer)));
        self
    }

    /// Only run step actions for items passing `admission`. Stop and queue
    /// handling are unaffected.
    pub fn set_action_admission(&mut self, admission: impl FnMut(&T, &StepContext) -> bool + 'a) -> &mut Self {
        self.action_admission = Some(Box::new(admission));
        self
    }

    pub fn set_visit_tracker(&mut self, tracker: impl VisitTracker<T> + 'static) -> &mut Self {
        self.tracker = Box::new(tracker);
        self
    }

    pub fn add_start_item(&mut self, item: T) -> &mut Self {
        self.start_items.push(item);
        self
    }

    pub fn start_items(&self) -> &[T] {
        &self.start_items
    }

    pub fn queue_type(&self) -> &QueueType<'a, T> {
        &self.queue_type
    }

    /// Clear revisit bookkeeping and let step actions drop their own state.
    /// Registered conditions, actions and start items are kept.
    pub fn reset(&mut self) {
        self.tracker.clear();
        for action in &mut self.actions {
            action.on_reset();
        }
    }

    /// Walk until every queue, branches included, is drained.
    ///
    /// `start` replaces the registered start items for this run; `None` uses
    /// them. With `can_stop_on_start_item == false` stop conditions are not
    /// evaluated for the start items themselves.
    pub fn run(&mut self, start: impl Into<Option<T>>, can_stop_on_start_item: bool) -> &mut Self {
        self.reset();

        let starts = match start.into() {
            Some(item) => vec![item],
            None => self.start_items.clone(),
        };
        let order = self.queue_type.order();

        let mut root = Walk {
            queue: WorkQueue::new(order),
            tracker: self.tracker.fork(),
        };
        for item in starts {
            let context = self.initial_context(&item);
            root.queue.push(item, context);
        }

        let mut walks = VecDeque::from([root]);
        let mut steps = 0usize;
        let mut branches = 0usize;

        while let Some(mut walk) = walks.pop_front() {
            while let Some((item, mut context)) = walk.queue.pop() {
                let admitted = walk.tracker.visit(&item, &context);
                if !admitted && !context.is_branch_start_item {
                    continue;
                }
                steps += 1;

                if can_stop_on_start_item || !context.is_start_item {
                    context.is_stopping = self.evaluate_stop_conditions(&item, &context);
                }
                tracing::trace!(
                    step = context.step_number,
                    branch_depth = context.branch_depth,
                    stopping = context.is_stopping,
                    "visiting traversal item"
                );

                if self.can_action(&item, &context) {
                    for action in &mut self.actions {
                        action.apply(&item, &context);
                    }
                }

                if context.is_stopping {
                    continue;
                }

                for candidate in self.queue_type.next_candidates(&item, &context) {
                    match candidate {
                        Candidate::Item(next) => {
                            let next_context = self.next_context(&next, &item, &context, false);
                            if self.should_queue(&next, &next_context, &item, &context) {
                                walk.queue.push(next, next_context);
                            }
                        }
                        Candidate::Branch(next) => {
                            let next_context = self.next_context(&next, &item, &context, true);
                            if self.should_queue(&next, &next_context, &item, &context) {
                                let mut queue = WorkQueue::new(order);
                                queue.push(next, next_context);
                                walks.push_back(Walk {
                                    queue,
                                    tracker: walk.tracker.fork(),
                                });
                                branches += 1;
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!(steps, branches, "traversal finished");
        self
    }

    fn initial_context(&self, item: &T) -> StepContext {
        let mut context = StepContext::start();
        for computer in &self.computers {
            context.set_raw_value(computer.key(), computer.initial(item));
        }
        context
    }

    fn next_context(&self, next: &T, current: &T, current_context: &StepContext, is_branch: bool) -> StepContext {
        let mut context = current_context.next(is_branch);
        for computer in &self.computers {
            let value = computer.next(next, current, current_context.raw_value(computer.key()));
            context.set_raw_value(computer.key(), value);
        }
        context
    }

    // Every stop condition sees every step, even once one has matched.
    fn evaluate_stop_conditions(&mut self, item: &T, context: &StepContext) -> bool {
        let mut stopping = false;
        for condition in &mut self.stop_conditions {
            stopping |= condition.should_stop(item, context);
        }
        stopping
    }

    fn should_queue(&mut self, next: &T, next_context: &StepContext, current: &T, current_context: &StepContext) -> bool {
        self.queue_conditions
            .iter_mut()
            .all(|c| c.should_queue(next, next_context, current, current_context))
    }

    fn can_action(&mut self, item: &T, context: &StepContext) -> bool {
        self.action_admission
            .as_mut()
            .is_none_or(|admission| admission(item, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(i32, StepContext)>>>;

    fn counting(order: QueueOrder) -> Traversal<'static, i32> {
        Traversal::new(QueueType::basic(order, |n: &i32, _: &StepContext, sink: &mut QueueSink<i32>| {
            sink.queue_item(n + 1)
        }))
    }

    fn record(traversal: &mut Traversal<'static, i32>) -> Log {
        let log: Log = Rc::default();
        let sink = log.clone();
        traversal.add_step_action(move |n: &i32, ctx: &StepContext| sink.borrow_mut().push((*n, ctx.clone())));
        log
    }

    fn items(log: &Log) -> Vec<i32> {
        log.borrow().iter().map(|(n, _)| *n).collect()
    }

    #[derive(Clone, Default)]
    struct Seen(HashSet<i32>);

    impl VisitTracker<i32> for Seen {
        fn visit(&mut self, item: &i32, _context: &StepContext) -> bool {
            self.0.insert(*item)
        }

        fn clear(&mut self) {
            self.0.clear();
        }

        fn fork(&self) -> Box<dyn VisitTracker<i32>> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_stops_at_matching_item() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal.add_stop_condition(|n: &i32, _: &StepContext| *n == 3);
        let log = record(&mut traversal);
        traversal.run(1, true);

        assert_eq!(items(&log), vec![1, 2, 3]);
        assert!(log.borrow()[2].1.is_stopping);
        assert!(!log.borrow()[1].1.is_stopping);
    }

    #[test]
    fn test_queue_condition_prevents_queuing() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal.add_queue_condition(|next: &i32, _: &StepContext, _: &i32, _: &StepContext| *next < 3);
        let log = record(&mut traversal);
        traversal.run(1, true);

        assert_eq!(items(&log), vec![1, 2]);
    }

    #[test]
    fn test_all_queue_conditions_must_pass() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal
            .add_queue_condition(|next: &i32, _: &StepContext, _: &i32, _: &StepContext| *next < 10)
            .add_queue_condition(|next: &i32, _: &StepContext, _: &i32, _: &StepContext| *next % 4 != 0);
        let log = record(&mut traversal);
        traversal.run(1, true);

        assert_eq!(items(&log), vec![1, 2, 3]);
    }

    #[test]
    fn test_every_stop_condition_is_evaluated() {
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal
            .add_stop_condition(|_: &i32, _: &StepContext| true)
            .add_stop_condition(move |_: &i32, _: &StepContext| {
                *counter.borrow_mut() += 1;
                false
            });
        traversal.run(1, true);

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_breadth_first_order() {
        let mut traversal = Traversal::new(QueueType::basic(
            QueueOrder::BreadthFirst,
            |n: &i32, _: &StepContext, sink: &mut QueueSink<i32>| {
                if *n < 4 {
                    sink.queue_item(n * 2);
                    sink.queue_item(n * 2 + 1);
                }
            },
        ));
        let log = record(&mut traversal);
        traversal.run(1, true);
        assert_eq!(items(&log), vec![1, 2, 3, 4, 5, 6, 7]);
        let steps: Vec<usize> = log.borrow().iter().map(|(_, c)| c.step_number).collect();
        assert_eq!(steps, vec![0, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_depth_first_order() {
        let mut traversal = Traversal::new(QueueType::basic(
            QueueOrder::DepthFirst,
            |n: &i32, _: &StepContext, sink: &mut QueueSink<i32>| {
                if *n < 4 {
                    sink.queue_item(n * 2);
                    sink.queue_item(n * 2 + 1);
                }
            },
        ));
        let log = record(&mut traversal);
        traversal.run(1, true);
        assert_eq!(items(&log), vec![1, 3, 7, 6, 2, 5, 4]);
    }

    #[test]
    fn test_cannot_stop_on_start_item_but_stops_on_revisit() {
        let mut traversal = Traversal::new(QueueType::basic(
            QueueOrder::DepthFirst,
            |n: &i32, _: &StepContext, sink: &mut QueueSink<i32>| sink.queue_item(n % 3 + 1),
        ));
        traversal.add_stop_condition(|n: &i32, _: &StepContext| *n == 1);
        let log = record(&mut traversal);

        traversal.run(1, false);
        assert_eq!(items(&log), vec![1, 2, 3, 1]);
        assert!(!log.borrow()[0].1.is_stopping);
        assert!(log.borrow()[3].1.is_stopping);

        log.borrow_mut().clear();
        traversal.run(1, true);
        assert_eq!(items(&log), vec![1]);
    }

    #[test]
    fn test_branch_start_item_can_stop_when_root_cannot() {
        let mut traversal = Traversal::new(QueueType::branching(
            QueueOrder::DepthFirst,
            |n: &i32, _: &StepContext, sink: &mut BranchingQueueSink<i32>| {
                if *n == 0 {
                    sink.queue_branch(1);
                }
            },
        ));
        traversal.add_stop_condition(|n: &i32, _: &StepContext| *n <= 1);
        let log = record(&mut traversal);
        traversal.run(0, false);

        let stops: Vec<(i32, bool)> = log.borrow().iter().map(|(n, c)| (*n, c.is_stopping)).collect();
        assert_eq!(stops, vec![(0, false), (1, true)]);
        assert!(log.borrow()[1].1.is_branch_start_item);
    }

    #[test]
    fn test_branches_run_in_creation_order_with_depth() {
        let mut traversal = Traversal::new(QueueType::branching(
            QueueOrder::DepthFirst,
            |n: &i32, _: &StepContext, sink: &mut BranchingQueueSink<i32>| match *n {
                0 => {
                    sink.queue_branch(1);
                    sink.queue_branch(2);
                }
                1 | 2 => sink.queue_item(n + 2),
                _ => {}
            },
        ));
        let log = record(&mut traversal);
        traversal.run(0, true);

        assert_eq!(items(&log), vec![0, 1, 3, 2, 4]);
        let log = log.borrow();
        let (_, root) = &log[0];
        assert!(root.is_start_item);
        assert_eq!(root.branch_depth, 0);

        let (_, branch) = &log[1];
        assert!(branch.is_branch_start_item);
        assert!(!branch.is_start_item);
        assert_eq!(branch.branch_depth, 1);
        assert_eq!(branch.step_number, 1);

        let (_, within) = &log[2];
        assert!(!within.is_branch_start_item);
        assert_eq!(within.branch_depth, 1);
        assert_eq!(within.step_number, 2);
    }

    #[test]
    fn test_nested_branch_depth() {
        let mut traversal = Traversal::new(QueueType::branching(
            QueueOrder::BreadthFirst,
            |n: &i32, _: &StepContext, sink: &mut BranchingQueueSink<i32>| {
                if *n < 3 {
                    sink.queue_branch(n + 1);
                }
            },
        ));
        let log = record(&mut traversal);
        traversal.run(0, true);
        let depths: Vec<usize> = log.borrow().iter().map(|(_, c)| c.branch_depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_tracker_skips_revisits() {
        let mut traversal = Traversal::new(QueueType::basic(
            QueueOrder::BreadthFirst,
            |n: &i32, _: &StepContext, sink: &mut QueueSink<i32>| {
                sink.queue_item((n + 1) % 3);
                sink.queue_item((n + 2) % 3);
            },
        ));
        traversal.set_visit_tracker(Seen::default());
        let log = record(&mut traversal);
        traversal.run(0, true);
        assert_eq!(items(&log), vec![0, 1, 2]);
    }

    #[test]
    fn test_branch_start_bypasses_tracker() {
        let mut traversal = Traversal::new(QueueType::branching(
            QueueOrder::DepthFirst,
            |n: &i32, ctx: &StepContext, sink: &mut BranchingQueueSink<i32>| {
                if ctx.branch_depth == 0 {
                    sink.queue_branch(*n);
                    sink.queue_item(*n);
                }
            },
        ));
        traversal.set_visit_tracker(Seen::default());
        let log = record(&mut traversal);
        traversal.run(5, true);

        // The plain revisit is skipped; the branch start is not.
        assert_eq!(items(&log), vec![5, 5]);
        assert!(log.borrow()[1].1.is_branch_start_item);
    }

    #[test]
    fn test_branches_fork_tracker_state() {
        let mut traversal = Traversal::new(QueueType::branching(
            QueueOrder::DepthFirst,
            |n: &i32, _: &StepContext, sink: &mut BranchingQueueSink<i32>| match *n {
                0 => {
                    sink.queue_branch(1);
                    sink.queue_branch(2);
                }
                1 | 2 => sink.queue_item(10),
                _ => {}
            },
        ));
        traversal.set_visit_tracker(Seen::default());
        let log = record(&mut traversal);
        traversal.run(0, true);

        // Each branch reaches 10 with its own bookkeeping.
        assert_eq!(items(&log), vec![0, 1, 10, 2, 10]);
    }

    #[test]
    fn test_action_admission_skips_actions_only() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal
            .add_stop_condition(|n: &i32, _: &StepContext| *n == 5)
            .set_action_admission(|n: &i32, _: &StepContext| n % 2 == 1);
        let log = record(&mut traversal);
        traversal.run(1, true);
        assert_eq!(items(&log), vec![1, 3, 5]);
    }

    struct Sum;

    impl ContextValueComputer<i32> for Sum {
        type Value = i32;

        fn key(&self) -> &str {
            "sum"
        }

        fn compute_initial_value(&self, item: &i32) -> i32 {
            *item
        }

        fn compute_next_value(&self, next: &i32, _current: &i32, current_value: &i32) -> i32 {
            current_value + next
        }
    }

    #[test]
    fn test_context_values_flow_along_path() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal
            .add_context_value_computer(Sum)
            .add_stop_condition(|_: &i32, ctx: &StepContext| ctx.value::<i32>("sum").is_some_and(|s| *s >= 10));
        let log = record(&mut traversal);
        traversal.run(1, true);

        let sums: Vec<i32> = log
            .borrow()
            .iter()
            .filter_map(|(_, c)| c.value::<i32>("sum").copied())
            .collect();
        assert_eq!(sums, vec![1, 3, 6, 10]);
    }

    #[test]
    fn test_step_limit_via_step_number() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal.add_stop_condition(|_: &i32, ctx: &StepContext| ctx.step_number >= 4);
        let log = record(&mut traversal);
        traversal.run(10, true);
        assert_eq!(items(&log), vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_registered_start_items_and_override() {
        let mut traversal = counting(QueueOrder::BreadthFirst);
        traversal
            .add_stop_condition(|_: &i32, ctx: &StepContext| ctx.step_number == 1)
            .add_start_item(1)
            .add_start_item(10);
        let log = record(&mut traversal);

        traversal.run(None, true);
        assert_eq!(items(&log), vec![1, 10, 2, 11]);
        assert_eq!(traversal.start_items(), &[1, 10]);

        log.borrow_mut().clear();
        traversal.run(20, true);
        assert_eq!(items(&log), vec![20, 21]);
    }

    #[test]
    fn test_rerun_matches_fresh_traversal() {
        let configure = |t: &mut Traversal<'static, i32>| {
            t.add_stop_condition(|n: &i32, _: &StepContext| n % 5 == 0);
            t.set_visit_tracker(Seen::default());
        };

        let mut reused = counting(QueueOrder::DepthFirst);
        configure(&mut reused);
        let reused_log = record(&mut reused);
        reused.run(1, true);
        reused_log.borrow_mut().clear();
        reused.run(7, true);

        let mut fresh = counting(QueueOrder::DepthFirst);
        configure(&mut fresh);
        let fresh_log = record(&mut fresh);
        fresh.run(7, true);

        assert_eq!(items(&reused_log), items(&fresh_log));
        assert_eq!(items(&fresh_log), vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_reset_notifies_actions() {
        struct Counter(Rc<RefCell<usize>>);

        impl StepAction<i32> for Counter {
            fn apply(&mut self, _item: &i32, _context: &StepContext) {}

            fn on_reset(&mut self) {
                *self.0.borrow_mut() += 1;
            }
        }

        let resets = Rc::new(RefCell::new(0));
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal
            .add_stop_condition(|_: &i32, _: &StepContext| true)
            .add_step_action(Counter(resets.clone()));
        traversal.run(1, true).run(2, true);
        assert_eq!(*resets.borrow(), 2);
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_callback_panics_propagate() {
        let mut traversal = counting(QueueOrder::DepthFirst);
        traversal.add_step_action(|n: &i32, _: &StepContext| {
            if *n == 1 {
                panic!("boom");
            }
        });
        traversal.run(1, true);
    }
}
