use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::traversal::StepContext;

/// Order in which a queue hands back its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    /// Last queued, first visited.
    #[default]
    DepthFirst,
    /// First queued, first visited.
    BreadthFirst,
}

pub(crate) enum Candidate<T> {
    Item(T),
    Branch(T),
}

/// Collects the successors of a step in a non-branching traversal.
pub struct QueueSink<T> {
    pub(crate) pending: Vec<Candidate<T>>,
}

impl<T> QueueSink<T> {
    pub(crate) fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Continue the current walk with `item`, subject to the queue conditions.
    pub fn queue_item(&mut self, item: T) {
        self.pending.push(Candidate::Item(item));
    }
}

/// Collects the successors of a step in a branching traversal.
pub struct BranchingQueueSink<T> {
    pub(crate) pending: Vec<Candidate<T>>,
}

impl<T> BranchingQueueSink<T> {
    pub(crate) fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Continue the current walk with `item`, subject to the queue conditions.
    pub fn queue_item(&mut self, item: T) {
        self.pending.push(Candidate::Item(item));
    }

    /// Start a new independent walk seeded with `item`, subject to the queue
    /// conditions. Branches run after the current walk drains, in the order
    /// they were queued.
    pub fn queue_branch(&mut self, item: T) {
        self.pending.push(Candidate::Branch(item));
    }
}

pub type QueueNext<'a, T> = Box<dyn FnMut(&T, &StepContext, &mut QueueSink<T>) + 'a>;
pub type BranchingQueueNext<'a, T> = Box<dyn FnMut(&T, &StepContext, &mut BranchingQueueSink<T>) + 'a>;

/// How a traversal discovers successors and orders its work.
pub enum QueueType<'a, T> {
    /// A single walk.
    Basic { queue_next: QueueNext<'a, T>, order: QueueOrder },
    /// A walk that can split into independent branches.
    Branching {
        queue_next: BranchingQueueNext<'a, T>,
        order: QueueOrder,
    },
}

impl<'a, T> QueueType<'a, T> {
    pub fn basic(order: QueueOrder, queue_next: impl FnMut(&T, &StepContext, &mut QueueSink<T>) + 'a) -> Self {
        QueueType::Basic {
            queue_next: Box::new(queue_next),
            order,
        }
    }

    pub fn branching(
        order: QueueOrder,
        queue_next: impl FnMut(&T, &StepContext, &mut BranchingQueueSink<T>) + 'a,
    ) -> Self {
        QueueType::Branching {
            queue_next: Box::new(queue_next),
            order,
        }
    }

    pub fn order(&self) -> QueueOrder {
        match self {
            QueueType::Basic { order, .. } | QueueType::Branching { order, .. } => *order,
        }
    }

    pub fn is_branching(&self) -> bool {
        matches!(self, QueueType::Branching { .. })
    }

    pub(crate) fn next_candidates(&mut self, item: &T, context: &StepContext) -> Vec<Candidate<T>> {
        match self {
            QueueType::Basic { queue_next, .. } => {
                let mut sink = QueueSink::new();
                queue_next(item, context, &mut sink);
                sink.pending
            }
            QueueType::Branching { queue_next, .. } => {
                let mut sink = BranchingQueueSink::new();
                queue_next(item, context, &mut sink);
                sink.pending
            }
        }
    }
}

/// Items of one walk waiting to be visited.
pub(crate) struct WorkQueue<T> {
    order: QueueOrder,
    items: VecDeque<(T, StepContext)>,
}

impl<T> WorkQueue<T> {
    pub(crate) fn new(order: QueueOrder) -> Self {
        Self {
            order,
            items: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, item: T, context: StepContext) {
        self.items.push_back((item, context));
    }

    pub(crate) fn pop(&mut self) -> Option<(T, StepContext)> {
        match self.order {
            QueueOrder::DepthFirst => self.items.pop_back(),
            QueueOrder::BreadthFirst => self.items.pop_front(),
        }
    }
}
