use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Per-step metadata handed to conditions and actions.
///
/// A context is built when its item is queued and never changes afterwards,
/// except for `is_stopping`, which the engine sets once before any action
/// sees it.
#[derive(Clone, Default)]
pub struct StepContext {
    /// Steps taken from the start item along the current path. Start items are 0.
    pub step_number: usize,
    pub is_start_item: bool,
    pub is_branch_start_item: bool,
    /// Branches spawned between the traversal root and this step.
    pub branch_depth: usize,
    pub is_stopping: bool,
    values: HashMap<String, Rc<dyn Any>>,
}

impl StepContext {
    pub(crate) fn start() -> Self {
        Self {
            is_start_item: true,
            ..Self::default()
        }
    }

    pub(crate) fn next(&self, is_branch: bool) -> Self {
        Self {
            step_number: self.step_number + 1,
            is_start_item: false,
            is_branch_start_item: is_branch,
            branch_depth: if is_branch {
                self.branch_depth + 1
            } else {
                self.branch_depth
            },
            is_stopping: false,
            values: HashMap::new(),
        }
    }

    /// The value a [`ContextValueComputer`] registered under `key` produced
    /// for this step. `None` if no computer uses the key or its value is not
    /// a `V`.
    pub fn value<V: 'static>(&self, key: &str) -> Option<&V> {
        self.values.get(key).and_then(|v| (**v).downcast_ref::<V>())
    }

    pub(crate) fn raw_value(&self, key: &str) -> Option<&Rc<dyn Any>> {
        self.values.get(key)
    }

    pub(crate) fn set_raw_value(&mut self, key: &str, value: Rc<dyn Any>) {
        self.values.insert(key.to_string(), value);
    }
}

impl fmt::Debug for StepContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("StepContext")
            .field("step_number", &self.step_number)
            .field("is_start_item", &self.is_start_item)
            .field("is_branch_start_item", &self.is_branch_start_item)
            .field("branch_depth", &self.branch_depth)
            .field("is_stopping", &self.is_stopping)
            .field("values", &keys)
            .finish()
    }
}

/// Computes a value carried along each path of a traversal, readable from
/// [`StepContext::value`] under [`key`](ContextValueComputer::key).
pub trait ContextValueComputer<T> {
    type Value: 'static;

    fn key(&self) -> &str;

    /// Value for a start item.
    fn compute_initial_value(&self, item: &T) -> Self::Value;

    /// Value for `next`, queued from `current` whose value was `current_value`.
    fn compute_next_value(&self, next: &T, current: &T, current_value: &Self::Value) -> Self::Value;
}

pub(crate) trait ErasedComputer<T> {
    fn key(&self) -> &str;
    fn initial(&self, item: &T) -> Rc<dyn Any>;
    fn next(&self, next: &T, current: &T, current_value: Option<&Rc<dyn Any>>) -> Rc<dyn Any>;
}

pub(crate) struct Erased<C>(pub C);

impl<T, C: ContextValueComputer<T>> ErasedComputer<T> for Erased<C> {
    fn key(&self) -> &str {
        self.0.key()
    }

    fn initial(&self, item: &T) -> Rc<dyn Any> {
        Rc::new(self.0.compute_initial_value(item))
    }

    fn next(&self, next: &T, current: &T, current_value: Option<&Rc<dyn Any>>) -> Rc<dyn Any> {
        // A computer registered between runs has no value on in-flight
        // contexts; treat its first sighting like a start.
        match current_value.and_then(|v| (**v).downcast_ref::<C::Value>()) {
            Some(value) => Rc::new(self.0.compute_next_value(next, current, value)),
            None => Rc::new(self.0.compute_initial_value(next)),
        }
    }
}
