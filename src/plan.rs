//! The ordered action sequence produced by the planner.

use std::collections::VecDeque;
use std::fmt;

use crate::action::ActionRef;
use crate::value::StateKey;

/// A FIFO queue of actions, consumed head-first by the execution engine.
///
/// An empty plan means either "nothing to do" or "no plan found"; callers
/// that care about the difference check the goal before planning or use
/// [`Planner::try_plan`](crate::Planner::try_plan).
pub struct Plan<K: StateKey> {
    steps: VecDeque<ActionRef<K>>,
}

impl<K: StateKey> Plan<K> {
    pub fn new(steps: impl IntoIterator<Item = ActionRef<K>>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The next action to execute, without consuming it.
    pub fn peek(&self) -> Option<&ActionRef<K>> {
        self.steps.front()
    }

    pub fn pop_front(&mut self) -> Option<ActionRef<K>> {
        self.steps.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionRef<K>> {
        self.steps.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|action| action.name()).collect()
    }

    pub fn total_cost(&self) -> f64 {
        self.steps.iter().map(|action| action.cost()).sum()
    }
}

impl<K: StateKey> Clone for Plan<K> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<K: StateKey> Default for Plan<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: StateKey> FromIterator<ActionRef<K>> for Plan<K> {
    fn from_iter<I: IntoIterator<Item = ActionRef<K>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<K: StateKey> fmt::Display for Plan<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "<empty plan>");
        }
        write!(f, "{}", self.names().join(" -> "))
    }
}

impl<K: StateKey> fmt::Debug for Plan<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
