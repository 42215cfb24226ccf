//! Goals: named target conditions the planner searches towards.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GoapError, Result};
use crate::value::StateKey;
use crate::world_state::WorldState;

/// A named set of target conditions.
///
/// Priority is carried for goal-selection policies; the planner ignores it.
/// Two goals are equal when name, target and priority are all equal, which
/// is how the driver loop notices that the active goal changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "K: Serialize + StateKey",
        deserialize = "K: Deserialize<'de> + StateKey"
    ))
)]
pub struct Goal<K: StateKey> {
    name: String,
    target: WorldState<K>,
    priority: i32,
}

impl<K: StateKey> Goal<K> {
    /// Creates a goal with priority 0.
    pub fn new(name: impl Into<String>, target: WorldState<K>) -> Self {
        Self::with_priority(name, target, 0)
    }

    pub fn with_priority(name: impl Into<String>, target: WorldState<K>, priority: i32) -> Self {
        Self {
            name: name.into(),
            target,
            priority,
        }
    }

    /// Like [`Goal::with_priority`], but rejects an empty name or a mistyped target.
    pub fn try_new(name: impl Into<String>, target: WorldState<K>, priority: i32) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GoapError::InvalidGoal("goal name is empty".to_string()));
        }
        target.validate()?;
        Ok(Self::with_priority(name, target, priority))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &WorldState<K> {
        &self.target
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_satisfied(&self, state: &WorldState<K>) -> bool {
        state.satisfies(&self.target)
    }

    /// Target conditions still unmet in `state`.
    pub fn unsatisfied(&self, state: &WorldState<K>) -> WorldState<K> {
        state.diff(&self.target)
    }
}

impl<K: StateKey> fmt::Display for Goal<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Goal '{}' (priority {}): {}",
            self.name, self.priority, self.target
        )
    }
}
