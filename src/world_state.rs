//! World state representation for GOAP (Goal-Oriented Action Planning).
//!
//! This module provides the [`WorldState`] structure, which is the foundation for:
//! - Representing the agent's belief about the environment
//! - Describing action preconditions and effects
//! - Describing goal targets
//! - Checking if one state satisfies a set of conditions
//!
//! A world state maps host-defined keys (see [`StateKey`]) to tagged
//! [`Value`]s. Reads never fail: a missing boolean reads as `false`, a missing
//! integer reads as `0` and a missing string reads as unset (`None`).
//!
//! # Example
//!
//! ```
//! use goap_engine::{StateKey, ValueKind, WorldState};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Fact {
//!     HasAxe,
//!     Logs,
//!     Area,
//! }
//!
//! impl StateKey for Fact {
//!     fn kind(&self) -> ValueKind {
//!         match self {
//!             Fact::HasAxe => ValueKind::Bool,
//!             Fact::Logs => ValueKind::Int,
//!             Fact::Area => ValueKind::Str,
//!         }
//!     }
//! }
//!
//! let mut world_state = WorldState::new();
//! world_state.set_str(Fact::Area, "forest");
//!
//! // Missing keys read as their type's default
//! assert!(!world_state.get_bool(Fact::HasAxe));
//! assert_eq!(world_state.get_int(Fact::Logs), 0);
//!
//! // A goal that wants logs is not satisfied yet
//! let goal = WorldState::new().with(Fact::Logs, 1);
//! assert!(!world_state.satisfies(&goal));
//!
//! world_state.apply_effects(&WorldState::new().with(Fact::Logs, 1));
//! assert!(world_state.satisfies(&goal));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GoapError, Result};
use crate::value::{StateKey, Value};

/// A snapshot of environment facts, also used as a condition map.
///
/// `Clone` is a full, independent copy: there is no shared mutable
/// substructure, so the planner can branch hypothetical futures freely.
/// Equality and hashing cover the complete key/value mapping and do not
/// depend on insertion order.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "K: Serialize + StateKey",
        deserialize = "K: Deserialize<'de> + StateKey"
    ))
)]
pub struct WorldState<K> {
    state: HashMap<K, Value>,
}

impl<K: StateKey> WorldState<K> {
    /// Creates an empty world state.
    pub fn new() -> Self {
        Self {
            state: HashMap::new(),
        }
    }

    /// Builder-style insert, handy for literal condition maps.
    ///
    /// ```
    /// # use goap_engine::{StateKey, ValueKind, WorldState};
    /// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    /// # enum Fact { DoorOpen }
    /// # impl StateKey for Fact { fn kind(&self) -> ValueKind { ValueKind::Bool } }
    /// let preconditions = WorldState::new().with(Fact::DoorOpen, false);
    /// assert_eq!(preconditions.len(), 1);
    /// ```
    pub fn with(mut self, key: K, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: K) -> Option<&Value> {
        self.state.get(&key)
    }

    /// Reads a boolean fact; missing or mistyped keys read as `false`.
    pub fn get_bool(&self, key: K) -> bool {
        self.state
            .get(&key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Reads an integer fact; missing or mistyped keys read as `0`.
    pub fn get_int(&self, key: K) -> i64 {
        self.state.get(&key).and_then(Value::as_int).unwrap_or(0)
    }

    /// Reads a string fact; missing or mistyped keys read as unset.
    pub fn get_str(&self, key: K) -> Option<&str> {
        self.state.get(&key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: K, value: impl Into<Value>) {
        self.state.insert(key, value.into());
    }

    pub fn set_bool(&mut self, key: K, value: bool) {
        self.state.insert(key, Value::Bool(value));
    }

    pub fn set_int(&mut self, key: K, value: i64) {
        self.state.insert(key, Value::Int(value));
    }

    pub fn set_str(&mut self, key: K, value: impl Into<String>) {
        self.state.insert(key, Value::Str(value.into()));
    }

    /// Removes a fact, returning it to its default/unset reading.
    pub fn unset(&mut self, key: K) -> Option<Value> {
        self.state.remove(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.state.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Value)> {
        self.state.iter()
    }

    /// Checks whether every condition holds in this state.
    ///
    /// A condition holds when the key is present with an equal value, or when
    /// the key is absent and the required value is `false` or `0`. A present
    /// key holding a value of a different kind never satisfies the condition.
    pub fn satisfies(&self, conditions: &WorldState<K>) -> bool {
        conditions
            .state
            .iter()
            .all(|(key, required)| match self.state.get(key) {
                Some(actual) if actual.kind() != required.kind() => {
                    log::trace!(
                        "Condition on {:?} compares {} against {}",
                        key,
                        actual.kind(),
                        required.kind()
                    );
                    false
                }
                Some(actual) => actual == required,
                None => required.is_absent_default(),
            })
    }

    /// Bulk upsert; the effect's value wins for every key it names.
    pub fn apply_effects(&mut self, effects: &WorldState<K>) {
        for (key, value) in effects.state.iter() {
            self.state.insert(*key, value.clone());
        }
    }

    /// Returns a copy of this state with `changes` applied.
    pub fn apply(&self, changes: &WorldState<K>) -> Self {
        let mut new_state = self.clone();
        new_state.apply_effects(changes);
        new_state
    }

    /// The conditions from `required` that this state does not satisfy.
    pub fn diff(&self, required: &WorldState<K>) -> Self {
        let mut diff = WorldState::new();
        for (key, value) in required.state.iter() {
            let single = WorldState::new().with(*key, value.clone());
            if !self.satisfies(&single) {
                diff.state.insert(*key, value.clone());
            }
        }
        diff
    }

    pub fn unsatisfied_count(&self, required: &WorldState<K>) -> usize {
        self.diff(required).len()
    }

    /// Verifies every stored value matches its key's declared kind.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.sorted_entries() {
            if key.kind() != value.kind() {
                return Err(GoapError::ValueKindMismatch {
                    key: format!("{:?}", key),
                    expected: key.kind().to_string(),
                    found: value.kind().to_string(),
                });
            }
        }
        Ok(())
    }

    fn sorted_entries(&self) -> Vec<(&K, &Value)> {
        let mut items: Vec<_> = self.state.iter().collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        items
    }
}

impl<K: StateKey> Default for WorldState<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> Hash for WorldState<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Sorted so equal maps hash equally regardless of insertion order
        for (key, value) in self.sorted_entries() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: StateKey> PartialEq for WorldState<K> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<K: StateKey> Eq for WorldState<K> {}

impl<K: StateKey> FromIterator<(K, Value)> for WorldState<K> {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            state: iter.into_iter().collect(),
        }
    }
}

impl<K: StateKey> fmt::Display for WorldState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in self.sorted_entries() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
            first = false;
        }
        write!(f, "}}")
    }
}
