//! Typed values and the key contract used by [`WorldState`](crate::WorldState).
//!
//! Hosts describe their facts with their own key enum and implement
//! [`StateKey`] on it, declaring the [`ValueKind`] every key carries:
//!
//! ```
//! use goap_engine::{StateKey, Value, ValueKind};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Fact {
//!     DoorOpen,
//!     Coins,
//!     Area,
//! }
//!
//! impl StateKey for Fact {
//!     fn kind(&self) -> ValueKind {
//!         match self {
//!             Fact::DoorOpen => ValueKind::Bool,
//!             Fact::Coins => ValueKind::Int,
//!             Fact::Area => ValueKind::Str,
//!         }
//!     }
//! }
//!
//! assert_eq!(Fact::Coins.kind(), ValueKind::Int);
//! assert_eq!(Value::default_for(ValueKind::Bool), Some(Value::Bool(false)));
//! assert_eq!(Value::default_for(ValueKind::Str), None);
//! ```

use std::fmt;
use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The value type a key is declared to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueKind {
    Bool,
    Int,
    Str,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Str => "string",
        };
        f.write_str(name)
    }
}

/// A fact identifier.
///
/// Implemented by the host's closed key enum. `Ord` gives world states a
/// stable iteration order for hashing and display.
pub trait StateKey: Copy + Eq + Hash + Ord + fmt::Debug + 'static {
    /// The kind of value this key holds.
    fn kind(&self) -> ValueKind;
}

/// A tagged world-state value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// The value a missing key of `kind` reads as.
    ///
    /// Strings have no default: a missing string key is "unset", which is
    /// distinct from an explicit empty string.
    pub fn default_for(kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::Bool => Some(Value::Bool(false)),
            ValueKind::Int => Some(Value::Int(0)),
            ValueKind::Str => None,
        }
    }

    /// Whether a missing key counts as holding this value.
    pub fn is_absent_default(&self) -> bool {
        matches!(self, Value::Bool(false) | Value::Int(0))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "\"{}\"", v),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}
