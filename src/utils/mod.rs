//! Driver loop and helpers for action implementations

pub mod automaton;
pub mod wait;

pub use automaton::{Automaton, AutomatonConfig, AutomatonState, TickOutcome};
pub use wait::{wait_until, Deadline};
