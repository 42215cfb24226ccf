//! Goal-Oriented Action Planning for tick-driven agents.
//!
//! The crate splits an agent into a pure planning side and an effectful
//! execution side:
//!
//! - [`WorldState`] holds typed facts keyed by a host enum implementing [`StateKey`].
//! - [`Action`] describes a capability through preconditions, effects and cost,
//!   and performs it one tick at a time.
//! - [`Planner`] searches for the shortest action sequence that reaches a [`Goal`].
//! - [`ExecutionEngine`] drives a [`Plan`] step by step and asks for a replan on failure.
//! - [`utils::Automaton`] runs the sense, think, plan, act loop around them.

mod action;
mod context;
mod engine;
mod error;
mod goal;
mod plan;
mod planner;
mod search;
mod selector;
mod sensor;
mod value;
mod visualizer;
mod world_state;

pub mod utils;

pub use action::{Action, ActionBuilder, ActionRef, ActionResult, FnAction};
pub use context::{CtxKey, ExecutionContext};
pub use engine::{EngineConfig, EngineState, EngineStatus, ExecutionEngine};
pub use error::{GoapError, Result};
pub use goal::Goal;
pub use plan::Plan;
pub use planner::{Planner, PlannerConfig};
pub use search::{BreadthFirstSearch, SearchAlgorithm, UniformCostSearch};
pub use selector::{GoalLadder, GoalSelector};
pub use sensor::{FnSensor, Sensor, Sensors};
pub use value::{StateKey, Value, ValueKind};
pub use visualizer::GoapVisualizer;
pub use world_state::WorldState;
