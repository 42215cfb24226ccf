//! # Action Module for Goal-Oriented Action Planning (GOAP)
//!
//! This module provides the capability contract every action implements and a
//! ready-made closure-backed action for hosts that do not need a dedicated type.
//!
//! ## Key Components
//!
//! * [`Action`]: preconditions, effects and cost for planning, plus `perform` for execution
//! * [`ActionResult`]: the outcome of one `perform` call
//! * [`FnAction`] / [`ActionBuilder`]: an [`Action`] built from closures
//!
//! Planning only ever touches `preconditions`, `effects`, `cost` and
//! `is_applicable`. Execution goes through `perform` and the lifecycle hooks,
//! which receive the engine-owned [`ExecutionContext`] for that attempt.
//!
//! ## Basic Usage
//!
//! ```
//! use goap_engine::{ActionBuilder, ActionResult, StateKey, ValueKind, WorldState};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Fact {
//!     HasAxe,
//!     HasLogs,
//! }
//!
//! impl StateKey for Fact {
//!     fn kind(&self) -> ValueKind {
//!         ValueKind::Bool
//!     }
//! }
//!
//! let cut_tree = ActionBuilder::new("CutTree")
//!     .precondition(Fact::HasAxe, true)
//!     .effect(Fact::HasLogs, true)
//!     .perform_with(|state, _ctx| {
//!         state.set_bool(Fact::HasLogs, true);
//!         ActionResult::Success
//!     })
//!     .build()
//!     .unwrap();
//!
//! use goap_engine::Action;
//! let mut state = WorldState::new();
//! assert!(!cut_tree.is_applicable(&state));
//! state.set_bool(Fact::HasAxe, true);
//! assert!(cut_tree.is_applicable(&state));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::error::{GoapError, Result};
use crate::value::{StateKey, Value};
use crate::world_state::WorldState;

/// Outcome of a single `perform` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// The action reached its objective.
    Success,
    /// The action cannot complete; the simulated plan is no longer valid.
    Failure,
    /// The action is still running and must be performed again next tick.
    InProgress,
}

impl ActionResult {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionResult::InProgress)
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionResult::Success => "success",
            ActionResult::Failure => "failure",
            ActionResult::InProgress => "in progress",
        };
        f.write_str(label)
    }
}

/// A capability the agent can plan with and execute.
///
/// Implementations must keep `is_applicable` free of side effects: the
/// planner calls it speculatively and repeatedly on hypothetical states.
/// `perform` is the only method allowed to drive the external environment.
/// It may be called again for the same attempt after returning
/// [`ActionResult::InProgress`], and must eventually return a terminal result.
pub trait Action<K: StateKey> {
    /// Human-readable name, used for logging.
    fn name(&self) -> &str;

    /// Conditions that must all hold for the action to be applicable.
    fn preconditions(&self) -> &WorldState<K>;

    /// State changes assumed on success while planning.
    fn effects(&self) -> &WorldState<K>;

    /// Constant, non-negative cost.
    fn cost(&self) -> f64 {
        1.0
    }

    /// Whether the action may be chosen in `state`.
    ///
    /// Overrides must still return `false` whenever the preconditions fail.
    fn is_applicable(&self, state: &WorldState<K>) -> bool {
        state.satisfies(self.preconditions())
    }

    /// Runs one tick of the action against the live environment.
    fn perform(&self, state: &mut WorldState<K>, ctx: &mut ExecutionContext) -> ActionResult;

    fn on_start(&self, _ctx: &mut ExecutionContext) {}

    fn on_success(&self, _ctx: &mut ExecutionContext) {}

    fn on_failure(&self, _ctx: &mut ExecutionContext) {}

    /// Called when a plan is abandoned while this action is mid-attempt.
    fn on_abort(&self, _ctx: &mut ExecutionContext) {}
}

/// Shared handle to an action; catalogues and plans hold these.
pub type ActionRef<K> = Rc<dyn Action<K>>;

type PerformFn<K> = dyn Fn(&mut WorldState<K>, &mut ExecutionContext) -> ActionResult;
type ApplicableFn<K> = dyn Fn(&WorldState<K>) -> bool;

/// An [`Action`] assembled from closures by [`ActionBuilder`].
pub struct FnAction<K: StateKey> {
    name: String,
    cost: f64,
    preconditions: WorldState<K>,
    effects: WorldState<K>,
    applicable: Option<Box<ApplicableFn<K>>>,
    perform: Box<PerformFn<K>>,
}

impl<K: StateKey> FnAction<K> {
    pub fn into_ref(self) -> ActionRef<K> {
        Rc::new(self)
    }
}

impl<K: StateKey> Action<K> for FnAction<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn preconditions(&self) -> &WorldState<K> {
        &self.preconditions
    }

    fn effects(&self) -> &WorldState<K> {
        &self.effects
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn is_applicable(&self, state: &WorldState<K>) -> bool {
        state.satisfies(&self.preconditions)
            && self.applicable.as_ref().map_or(true, |check| check(state))
    }

    fn perform(&self, state: &mut WorldState<K>, ctx: &mut ExecutionContext) -> ActionResult {
        (self.perform)(state, ctx)
    }
}

impl<K: StateKey> fmt::Debug for FnAction<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .field("cost", &self.cost)
            .field("preconditions", &self.preconditions)
            .field("effects", &self.effects)
            .finish()
    }
}

/// Builder for [`FnAction`].
pub struct ActionBuilder<K: StateKey> {
    name: String,
    cost: f64,
    preconditions: WorldState<K>,
    effects: WorldState<K>,
    applicable: Option<Box<ApplicableFn<K>>>,
    perform: Option<Box<PerformFn<K>>>,
}

impl<K: StateKey> ActionBuilder<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: 1.0,
            preconditions: WorldState::new(),
            effects: WorldState::new(),
            applicable: None,
            perform: None,
        }
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn precondition(mut self, key: K, value: impl Into<Value>) -> Self {
        self.preconditions.set(key, value);
        self
    }

    pub fn effect(mut self, key: K, value: impl Into<Value>) -> Self {
        self.effects.set(key, value);
        self
    }

    /// Adds a runtime feasibility check on top of the precondition map.
    pub fn applicable_when<F>(mut self, check: F) -> Self
    where
        F: Fn(&WorldState<K>) -> bool + 'static,
    {
        self.applicable = Some(Box::new(check));
        self
    }

    pub fn perform_with<F>(mut self, perform: F) -> Self
    where
        F: Fn(&mut WorldState<K>, &mut ExecutionContext) -> ActionResult + 'static,
    {
        self.perform = Some(Box::new(perform));
        self
    }

    /// Validates and builds the action.
    ///
    /// # Errors
    ///
    /// * [`GoapError::MissingActionName`] if the name is empty
    /// * [`GoapError::InvalidActionCost`] if the cost is negative, NaN or infinite
    /// * [`GoapError::MissingPerform`] if no perform function was supplied
    /// * [`GoapError::ValueKindMismatch`] if a condition or effect is mistyped
    pub fn build(self) -> Result<FnAction<K>> {
        if self.name.trim().is_empty() {
            return Err(GoapError::MissingActionName);
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(GoapError::InvalidActionCost(self.cost));
        }
        self.preconditions.validate()?;
        self.effects.validate()?;
        let perform = self
            .perform
            .ok_or_else(|| GoapError::MissingPerform(self.name.clone()))?;

        Ok(FnAction {
            name: self.name,
            cost: self.cost,
            preconditions: self.preconditions,
            effects: self.effects,
            applicable: self.applicable,
            perform,
        })
    }

    /// Builds the action straight into a shared [`ActionRef`].
    pub fn build_ref(self) -> Result<ActionRef<K>> {
        self.build().map(FnAction::into_ref)
    }
}
