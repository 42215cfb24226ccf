//! # Planner
//!
//! The planner turns the current world state, a goal and an action catalogue
//! into a [`Plan`]. It is stateless between calls: every call searches from
//! scratch against the state it is given.
//!
//! Two entry points exist:
//!
//! - [`Planner::try_plan`] reports why no plan was produced
//!   ([`GoapError::NoPlanFound`] or [`GoapError::ExpansionLimit`]).
//! - [`Planner::plan`] logs the failure and returns an empty plan, so callers
//!   treat "unreachable" exactly like "retry later".
//!
//! An empty plan from [`Planner::plan`] is ambiguous: check
//! [`Goal::is_satisfied`] first if "already done" must be told apart from
//! "unreachable".
//!
//! ```
//! use goap_engine::{ActionBuilder, ActionResult, Goal, Planner, StateKey, ValueKind, WorldState};
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
//! let get_axe = ActionBuilder::new("GetAxe")
//!     .effect(Fact::HasAxe, true)
//!     .perform_with(|_, _| ActionResult::Success)
//!     .build_ref()?;
//! let cut_tree = ActionBuilder::new("CutTree")
//!     .precondition(Fact::HasAxe, true)
//!     .effect(Fact::HasLogs, true)
//!     .perform_with(|_, _| ActionResult::Success)
//!     .build_ref()?;
//!
//! let initial = WorldState::new().with(Fact::HasAxe, false);
//! let goal = Goal::new("GatherLogs", WorldState::new().with(Fact::HasLogs, true));
//!
//! let plan = Planner::new().plan(&initial, &goal, &[cut_tree, get_axe]);
//! assert_eq!(plan.names(), ["GetAxe", "CutTree"]);
//! # Ok::<(), goap_engine::GoapError>(())
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::ActionRef;
use crate::error::{GoapError, Result};
use crate::goal::Goal;
use crate::plan::Plan;
use crate::search::{BreadthFirstSearch, SearchAlgorithm};
use crate::value::StateKey;
use crate::world_state::WorldState;

/// Search budget shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Maximum number of nodes dequeued before the search gives up.
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 1000,
        }
    }
}

/// Finds action sequences that reach a goal.
///
/// Uses [`BreadthFirstSearch`] unless another strategy is supplied through
/// [`Planner::with_search_algorithm`].
pub struct Planner<K: StateKey> {
    config: PlannerConfig,
    search_algorithm: Box<dyn SearchAlgorithm<K>>,
}

impl<K: StateKey> Planner<K> {
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            search_algorithm: Box::new(BreadthFirstSearch),
        }
    }

    /// Replaces the search strategy, keeping the current config.
    ///
    /// ```
    /// # use goap_engine::{Planner, StateKey, UniformCostSearch, ValueKind};
    /// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    /// # enum Fact { Done }
    /// # impl StateKey for Fact { fn kind(&self) -> ValueKind { ValueKind::Bool } }
    /// let planner: Planner<Fact> = Planner::new().with_search_algorithm(UniformCostSearch);
    /// assert_eq!(planner.config().max_expansions, 1000);
    /// ```
    pub fn with_search_algorithm(mut self, search_algorithm: impl SearchAlgorithm<K> + 'static) -> Self {
        self.search_algorithm = Box::new(search_algorithm);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Searches for a plan, reporting failures as errors.
    ///
    /// # Errors
    ///
    /// * [`GoapError::NoPlanFound`] if every reachable state was expanded
    /// * [`GoapError::ExpansionLimit`] if the expansion budget ran out
    pub fn try_plan(
        &self,
        initial: &WorldState<K>,
        goal: &Goal<K>,
        actions: &[ActionRef<K>],
    ) -> Result<Plan<K>> {
        log::debug!(
            "Planning for goal '{}' from {} with {} actions",
            goal.name(),
            initial,
            actions.len()
        );

        let plan = self
            .search_algorithm
            .search(actions, initial, goal, &self.config)?;

        if plan.is_empty() {
            log::debug!("Goal '{}' already satisfied", goal.name());
        } else {
            log::info!(
                "Plan for goal '{}' ({} steps, cost {}): {}",
                goal.name(),
                plan.len(),
                plan.total_cost(),
                plan
            );
        }
        Ok(plan)
    }

    /// Searches for a plan, returning an empty plan when none exists.
    pub fn plan(&self, initial: &WorldState<K>, goal: &Goal<K>, actions: &[ActionRef<K>]) -> Plan<K> {
        match self.try_plan(initial, goal, actions) {
            Ok(plan) => plan,
            Err(err @ GoapError::ExpansionLimit { .. }) => {
                log::warn!("Planning for goal '{}' aborted: {}", goal.name(), err);
                Plan::empty()
            }
            Err(err) => {
                log::warn!("No plan for goal '{}': {}", goal.name(), err);
                Plan::empty()
            }
        }
    }
}

impl<K: StateKey> Default for Planner<K> {
    fn default() -> Self {
        Self::new()
    }
}
