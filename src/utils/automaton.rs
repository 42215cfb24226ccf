//! The tick-driven driver loop.
//!
//! An [`Automaton`] ties the pieces together. Each [`Automaton::tick`] senses
//! the environment, selects a goal, plans when no plan is running and then
//! advances the plan by exactly one step. The tick returns how long the host
//! should wait before the next one; [`Automaton::run`] does that waiting
//! itself.
//!
//! ```
//! use goap_engine::utils::automaton::{Automaton, AutomatonConfig, TickOutcome};
//! use goap_engine::{ActionBuilder, ActionResult, Goal, Sensors, StateKey, ValueKind, WorldState};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Fact {
//!     DoorOpen,
//! }
//!
//! impl StateKey for Fact {
//!     fn kind(&self) -> ValueKind {
//!         ValueKind::Bool
//!     }
//! }
//!
//! let open = ActionBuilder::new("OpenDoor")
//!     .precondition(Fact::DoorOpen, false)
//!     .effect(Fact::DoorOpen, true)
//!     .perform_with(|state, _| {
//!         state.set_bool(Fact::DoorOpen, true);
//!         ActionResult::Success
//!     })
//!     .build_ref()?;
//!
//! let mut opened = false;
//! let selector = move |state: &WorldState<Fact>| {
//!     if opened {
//!         return None;
//!     }
//!     opened = state.get_bool(Fact::DoorOpen);
//!     Some(Goal::new("OpenDoor", WorldState::new().with(Fact::DoorOpen, true)))
//! };
//!
//! let mut agent = Automaton::new("door", WorldState::new(), Sensors::new(), vec![open], selector)
//!     .with_config(AutomatonConfig::immediate());
//!
//! assert!(matches!(agent.tick(), TickOutcome::Continue(_)));
//! assert!(agent.world_state().get_bool(Fact::DoorOpen));
//! assert_eq!(agent.run(10), 2);
//! # Ok::<(), goap_engine::GoapError>(())
//! ```

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::ActionRef;
use crate::engine::{EngineStatus, ExecutionEngine};
use crate::goal::Goal;
use crate::planner::Planner;
use crate::selector::GoalSelector;
use crate::sensor::Sensors;
use crate::value::StateKey;
use crate::world_state::WorldState;

/// The phase the automaton is in, observable between and during ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonState {
    WaitingOrders,
    Sensing,
    Thinking,
    Planning,
    Acting,
}

/// What the host should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Wait this long, then tick again.
    Continue(Duration),
    /// The goal selector reports the objective complete.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutomatonConfig {
    /// Delay after an ordinary tick.
    pub loop_delay: Duration,
    /// Delay when the current goal already holds.
    pub idle_delay: Duration,
    /// Delay after sensing failed or no plan was found.
    pub replan_delay: Duration,
    /// Consecutive failures of one action for one goal before it is logged as an error.
    pub failure_alert_threshold: u32,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            loop_delay: Duration::from_millis(600),
            idle_delay: Duration::from_millis(1000),
            replan_delay: Duration::from_millis(2000),
            failure_alert_threshold: 3,
        }
    }
}

impl AutomatonConfig {
    /// All delays zero. Useful for simulations and tests.
    pub fn immediate() -> Self {
        Self {
            loop_delay: Duration::ZERO,
            idle_delay: Duration::ZERO,
            replan_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

pub struct Automaton<K: StateKey, S: GoalSelector<K>> {
    name: String,
    state: AutomatonState,
    world_state: WorldState<K>,
    sensors: Sensors<K>,
    actions: Vec<ActionRef<K>>,
    planner: Planner<K>,
    engine: ExecutionEngine<K>,
    selector: S,
    goal: Option<Goal<K>>,
    config: AutomatonConfig,
    /// Consecutive failures keyed by (goal name, action name).
    failures: HashMap<(String, String), u32>,
    planning_failures: u32,
}

impl<K: StateKey, S: GoalSelector<K>> Automaton<K, S> {
    pub fn new(
        name: impl Into<String>,
        world_state: WorldState<K>,
        sensors: Sensors<K>,
        actions: Vec<ActionRef<K>>,
        selector: S,
    ) -> Self {
        Self {
            name: name.into(),
            state: AutomatonState::WaitingOrders,
            world_state,
            sensors,
            actions,
            planner: Planner::new(),
            engine: ExecutionEngine::new(),
            selector,
            goal: None,
            config: AutomatonConfig::default(),
            failures: HashMap::new(),
            planning_failures: 0,
        }
    }

    pub fn with_config(mut self, config: AutomatonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_planner(mut self, planner: Planner<K>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_engine(mut self, engine: ExecutionEngine<K>) -> Self {
        self.engine = engine;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> AutomatonState {
        self.state
    }

    pub fn world_state(&self) -> &WorldState<K> {
        &self.world_state
    }

    pub fn world_state_mut(&mut self) -> &mut WorldState<K> {
        &mut self.world_state
    }

    pub fn goal(&self) -> Option<&Goal<K>> {
        self.goal.as_ref()
    }

    pub fn engine(&self) -> &ExecutionEngine<K> {
        &self.engine
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    /// Consecutive failures recorded for `action` while pursuing `goal`.
    pub fn failure_count(&self, goal: &str, action: &str) -> u32 {
        self.failures
            .get(&(goal.to_string(), action.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Consecutive planning attempts that produced no plan for the current goal.
    pub fn planning_failures(&self) -> u32 {
        self.planning_failures
    }

    /// Runs one sense, think, plan, act cycle.
    pub fn tick(&mut self) -> TickOutcome {
        // Sensing
        self.state = AutomatonState::Sensing;
        if let Err(err) = self.sensors.run_all(&mut self.world_state) {
            log::error!("{}: sensing failed: {}", self.name, err);
            return self.wait(self.config.replan_delay);
        }

        // Thinking
        self.state = AutomatonState::Thinking;
        let goal = match self.selector.select(&self.world_state) {
            Some(goal) => goal,
            None => {
                log::info!("{}: objective complete", self.name);
                self.engine.clear();
                self.goal = None;
                self.state = AutomatonState::WaitingOrders;
                return TickOutcome::Finished;
            }
        };

        if self.goal.as_ref() != Some(&goal) {
            if let Some(previous) = &self.goal {
                log::info!(
                    "{}: goal changed from '{}' to '{}', discarding plan",
                    self.name,
                    previous.name(),
                    goal.name()
                );
            } else {
                log::info!("{}: pursuing goal '{}'", self.name, goal.name());
            }
            self.engine.clear();
            self.failures.clear();
            self.planning_failures = 0;
            self.goal = Some(goal.clone());
        }

        if goal.is_satisfied(&self.world_state) {
            log::debug!("{}: goal '{}' already satisfied", self.name, goal.name());
            self.engine.clear();
            self.goal = None;
            return self.wait(self.config.idle_delay);
        }

        // Planning
        if !self.engine.is_executing() {
            self.state = AutomatonState::Planning;
            let plan = self.planner.plan(&self.world_state, &goal, &self.actions);
            if plan.is_empty() {
                self.planning_failures += 1;
                if self.planning_failures >= self.config.failure_alert_threshold {
                    log::error!(
                        "{}: no plan for goal '{}' after {} attempts",
                        self.name,
                        goal.name(),
                        self.planning_failures
                    );
                } else {
                    log::warn!(
                        "{}: no plan for goal '{}', retrying in {:?}",
                        self.name,
                        goal.name(),
                        self.config.replan_delay
                    );
                }
                return self.wait(self.config.replan_delay);
            }
            self.planning_failures = 0;
            self.engine.set_plan(plan);
        }

        // Acting
        self.state = AutomatonState::Acting;
        let action = self
            .engine
            .current_action_name()
            .unwrap_or_default()
            .to_string();
        let status = self.engine.execute_next_step(&mut self.world_state);

        match status {
            EngineStatus::ReplanNeeded => self.record_failure(&goal, &action),
            EngineStatus::PlanComplete => {
                log::info!("{}: plan for goal '{}' complete", self.name, goal.name());
                self.reset_failure(&goal, &action);
                self.goal = None;
            }
            EngineStatus::Executing => {
                if self.engine.current_action_name() != Some(action.as_str()) {
                    self.reset_failure(&goal, &action);
                }
            }
            EngineStatus::Idle => {}
        }

        self.wait(self.config.loop_delay)
    }

    /// Ticks until the objective is complete or `max_ticks` ticks have run,
    /// sleeping between ticks. Returns the number of ticks run.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;

        while ticks < max_ticks {
            ticks += 1;
            match self.tick() {
                TickOutcome::Finished => break,
                TickOutcome::Continue(delay) => {
                    if ticks < max_ticks && !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
            }
        }

        ticks
    }

    fn wait(&mut self, delay: Duration) -> TickOutcome {
        self.state = AutomatonState::WaitingOrders;
        TickOutcome::Continue(delay)
    }

    fn record_failure(&mut self, goal: &Goal<K>, action: &str) {
        let count = self
            .failures
            .entry((goal.name().to_string(), action.to_string()))
            .or_insert(0);
        *count += 1;

        if *count >= self.config.failure_alert_threshold {
            log::error!(
                "{}: action {} failed {} times in a row for goal '{}'",
                self.name,
                action,
                count,
                goal.name()
            );
        } else {
            log::warn!(
                "{}: action {} failed for goal '{}', replanning",
                self.name,
                action,
                goal.name()
            );
        }
    }

    fn reset_failure(&mut self, goal: &Goal<K>, action: &str) {
        self.failures
            .remove(&(goal.name().to_string(), action.to_string()));
    }
}
