//! Plan execution, one action step per tick.
//!
//! The engine owns the loaded [`Plan`] and the [`ExecutionContext`] of the
//! action at its head. Actions never keep execution state themselves: each
//! attempt gets a fresh context which is dropped when the attempt ends.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::{ActionRef, ActionResult};
use crate::context::ExecutionContext;
use crate::plan::Plan;
use crate::value::StateKey;
use crate::world_state::WorldState;

/// Where the engine is parked between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Executing,
}

/// Result of one [`ExecutionEngine::execute_next_step`] tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// No plan is loaded.
    Idle,
    /// The plan still has work; call again next tick.
    Executing,
    /// The last action succeeded and the plan is exhausted.
    PlanComplete,
    /// An action failed; the rest of the plan was discarded.
    ReplanNeeded,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Executing => "executing",
            EngineStatus::PlanComplete => "plan complete",
            EngineStatus::ReplanNeeded => "replan needed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Re-check `is_applicable` against the live state before starting each action.
    pub verify_applicability: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verify_applicability: true,
        }
    }
}

/// Drives a plan forward against the live world state.
///
/// A failed action is never retried and the plan is never skipped ahead:
/// any failure discards the plan and reports [`EngineStatus::ReplanNeeded`].
pub struct ExecutionEngine<K: StateKey> {
    config: EngineConfig,
    plan: Option<Plan<K>>,
    /// Context of the head action once it has been started.
    running: Option<ExecutionContext>,
}

impl<K: StateKey> ExecutionEngine<K> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            plan: None,
            running: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads `plan`, aborting whatever action was in flight.
    pub fn set_plan(&mut self, plan: Plan<K>) {
        self.abort_running();
        log::debug!("Loaded plan: {}", plan);
        self.plan = Some(plan);
    }

    /// Aborts the in-flight action and unloads the plan.
    pub fn clear(&mut self) {
        self.abort_running();
        self.plan = None;
    }

    /// True while a loaded plan still has actions left.
    pub fn is_executing(&self) -> bool {
        self.plan.as_ref().map_or(false, |plan| !plan.is_empty())
    }

    pub fn state(&self) -> EngineState {
        if self.is_executing() {
            EngineState::Executing
        } else {
            EngineState::Idle
        }
    }

    pub fn plan(&self) -> Option<&Plan<K>> {
        self.plan.as_ref()
    }

    /// Name of the action at the head of the plan.
    pub fn current_action_name(&self) -> Option<&str> {
        self.plan
            .as_ref()
            .and_then(|plan| plan.peek())
            .map(|action| action.name())
    }

    /// Context of the head action, if it has been started.
    pub fn current_context(&self) -> Option<&ExecutionContext> {
        self.running.as_ref()
    }

    pub fn remaining(&self) -> usize {
        self.plan.as_ref().map_or(0, |plan| plan.len())
    }

    /// Runs exactly one step of the head action.
    pub fn execute_next_step(&mut self, state: &mut WorldState<K>) -> EngineStatus {
        let action = match self.plan.as_ref() {
            None => return EngineStatus::Idle,
            Some(plan) => match plan.peek() {
                Some(action) => action.clone(),
                None => {
                    self.plan = None;
                    self.running = None;
                    return EngineStatus::PlanComplete;
                }
            },
        };

        let mut ctx = match self.running.take() {
            Some(ctx) => ctx,
            None => match self.start(&action, state) {
                Some(ctx) => ctx,
                None => return EngineStatus::ReplanNeeded,
            },
        };

        ctx.record_tick();
        let result = action.perform(state, &mut ctx);
        log::trace!(
            "Action {} tick {} -> {}",
            action.name(),
            ctx.ticks(),
            result
        );

        match result {
            ActionResult::Success => {
                action.on_success(&mut ctx);
                log::info!(
                    "Action {} succeeded after {} ticks",
                    action.name(),
                    ctx.ticks()
                );
                let finished = match self.plan.as_mut() {
                    Some(plan) => {
                        plan.pop_front();
                        plan.is_empty()
                    }
                    None => true,
                };
                if finished {
                    self.plan = None;
                    EngineStatus::PlanComplete
                } else {
                    EngineStatus::Executing
                }
            }
            ActionResult::Failure => {
                action.on_failure(&mut ctx);
                log::warn!("Action {} failed, discarding plan", action.name());
                self.plan = None;
                EngineStatus::ReplanNeeded
            }
            ActionResult::InProgress => {
                self.running = Some(ctx);
                EngineStatus::Executing
            }
        }
    }

    /// Prepares a fresh context for `action`, or discards the plan when the
    /// action can no longer run.
    fn start(&mut self, action: &ActionRef<K>, state: &WorldState<K>) -> Option<ExecutionContext> {
        let mut ctx = ExecutionContext::new();

        if self.config.verify_applicability && !action.is_applicable(state) {
            log::warn!(
                "Action {} preconditions no longer satisfied",
                action.name()
            );
            action.on_failure(&mut ctx);
            self.plan = None;
            return None;
        }

        log::info!("Starting action {}", action.name());
        action.on_start(&mut ctx);
        Some(ctx)
    }

    fn abort_running(&mut self) {
        if let Some(mut ctx) = self.running.take() {
            if let Some(action) = self.plan.as_ref().and_then(|plan| plan.peek()) {
                log::info!("Aborting action {}", action.name());
                action.on_abort(&mut ctx);
            }
        }
    }
}

impl<K: StateKey> Default for ExecutionEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> fmt::Debug for ExecutionEngine<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("config", &self.config)
            .field("plan", &self.plan)
            .field("running", &self.running)
            .finish()
    }
}
