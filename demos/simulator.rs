//! Runs the planner and execution engine against mock actions, printing each
//! step. Start with `cargo run --example simulator`.

use std::error::Error;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use goap_engine::{
    Action, ActionRef, ActionResult, CtxKey, EngineStatus, ExecutionContext, ExecutionEngine,
    GoapVisualizer, Goal, Planner, StateKey, ValueKind, WorldState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Fact {
    TaskDone,
    HasAxe,
    CurrentArea,
}

impl StateKey for Fact {
    fn kind(&self) -> ValueKind {
        match self {
            Fact::CurrentArea => ValueKind::Str,
            _ => ValueKind::Bool,
        }
    }
}

const WORKED: CtxKey<u32> = CtxKey::new("worked");

/// Needs several ticks before it reports success.
struct SlowTask {
    ticks: u32,
    pre: WorldState<Fact>,
    eff: WorldState<Fact>,
}

impl SlowTask {
    fn new(ticks: u32) -> Self {
        Self {
            ticks,
            pre: WorldState::new().with(Fact::TaskDone, false),
            eff: WorldState::new().with(Fact::TaskDone, true),
        }
    }
}

impl Action<Fact> for SlowTask {
    fn name(&self) -> &str {
        "SlowTask"
    }

    fn preconditions(&self) -> &WorldState<Fact> {
        &self.pre
    }

    fn effects(&self) -> &WorldState<Fact> {
        &self.eff
    }

    fn perform(&self, state: &mut WorldState<Fact>, ctx: &mut ExecutionContext) -> ActionResult {
        let worked = ctx.get(WORKED).copied().unwrap_or(0) + 1;
        ctx.set(WORKED, worked);
        println!("  SlowTask working ({}/{})", worked, self.ticks);

        if worked < self.ticks {
            return ActionResult::InProgress;
        }
        state.set_bool(Fact::TaskDone, true);
        ActionResult::Success
    }

    fn on_abort(&self, ctx: &mut ExecutionContext) {
        ctx.clear();
    }
}

/// Always fails; shows how a failure forces a replan.
struct Sabotage {
    pre: WorldState<Fact>,
    eff: WorldState<Fact>,
}

impl Action<Fact> for Sabotage {
    fn name(&self) -> &str {
        "Sabotage"
    }

    fn preconditions(&self) -> &WorldState<Fact> {
        &self.pre
    }

    fn effects(&self) -> &WorldState<Fact> {
        &self.eff
    }

    fn cost(&self) -> f64 {
        5.0
    }

    fn perform(&self, _state: &mut WorldState<Fact>, _ctx: &mut ExecutionContext) -> ActionResult {
        ActionResult::Failure
    }
}

/// Picks up an item when standing in the right area.
struct GetItem {
    name: String,
    item: Fact,
    pre: WorldState<Fact>,
    eff: WorldState<Fact>,
}

impl GetItem {
    fn new(item_name: &str, item: Fact, area: &str) -> Self {
        Self {
            name: format!("Get{}", item_name),
            item,
            pre: WorldState::new()
                .with(item, false)
                .with(Fact::CurrentArea, area),
            eff: WorldState::new().with(item, true),
        }
    }
}

impl Action<Fact> for GetItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn preconditions(&self) -> &WorldState<Fact> {
        &self.pre
    }

    fn effects(&self) -> &WorldState<Fact> {
        &self.eff
    }

    fn perform(&self, state: &mut WorldState<Fact>, _ctx: &mut ExecutionContext) -> ActionResult {
        state.set_bool(self.item, true);
        ActionResult::Success
    }
}

fn execute(engine: &mut ExecutionEngine<Fact>, state: &mut WorldState<Fact>, max_steps: usize) -> EngineStatus {
    let mut status = EngineStatus::Idle;
    let mut step = 0;

    while step < max_steps && engine.is_executing() {
        step += 1;
        println!("\n--- Engine Step {} ---", step);
        println!("State: {}", state);
        println!(
            "Executing: {}",
            engine.current_action_name().unwrap_or("<none>")
        );

        status = engine.execute_next_step(state);
        println!("Status: {}", status);

        if status == EngineStatus::ReplanNeeded {
            println!("Replan required, stopping this run");
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }

    if step >= max_steps {
        println!("Warning: hit max steps ({})", max_steps);
    }
    status
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("--- GOAP Simulation Start ---");

    let actions: Vec<ActionRef<Fact>> = vec![
        Rc::new(SlowTask::new(3)),
        Rc::new(Sabotage {
            pre: WorldState::new(),
            eff: WorldState::new().with(Fact::HasAxe, true),
        }),
        Rc::new(GetItem::new("Axe", Fact::HasAxe, "Anywhere")),
    ];

    let mut state = WorldState::new()
        .with(Fact::TaskDone, false)
        .with(Fact::HasAxe, false)
        .with(Fact::CurrentArea, "Anywhere");
    let goal = Goal::new(
        "CompleteTaskAndGetAxe",
        WorldState::new()
            .with(Fact::TaskDone, true)
            .with(Fact::HasAxe, true),
    );

    let names: Vec<&str> = actions.iter().map(|a| a.name()).collect();
    println!("Available actions: {:?}", names);
    println!("Initial state: {}", state);
    println!("{}", goal);

    // Breadth-first search takes the first action listed that makes progress,
    // so the expensive Sabotage gets picked for the axe.
    let plan = Planner::new().plan(&state, &goal, &actions);
    if plan.is_empty() {
        println!("No plan found, nothing to execute");
        return Ok(());
    }
    println!("\nPlan: {} (cost {})", plan, plan.total_cost());

    let dot = std::env::temp_dir().join("goap_simulator.dot");
    GoapVisualizer::new().visualize_plan(&state, &goal, &plan, &dot)?;
    println!("Plan graph written to {}", dot.display());

    let mut engine = ExecutionEngine::new();
    engine.set_plan(plan);
    let status = execute(&mut engine, &mut state, 20);

    if status == EngineStatus::ReplanNeeded {
        // Drop the saboteur and plan again from the observed state
        let remaining: Vec<ActionRef<Fact>> = actions
            .iter()
            .filter(|a| a.name() != "Sabotage")
            .cloned()
            .collect();
        let plan = Planner::new().plan(&state, &goal, &remaining);
        println!("\nReplanned: {}", plan);
        engine.set_plan(plan);
        execute(&mut engine, &mut state, 20);
    }

    println!("\nFinal state: {}", state);
    println!("Goal satisfied: {}", goal.is_satisfied(&state));
    println!("--- GOAP Simulation End ---");
    Ok(())
}
