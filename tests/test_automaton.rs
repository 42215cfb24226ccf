use std::cell::RefCell;
use std::rc::Rc;

use goap_engine::utils::{Automaton, AutomatonConfig, AutomatonState, TickOutcome};
use goap_engine::{
    ActionBuilder, ActionRef, ActionResult, CtxKey, FnSensor, Goal, GoalLadder, Sensors, StateKey,
    ValueKind, WorldState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Fact {
    DoorOpen,
    HasLogs,
    Stage,
}

impl StateKey for Fact {
    fn kind(&self) -> ValueKind {
        match self {
            Fact::Stage => ValueKind::Int,
            _ => ValueKind::Bool,
        }
    }
}

/// A tiny simulated environment the agent observes and acts on.
#[derive(Debug, Default)]
struct Env {
    door_open: bool,
    door_jammed: bool,
    has_logs: bool,
    stage: i64,
}

type SharedEnv = Rc<RefCell<Env>>;

const SWINGS: CtxKey<u32> = CtxKey::new("swings");

fn sensors(env: &SharedEnv) -> Sensors<Fact> {
    let env = Rc::clone(env);
    let mut sensors = Sensors::new();
    sensors
        .add(FnSensor::new("environment", move |state: &mut WorldState<Fact>| {
            let env = env.borrow();
            state.set_bool(Fact::DoorOpen, env.door_open);
            state.set_bool(Fact::HasLogs, env.has_logs);
            state.set_int(Fact::Stage, env.stage);
            Ok(())
        }))
        .unwrap();
    sensors
}

fn actions(env: &SharedEnv) -> Vec<ActionRef<Fact>> {
    let door_env = Rc::clone(env);
    let open_door = ActionBuilder::new("OpenDoor")
        .precondition(Fact::DoorOpen, false)
        .effect(Fact::DoorOpen, true)
        .perform_with(move |state, _| {
            let mut env = door_env.borrow_mut();
            if env.door_jammed {
                env.door_jammed = false;
                return ActionResult::Failure;
            }
            env.door_open = true;
            env.stage = 10;
            state.set_bool(Fact::DoorOpen, true);
            ActionResult::Success
        })
        .build_ref()
        .unwrap();

    let tree_env = Rc::clone(env);
    let cut_tree = ActionBuilder::new("CutTree")
        .precondition(Fact::DoorOpen, true)
        .effect(Fact::HasLogs, true)
        .perform_with(move |state, ctx| {
            let swings = ctx.get(SWINGS).copied().unwrap_or(0) + 1;
            ctx.set(SWINGS, swings);
            if swings < 3 {
                return ActionResult::InProgress;
            }
            let mut env = tree_env.borrow_mut();
            env.has_logs = true;
            env.stage = 20;
            state.set_bool(Fact::HasLogs, true);
            ActionResult::Success
        })
        .build_ref()
        .unwrap();

    vec![open_door, cut_tree]
}

fn ladder() -> GoalLadder<Fact> {
    GoalLadder::new(
        Fact::Stage,
        vec![
            (0, Goal::new("OpenDoor", WorldState::new().with(Fact::DoorOpen, true))),
            (10, Goal::new("GatherLogs", WorldState::new().with(Fact::HasLogs, true))),
        ],
    )
    .unwrap()
    .with_completion(20)
}

#[test]
fn test_runs_ladder_to_completion() {
    let env: SharedEnv = Rc::new(RefCell::new(Env::default()));
    let mut agent = Automaton::new("woodcutter", WorldState::new(), sensors(&env), actions(&env), ladder())
        .with_config(AutomatonConfig::immediate());

    // open door, three swings, then the ladder reports completion
    assert_eq!(agent.run(20), 5);
    assert_eq!(agent.state(), AutomatonState::WaitingOrders);

    let env = env.borrow();
    assert!(env.door_open);
    assert!(env.has_logs);
    assert_eq!(env.stage, 20);
}

#[test]
fn test_in_progress_action_spans_ticks() {
    let env: SharedEnv = Rc::new(RefCell::new(Env {
        door_open: true,
        stage: 10,
        ..Env::default()
    }));
    let mut agent = Automaton::new("woodcutter", WorldState::new(), sensors(&env), actions(&env), ladder())
        .with_config(AutomatonConfig::immediate());

    assert_eq!(agent.tick(), TickOutcome::Continue(std::time::Duration::ZERO));
    assert_eq!(agent.engine().current_action_name(), Some("CutTree"));
    assert_eq!(
        agent.engine().current_context().and_then(|ctx| ctx.get(SWINGS)).copied(),
        Some(1)
    );

    agent.tick();
    assert!(!env.borrow().has_logs);
    agent.tick();
    assert!(env.borrow().has_logs);
    assert!(!agent.engine().is_executing());
    assert_eq!(agent.tick(), TickOutcome::Finished);
}

#[test]
fn test_failed_action_is_replanned() {
    let env: SharedEnv = Rc::new(RefCell::new(Env {
        door_jammed: true,
        ..Env::default()
    }));
    let mut agent = Automaton::new("woodcutter", WorldState::new(), sensors(&env), actions(&env), ladder())
        .with_config(AutomatonConfig::immediate());

    agent.tick();
    assert_eq!(agent.failure_count("OpenDoor", "OpenDoor"), 1);
    assert!(!env.borrow().door_open);

    agent.tick();
    assert!(env.borrow().door_open);
    assert_eq!(agent.failure_count("OpenDoor", "OpenDoor"), 0);
}

#[test]
fn test_default_delays_are_reported() {
    let env: SharedEnv = Rc::new(RefCell::new(Env::default()));
    let config = AutomatonConfig::default();
    let mut agent = Automaton::new("woodcutter", WorldState::new(), sensors(&env), actions(&env), ladder());

    assert_eq!(agent.tick(), TickOutcome::Continue(config.loop_delay));
}
