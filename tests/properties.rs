use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use proptest::prelude::*;

use goap_engine::{
    Action, ActionBuilder, ActionRef, ActionResult, BreadthFirstSearch, ExecutionContext,
    GoapError, Goal, Planner, PlannerConfig, SearchAlgorithm, StateKey, Value, ValueKind,
    WorldState,
};

/// Numbered boolean facts, so catalogues of any size can be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Flag(u8);

impl StateKey for Flag {
    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }
}

/// Integer facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Counter(u8);

impl StateKey for Counter {
    fn kind(&self) -> ValueKind {
        ValueKind::Int
    }
}

fn state_of(entries: &BTreeMap<u8, bool>) -> WorldState<Flag> {
    entries
        .iter()
        .map(|(&k, &v)| (Flag(k), Value::Bool(v)))
        .collect()
}

fn entries() -> impl Strategy<Value = BTreeMap<u8, bool>> {
    prop::collection::btree_map(0u8..6, any::<bool>(), 0..6)
}

/// Step i turns flag i+1 on once flag i is on.
fn step(i: u8) -> ActionRef<Flag> {
    ActionBuilder::new(format!("step_{}", i))
        .precondition(Flag(i), true)
        .effect(Flag(i + 1), true)
        .perform_with(|_, _| ActionResult::Success)
        .build_ref()
        .unwrap()
}

/// A chain length and a shuffled catalogue order for its steps.
fn shuffled_chain() -> impl Strategy<Value = (u8, Vec<u8>)> {
    (1u8..8).prop_flat_map(|len| (Just(len), Just((0..len).collect::<Vec<u8>>()).prop_shuffle()))
}

/// Adds `delta` to a counter and counts how often the planner probes it.
struct Bump {
    name: String,
    key: Counter,
    delta: i64,
    pre: WorldState<Counter>,
    eff: WorldState<Counter>,
    probes: Rc<Cell<usize>>,
}

impl Action<Counter> for Bump {
    fn name(&self) -> &str {
        &self.name
    }

    fn preconditions(&self) -> &WorldState<Counter> {
        &self.pre
    }

    fn effects(&self) -> &WorldState<Counter> {
        &self.eff
    }

    fn is_applicable(&self, _state: &WorldState<Counter>) -> bool {
        self.probes.set(self.probes.get() + 1);
        true
    }

    fn perform(&self, state: &mut WorldState<Counter>, _ctx: &mut ExecutionContext) -> ActionResult {
        let value = state.get_int(self.key) + self.delta;
        state.set_int(self.key, value);
        ActionResult::Success
    }
}

proptest! {
    #[test]
    fn satisfies_matches_definition(state in entries(), conditions in entries()) {
        let s = state_of(&state);
        let c = state_of(&conditions);

        let expected = conditions.iter().all(|(k, v)| match state.get(k) {
            Some(actual) => actual == v,
            None => !*v,
        });
        prop_assert_eq!(s.satisfies(&c), expected);
    }

    #[test]
    fn copies_are_independent(state in entries(), key in 0u8..6, value in any::<bool>()) {
        let original = state_of(&state);
        let snapshot = original.clone();

        let mut copy = original.clone();
        copy.set_bool(Flag(key), value);
        copy.unset(Flag((key + 1) % 6));
        prop_assert_eq!(&original, &snapshot);

        let mut original = original;
        let copy_before = copy.clone();
        original.set_bool(Flag(key), !value);
        prop_assert_eq!(&copy, &copy_before);
    }

    #[test]
    fn bfs_finds_shortest_chain((len, order) in shuffled_chain()) {
        let actions: Vec<ActionRef<Flag>> = order.iter().map(|&i| step(i)).collect();
        let initial = WorldState::new().with(Flag(0), true);
        let goal = Goal::new("end", WorldState::new().with(Flag(len), true));

        let plan = Planner::new().plan(&initial, &goal, &actions);
        prop_assert_eq!(plan.len(), len as usize);
        let expected: Vec<String> = (0..len).map(|i| format!("step_{}", i)).collect();
        prop_assert_eq!(plan.names(), expected);
    }

    #[test]
    fn search_respects_expansion_budget(deltas in prop::collection::vec(1i64..5, 1..6), budget in 1usize..200) {
        let probes = Rc::new(Cell::new(0));
        let actions: Vec<ActionRef<Counter>> = deltas
            .iter()
            .enumerate()
            .map(|(i, &delta)| {
                let key = Counter(i as u8);
                Rc::new(Bump {
                    name: format!("bump_{}", i),
                    key,
                    delta,
                    pre: WorldState::new(),
                    eff: WorldState::new().with(key, delta),
                    probes: Rc::clone(&probes),
                }) as ActionRef<Counter>
            })
            .collect();

        // Unreachable: no action ever touches this counter
        let goal = Goal::new("never", WorldState::new().with(Counter(200), 1));
        let config = PlannerConfig { max_expansions: budget };
        let result = BreadthFirstSearch.search(&actions, &WorldState::new(), &goal, &config);

        let gave_up = matches!(
            result,
            Err(GoapError::ExpansionLimit { .. }) | Err(GoapError::NoPlanFound { .. })
        );
        prop_assert!(gave_up);
        prop_assert!(probes.get() <= budget * actions.len());
    }

    #[test]
    fn unconditional_action_is_always_selectable(state in entries(), target in 6u8..10) {
        let action = ActionBuilder::new("anywhere")
            .effect(Flag(target), true)
            .perform_with(|_, _| ActionResult::Success)
            .build_ref()
            .unwrap();
        let goal = Goal::new("target", WorldState::new().with(Flag(target), true));

        let plan = Planner::new().plan(&state_of(&state), &goal, &[action]);
        prop_assert_eq!(plan.names(), vec!["anywhere"]);
    }
}
