//! Search strategies over the implicit graph of world states.
//!
//! Nodes are [`WorldState`]s; an edge `(state, action)` leads to
//! `state.apply(action.effects())` for every action whose `is_applicable`
//! accepts `state`. Both strategies keep a visited set of states, expand
//! actions in catalogue order and stop after
//! [`PlannerConfig::max_expansions`] dequeued nodes.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::action::ActionRef;
use crate::error::{GoapError, Result};
use crate::goal::Goal;
use crate::plan::Plan;
use crate::planner::PlannerConfig;
use crate::value::StateKey;
use crate::world_state::WorldState;

/// A strategy that turns an initial state, goal and catalogue into a plan.
pub trait SearchAlgorithm<K: StateKey> {
    /// Returns `Ok` with an empty plan when `initial` already satisfies the goal,
    /// [`GoapError::NoPlanFound`] when the reachable space is exhausted and
    /// [`GoapError::ExpansionLimit`] when the budget runs out.
    fn search(
        &self,
        actions: &[ActionRef<K>],
        initial: &WorldState<K>,
        goal: &Goal<K>,
        config: &PlannerConfig,
    ) -> Result<Plan<K>>;
}

struct Node<K: StateKey> {
    state: WorldState<K>,
    parent: Option<usize>,
    action: Option<ActionRef<K>>,
    cost: f64,
}

/// Arena of search nodes linked by parent index.
struct SearchTree<K: StateKey> {
    nodes: Vec<Node<K>>,
}

impl<K: StateKey> SearchTree<K> {
    fn new(initial: &WorldState<K>) -> Self {
        Self {
            nodes: vec![Node {
                state: initial.clone(),
                parent: None,
                action: None,
                cost: 0.0,
            }],
        }
    }

    fn push(&mut self, state: WorldState<K>, parent: usize, action: &ActionRef<K>) -> usize {
        let cost = self.nodes[parent].cost + action.cost();
        self.nodes.push(Node {
            state,
            parent: Some(parent),
            action: Some(action.clone()),
            cost,
        });
        self.nodes.len() - 1
    }

    fn state(&self, idx: usize) -> &WorldState<K> {
        &self.nodes[idx].state
    }

    /// Walks parent links back to the root, yielding actions in execution order.
    fn reconstruct(&self, idx: usize) -> Plan<K> {
        let mut path = Vec::new();
        let mut current = Some(idx);

        while let Some(node) = current.and_then(|i| self.nodes.get(i)) {
            if let Some(action) = &node.action {
                path.push(action.clone());
            }
            current = node.parent;
        }

        path.reverse();
        Plan::new(path)
    }
}

/// Unweighted breadth-first search.
///
/// Returns a plan with the fewest actions. Action cost is ignored; ties
/// within a layer go to the action listed first in the catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthFirstSearch;

impl<K: StateKey> SearchAlgorithm<K> for BreadthFirstSearch {
    fn search(
        &self,
        actions: &[ActionRef<K>],
        initial: &WorldState<K>,
        goal: &Goal<K>,
        config: &PlannerConfig,
    ) -> Result<Plan<K>> {
        let mut tree = SearchTree::new(initial);
        let mut open = VecDeque::from([0usize]);
        let mut visited: HashSet<WorldState<K>> = HashSet::new();
        visited.insert(initial.clone());

        let mut expansions = 0usize;

        while let Some(idx) = open.pop_front() {
            if expansions >= config.max_expansions {
                return Err(GoapError::ExpansionLimit {
                    limit: config.max_expansions,
                });
            }
            expansions += 1;

            if goal.is_satisfied(tree.state(idx)) {
                log::debug!(
                    "BFS reached goal '{}' after {} expansions",
                    goal.name(),
                    expansions
                );
                return Ok(tree.reconstruct(idx));
            }

            for action in actions {
                if !action.is_applicable(tree.state(idx)) {
                    continue;
                }
                let next = tree.state(idx).apply(action.effects());
                if visited.contains(&next) {
                    continue;
                }
                visited.insert(next.clone());
                let child = tree.push(next, idx, action);
                open.push_back(child);
            }
        }

        Err(GoapError::NoPlanFound { expansions })
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    cost: f64,
    seq: u64,
    idx: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the cheapest, then the oldest entry
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Cost-weighted search (Dijkstra) over action `cost()`.
///
/// Returns a plan of minimum total cost. Equal-cost ties go to the path
/// discovered first, so results stay deterministic for a fixed catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformCostSearch;

impl<K: StateKey> SearchAlgorithm<K> for UniformCostSearch {
    fn search(
        &self,
        actions: &[ActionRef<K>],
        initial: &WorldState<K>,
        goal: &Goal<K>,
        config: &PlannerConfig,
    ) -> Result<Plan<K>> {
        let mut tree = SearchTree::new(initial);
        let mut open = BinaryHeap::new();
        let mut best: HashMap<WorldState<K>, f64> = HashMap::new();
        let mut seq = 0u64;

        best.insert(initial.clone(), 0.0);
        open.push(OpenEntry {
            cost: 0.0,
            seq,
            idx: 0,
        });

        let mut expansions = 0usize;

        while let Some(entry) = open.pop() {
            let stale = best
                .get(tree.state(entry.idx))
                .map_or(false, |&cost| entry.cost > cost);
            if stale {
                continue;
            }

            if expansions >= config.max_expansions {
                return Err(GoapError::ExpansionLimit {
                    limit: config.max_expansions,
                });
            }
            expansions += 1;

            if goal.is_satisfied(tree.state(entry.idx)) {
                log::debug!(
                    "Uniform-cost search reached goal '{}' at cost {} after {} expansions",
                    goal.name(),
                    entry.cost,
                    expansions
                );
                return Ok(tree.reconstruct(entry.idx));
            }

            for action in actions {
                if !action.is_applicable(tree.state(entry.idx)) {
                    continue;
                }
                let next = tree.state(entry.idx).apply(action.effects());
                let next_cost = entry.cost + action.cost();
                if best.get(&next).map_or(false, |&known| known <= next_cost) {
                    continue;
                }
                best.insert(next.clone(), next_cost);
                let child = tree.push(next, entry.idx, action);
                seq += 1;
                open.push(OpenEntry {
                    cost: next_cost,
                    seq,
                    idx: child,
                });
            }
        }

        Err(GoapError::NoPlanFound { expansions })
    }
}
