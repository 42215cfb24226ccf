//! Goal selection policies.
//!
//! A [`GoalSelector`] looks at the observed world state and decides what the
//! agent should pursue next. Returning `None` means the overall objective is
//! complete and the driver loop should stop.

use crate::error::{GoapError, Result};
use crate::goal::Goal;
use crate::value::{StateKey, ValueKind};
use crate::world_state::WorldState;

pub trait GoalSelector<K: StateKey> {
    fn select(&mut self, state: &WorldState<K>) -> Option<Goal<K>>;
}

impl<K, F> GoalSelector<K> for F
where
    K: StateKey,
    F: FnMut(&WorldState<K>) -> Option<Goal<K>>,
{
    fn select(&mut self, state: &WorldState<K>) -> Option<Goal<K>> {
        self(state)
    }
}

/// Maps an integer progress fact to goals through an ordered threshold table.
///
/// The goal of the highest rung whose threshold is `<=` the observed progress
/// is selected. Progress below the first rung selects the first rung, and
/// progress at or past the completion threshold selects nothing.
///
/// ```
/// use goap_engine::{Goal, GoalLadder, GoalSelector, StateKey, ValueKind, WorldState};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// enum Fact {
///     Stage,
///     Done,
/// }
///
/// impl StateKey for Fact {
///     fn kind(&self) -> ValueKind {
///         match self {
///             Fact::Stage => ValueKind::Int,
///             Fact::Done => ValueKind::Bool,
///         }
///     }
/// }
///
/// let goal = |name: &str| Goal::new(name, WorldState::new().with(Fact::Done, true));
/// let mut ladder = GoalLadder::new(Fact::Stage, vec![(1, goal("Intro")), (10, goal("Quest"))])?
///     .with_completion(1000);
///
/// let state = WorldState::new().with(Fact::Stage, 12);
/// assert_eq!(ladder.select(&state).map(|g| g.name().to_string()), Some("Quest".to_string()));
///
/// let state = WorldState::new().with(Fact::Stage, 1000);
/// assert!(ladder.select(&state).is_none());
/// # Ok::<(), goap_engine::GoapError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GoalLadder<K: StateKey> {
    progress: K,
    rungs: Vec<(i64, Goal<K>)>,
    completion: Option<i64>,
}

impl<K: StateKey> GoalLadder<K> {
    /// Builds a ladder over `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`GoapError::InvalidLadder`] if `progress` is not an integer
    /// key, if there are no rungs, or if two rungs share a threshold.
    pub fn new(progress: K, rungs: impl IntoIterator<Item = (i64, Goal<K>)>) -> Result<Self> {
        if progress.kind() != ValueKind::Int {
            return Err(GoapError::InvalidLadder(format!(
                "progress key {:?} holds {}, expected int",
                progress,
                progress.kind()
            )));
        }

        let mut rungs: Vec<(i64, Goal<K>)> = rungs.into_iter().collect();
        if rungs.is_empty() {
            return Err(GoapError::InvalidLadder("ladder has no rungs".to_string()));
        }

        rungs.sort_by_key(|(threshold, _)| *threshold);
        if let Some(pair) = rungs.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(GoapError::InvalidLadder(format!(
                "duplicate threshold {}",
                pair[0].0
            )));
        }

        Ok(Self {
            progress,
            rungs,
            completion: None,
        })
    }

    /// Progress at or past `threshold` ends the run.
    pub fn with_completion(mut self, threshold: i64) -> Self {
        self.completion = Some(threshold);
        self
    }

    pub fn progress_key(&self) -> K {
        self.progress
    }

    pub fn completion(&self) -> Option<i64> {
        self.completion
    }

    pub fn rungs(&self) -> &[(i64, Goal<K>)] {
        &self.rungs
    }

    /// The goal for a given progress value.
    pub fn goal_for(&self, progress: i64) -> Option<&Goal<K>> {
        if self.completion.map_or(false, |done| progress >= done) {
            return None;
        }

        self.rungs
            .iter()
            .rev()
            .find(|(threshold, _)| *threshold <= progress)
            .or_else(|| self.rungs.first())
            .map(|(_, goal)| goal)
    }
}

impl<K: StateKey> GoalSelector<K> for GoalLadder<K> {
    fn select(&mut self, state: &WorldState<K>) -> Option<Goal<K>> {
        let progress = state.get_int(self.progress);
        let goal = self.goal_for(progress).cloned();
        match &goal {
            Some(goal) => log::debug!("Progress {} selects goal '{}'", progress, goal.name()),
            None => log::debug!("Progress {} is past completion", progress),
        }
        goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Key {
        Stage,
        Flag,
    }

    impl StateKey for Key {
        fn kind(&self) -> ValueKind {
            match self {
                Key::Stage => ValueKind::Int,
                Key::Flag => ValueKind::Bool,
            }
        }
    }

    fn goal(name: &str) -> Goal<Key> {
        Goal::new(name, WorldState::new().with(Key::Flag, true))
    }

    fn ladder() -> GoalLadder<Key> {
        GoalLadder::new(
            Key::Stage,
            vec![(10, goal("Second")), (1, goal("First")), (50, goal("Third"))],
        )
        .unwrap()
        .with_completion(1000)
    }

    fn selected(ladder: &mut GoalLadder<Key>, stage: i64) -> Option<String> {
        let state = WorldState::new().with(Key::Stage, stage);
        ladder.select(&state).map(|g| g.name().to_string())
    }

    #[test]
    fn test_rungs_are_sorted() {
        let thresholds: Vec<i64> = ladder().rungs().iter().map(|(t, _)| *t).collect();
        assert_eq!(thresholds, [1, 10, 50]);
    }

    #[test]
    fn test_selects_highest_reached_rung() {
        let mut ladder = ladder();
        assert_eq!(selected(&mut ladder, 1).as_deref(), Some("First"));
        assert_eq!(selected(&mut ladder, 9).as_deref(), Some("First"));
        assert_eq!(selected(&mut ladder, 10).as_deref(), Some("Second"));
        assert_eq!(selected(&mut ladder, 999).as_deref(), Some("Third"));
    }

    #[test]
    fn test_below_first_rung_selects_first() {
        let mut ladder = ladder();
        assert_eq!(selected(&mut ladder, 0).as_deref(), Some("First"));
        assert_eq!(selected(&mut ladder, -5).as_deref(), Some("First"));

        // Missing progress reads as 0
        assert_eq!(
            ladder.select(&WorldState::new()).map(|g| g.name().to_string()),
            Some("First".to_string())
        );
    }

    #[test]
    fn test_completion_ends_selection() {
        let mut ladder = ladder();
        assert!(selected(&mut ladder, 1000).is_none());
        assert!(selected(&mut ladder, 5000).is_none());
    }

    #[test]
    fn test_invalid_ladders() {
        assert!(matches!(
            GoalLadder::new(Key::Stage, vec![(1, goal("A")), (1, goal("B"))]),
            Err(GoapError::InvalidLadder(_))
        ));
        assert!(matches!(
            GoalLadder::new(Key::Stage, Vec::new()),
            Err(GoapError::InvalidLadder(_))
        ));
        assert!(matches!(
            GoalLadder::new(Key::Flag, vec![(1, goal("A"))]),
            Err(GoapError::InvalidLadder(_))
        ));
    }

    #[test]
    fn test_closure_selector() {
        let mut calls = 0;
        let mut selector = |_: &WorldState<Key>| {
            calls += 1;
            if calls > 1 {
                None
            } else {
                Some(goal("Once"))
            }
        };
        let state = WorldState::new();
        assert!(GoalSelector::select(&mut selector, &state).is_some());
        assert!(GoalSelector::select(&mut selector, &state).is_none());
    }
}
