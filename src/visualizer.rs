use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::goal::Goal;
use crate::plan::Plan;
use crate::value::StateKey;
use crate::world_state::WorldState;

/// Renders plans as Graphviz DOT graphs.
///
/// The graph follows the simulated trajectory of the plan: the initial
/// state, then each action followed by the state its effects produce, and
/// finally the goal.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoapVisualizer;

impl GoapVisualizer {
    pub fn new() -> Self {
        Self
    }

    /// Writes the DOT rendering of `plan` to `out`.
    pub fn write_plan<K: StateKey>(
        &self,
        out: &mut impl Write,
        initial: &WorldState<K>,
        goal: &Goal<K>,
        plan: &Plan<K>,
    ) -> Result<()> {
        writeln!(out, "digraph GOAP {{")?;
        writeln!(out, "    rankdir=LR;")?;
        writeln!(out, "    node [shape=box, style=filled, fillcolor=lightblue];")?;
        writeln!(out, "    edge [fontsize=10];")?;

        writeln!(
            out,
            "    state_0 [label=\"Initial State\\n{}\", fillcolor=lightgreen];",
            Self::state_label(initial)
        )?;

        let mut state = initial.clone();
        for (i, action) in plan.iter().enumerate() {
            let step = i + 1;
            writeln!(
                out,
                "    action_{} [label=\"{}\\nCost: {}\\nPre: {}\\nEff: {}\", shape=ellipse, fillcolor=lightcoral];",
                step,
                Self::escape(action.name()),
                action.cost(),
                Self::state_label(action.preconditions()),
                Self::state_label(action.effects())
            )?;

            state.apply_effects(action.effects());
            writeln!(
                out,
                "    state_{} [label=\"{}\"];",
                step,
                Self::state_label(&state)
            )?;

            writeln!(out, "    state_{} -> action_{};", i, step)?;
            writeln!(out, "    action_{} -> state_{};", step, step)?;
        }

        let reached = goal.is_satisfied(&state);
        writeln!(
            out,
            "    goal [label=\"Goal: {}\\n{}\", fillcolor={}];",
            Self::escape(goal.name()),
            Self::state_label(goal.target()),
            if reached { "lightpink" } else { "lightgrey" }
        )?;
        writeln!(
            out,
            "    state_{} -> goal [label=\"{}\", style=dashed];",
            plan.len(),
            if reached { "achieves" } else { "falls short" }
        )?;

        writeln!(out, "}}")?;
        Ok(())
    }

    /// Writes the DOT rendering of `plan` to `filename`.
    pub fn visualize_plan<K: StateKey>(
        &self,
        initial: &WorldState<K>,
        goal: &Goal<K>,
        plan: &Plan<K>,
        filename: impl AsRef<Path>,
    ) -> Result<()> {
        let mut file = BufWriter::new(File::create(filename)?);
        self.write_plan(&mut file, initial, goal, plan)?;
        file.flush()?;
        Ok(())
    }

    fn state_label<K: StateKey>(state: &WorldState<K>) -> String {
        let mut entries: Vec<_> = state.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .iter()
            .map(|(key, value)| Self::escape(&format!("{:?}: {}", key, value)))
            .collect::<Vec<_>>()
            .join("\\n")
    }

    fn escape(text: &str) -> String {
        text.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionBuilder, ActionResult};
    use crate::value::ValueKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Key {
        HasItem,
        GoalAchieved,
        Area,
    }

    impl StateKey for Key {
        fn kind(&self) -> ValueKind {
            match self {
                Key::Area => ValueKind::Str,
                _ => ValueKind::Bool,
            }
        }
    }

    fn fixture() -> (WorldState<Key>, Goal<Key>, Plan<Key>) {
        let action = ActionBuilder::new("test_action")
            .precondition(Key::HasItem, true)
            .effect(Key::GoalAchieved, true)
            .perform_with(|_, _| ActionResult::Success)
            .build_ref()
            .unwrap();

        let current_state = WorldState::new()
            .with(Key::HasItem, true)
            .with(Key::GoalAchieved, false)
            .with(Key::Area, "yard");
        let goal = Goal::new("Achieve", WorldState::new().with(Key::GoalAchieved, true));

        (current_state, goal, Plan::new(vec![action]))
    }

    #[test]
    fn test_write_plan() {
        let (current_state, goal, plan) = fixture();
        let mut out = Vec::new();
        GoapVisualizer::new()
            .write_plan(&mut out, &current_state, &goal, &plan)
            .unwrap();

        let content = String::from_utf8(out).unwrap();
        assert!(content.starts_with("digraph GOAP {"));
        assert!(content.contains("test_action"));
        assert!(content.contains("HasItem: true"));
        assert!(content.contains("GoalAchieved: true"));
        assert!(content.contains("Area: \\\"yard\\\""));
        assert!(content.contains("state_0 -> action_1;"));
        assert!(content.contains("action_1 -> state_1;"));
        assert!(content.contains("state_1 -> goal [label=\"achieves\""));
        assert!(content.trim_end().ends_with('}'));
    }

    #[test]
    fn test_backslash_in_fact_is_escaped() {
        let (_, goal, plan) = fixture();
        let current_state = WorldState::new()
            .with(Key::HasItem, true)
            .with(Key::Area, "C:\\");
        let mut out = Vec::new();
        GoapVisualizer::new()
            .write_plan(&mut out, &current_state, &goal, &plan)
            .unwrap();

        let content = String::from_utf8(out).unwrap();
        assert!(content.contains(r#"Area: \"C:\\\""#));
        assert!(content.contains(r#"HasItem: true\nArea"#));
    }

    #[test]
    fn test_empty_plan_falls_short() {
        let (current_state, goal, _) = fixture();
        let mut out = Vec::new();
        GoapVisualizer::new()
            .write_plan(&mut out, &current_state, &goal, &Plan::empty())
            .unwrap();

        let content = String::from_utf8(out).unwrap();
        assert!(content.contains("state_0 -> goal [label=\"falls short\""));
        assert!(!content.contains("action_"));
    }

    #[test]
    fn test_visualize_plan() {
        let (current_state, goal, plan) = fixture();
        let path = std::env::temp_dir().join(format!("goap_plan_{}.dot", std::process::id()));

        GoapVisualizer::new()
            .visualize_plan(&current_state, &goal, &plan, &path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("digraph GOAP"));
        assert!(content.contains("test_action"));

        std::fs::remove_file(&path).unwrap();
    }
}
