use thiserror::Error;

/// Errors produced by the GOAP engine.
///
/// Planning failures are ordinary outcomes: [`Planner::plan`](crate::Planner::plan)
/// folds them into an empty plan, while
/// [`Planner::try_plan`](crate::Planner::try_plan) reports them through the
/// `NoPlanFound` and `ExpansionLimit` variants below.
#[derive(Error, Debug)]
pub enum GoapError {
    /// The search space was exhausted without reaching the goal
    #[error("No valid plan found to achieve the goal (exhausted after {expansions} expansions)")]
    NoPlanFound { expansions: usize },

    /// The expansion budget ran out before the goal was reached
    #[error("Planner expansion limit of {limit} reached without finding a plan")]
    ExpansionLimit { limit: usize },

    /// Error when an action is created with a negative or non-finite cost
    #[error("Action cost must be finite and non-negative, got {0}")]
    InvalidActionCost(f64),

    #[error("Action must have a non-empty name")]
    MissingActionName,

    #[error("Action '{0}' has no perform function")]
    MissingPerform(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    /// A condition or effect stores a value whose kind differs from the key's declared kind
    #[error("Value kind mismatch for key {key}: expected {expected}, found {found}")]
    ValueKindMismatch {
        key: String,
        expected: String,
        found: String,
    },

    // Sensor errors
    /// A sensor failed while observing the environment
    #[error("Sensor '{name}' failed: {reason}")]
    Sensor { name: String, reason: String },

    /// Error when attempting to add a sensor with a name that already exists in the collection
    #[error("Sensor already in collection: {0}")]
    SensorAlreadyInCollection(String),

    #[error("Invalid goal ladder: {0}")]
    InvalidLadder(String),

    // IO errors
    /// A wrapper around standard IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for GOAP operations
pub type Result<T> = std::result::Result<T, GoapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_no_plan_found_display() {
        let err = GoapError::NoPlanFound { expansions: 12 };
        assert_eq!(
            format!("{}", err),
            "No valid plan found to achieve the goal (exhausted after 12 expansions)"
        );
    }

    #[test]
    fn test_expansion_limit_display() {
        let err = GoapError::ExpansionLimit { limit: 1000 };
        assert_eq!(
            format!("{}", err),
            "Planner expansion limit of 1000 reached without finding a plan"
        );
    }

    #[test]
    fn test_invalid_action_cost_display() {
        let err = GoapError::InvalidActionCost(-1.0);
        assert_eq!(
            format!("{}", err),
            "Action cost must be finite and non-negative, got -1"
        );
    }

    #[test]
    fn test_value_kind_mismatch_display() {
        let err = GoapError::ValueKindMismatch {
            key: "DoorOpen".to_string(),
            expected: "bool".to_string(),
            found: "int".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Value kind mismatch for key DoorOpen: expected bool, found int"
        );
    }

    #[test]
    fn test_io_error_source() {
        let err: GoapError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_trait() {
        let err = GoapError::MissingActionName;
        assert!(err.source().is_none());
    }
}
