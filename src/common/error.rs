//! Error types for cspace_planning

use thiserror::Error;

/// Main error type for the planners
#[derive(Debug, Error)]
pub enum PlannerError {
    /// `plan_path` was called before `init_plan`
    #[error("Planner not initialized")]
    NotInitialized,
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Start or goal does not match the robot's active DOF
    #[error("Invalid {which} configuration: expected {expected} DOF, got {actual}")]
    InvalidConfiguration {
        which: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Start or goal could not be joined to the roadmap
    #[error("Disconnected: {0}")]
    Disconnected(String),
    /// Neither search found a path between start and goal
    #[error("No path found")]
    NoPath,
    /// Tree growth ran out of iterations before the trees met
    #[error("Trees not connected after {0} iterations")]
    IterationLimit(usize),
    /// Sampler kept failing
    #[error("Sampler failed {0} consecutive times")]
    SamplingFailed(usize),
    /// The robot mutex was poisoned by a panicking holder
    #[error("Environment lock poisoned")]
    EnvironmentLock,
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    /// Whether a looser neighbor threshold or more samples might help
    pub fn is_connectivity_failure(&self) -> bool {
        matches!(self, PlannerError::Disconnected(_) | PlannerError::NoPath)
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::NoPath;
        assert_eq!(format!("{}", err), "No path found");

        let err = PlannerError::InvalidConfiguration {
            which: "start",
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid start configuration: expected 2 DOF, got 3"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io(_)));
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(PlannerError::Disconnected("start".to_string()).is_connectivity_failure());
        assert!(!PlannerError::InvalidConfiguration {
            which: "goal",
            expected: 2,
            actual: 1
        }
        .is_connectivity_failure());
    }
}
