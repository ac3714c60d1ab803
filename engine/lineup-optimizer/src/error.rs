//! Error types for the lineup optimizer

use player_pool::FeedError;
use std::fmt;
use thiserror::Error;

/// Result type for lineup optimizer operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Where an infeasibility was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibilitySource {
    /// Contradiction found by inspecting the configuration before solving
    StaticCheck,
    /// The solver proved no feasible roster exists
    Solver,
}

impl fmt::Display for InfeasibilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibilitySource::StaticCheck => write!(f, "pre-solve check"),
            InfeasibilitySource::Solver => write!(f, "solver"),
        }
    }
}

/// Errors that can occur during an optimization run
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// Malformed upstream feed; fatal, never retried
    #[error(transparent)]
    DataFormat(#[from] FeedError),

    /// Roster rules that cannot describe any roster
    #[error("Invalid roster rules: {0}")]
    InvalidRules(String),

    /// Valid inputs but no roster satisfies the active constraints.
    /// Recoverable by relaxing the configuration.
    #[error(
        "No feasible roster ({detected_by}): {reason}; active options: [{}]",
        .active_options.join(", ")
    )]
    RosterInfeasible {
        detected_by: InfeasibilitySource,
        reason: String,
        active_options: Vec<String>,
    },

    /// The solver returned an assignment that breaks a roster invariant
    #[error("Roster invariant violated: {0}")]
    InvariantViolation(String),

    /// Solver failure or timeout; fatal for the run
    #[error("Solver error: {0}")]
    Solver(String),
}

impl OptimizerError {
    pub fn is_infeasible(&self) -> bool {
        matches!(self, OptimizerError::RosterInfeasible { .. })
    }
}
