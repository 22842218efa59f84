//! Error types for koules_dynamics

use thiserror::Error;

/// Main error type for the koules crate
///
/// The dynamics hot path (`propagate`, the samplers, the goal region) never
/// produces these; they come from construction, planning and I/O.
#[derive(Debug, Error)]
pub enum KoulesError {
    /// A physical or planner parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A flat state vector does not match the model dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Planning failed
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Planner name not present in the registry
    #[error("Unknown planner: {0}")]
    UnknownPlanner(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for koules operations
pub type KoulesResult<T> = Result<T, KoulesError>;
