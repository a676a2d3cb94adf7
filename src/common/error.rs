//! Error types for exploration_planner

use crate::trajectory_tree::SegmentId;

/// Main error type for planner construction and tree management.
///
/// Expected "nothing found" outcomes of a planning iteration (sampling budget
/// exhausted, blocked extension) are not errors and are reported through
/// `Option`/`bool` results instead.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// A configuration value is out of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// No generator is registered under the requested name
    #[error("Unknown trajectory generator: {0}")]
    UnknownGenerator(String),
    /// The segment id does not refer to a live segment suitable for the operation
    #[error("Invalid segment {id}: {reason}")]
    InvalidSegment { id: SegmentId, reason: String },
    /// A parameter map could not be decoded into a typed config
    #[error("Parameter parse error: {0}")]
    ParameterParse(#[from] serde_json::Error),
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
