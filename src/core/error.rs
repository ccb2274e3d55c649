//! Error types for search, planning and evaluation.

use thiserror::Error;

/// Errors raised when a search, plan or evaluation cannot start or continue.
///
/// Misuse of the search tree itself (UCB on an unvisited node, a second
/// child for the same action) is a bug in the caller and panics instead.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MctsError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("initial state {state} is outside the environment bounds")]
    InitialStateOutOfBounds { state: String },

    #[error("environment exposes no actions")]
    NoActions,

    #[error("state {state} has no entry in the value table")]
    MissingState { state: String },

    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, MctsError>;
