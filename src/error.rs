//! Error types for the grapple crate

use thiserror::Error;

/// Main error type for the grapple crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "state space size mismatch: variable domains produce {computed} states, expected {expected}"
    )]
    StateSpaceMismatch { computed: usize, expected: usize },

    #[error("state space has no variables")]
    EmptyStateSpace,

    #[error("invalid domain for variable '{variable}': {reason}")]
    InvalidDomain { variable: String, reason: String },

    #[error("unknown state {values:?}: {reason}")]
    UnknownState { values: Vec<i8>, reason: String },

    #[error("state index {index} is out of range (state space has {size} states)")]
    StateIndexOutOfRange { index: usize, size: usize },

    #[error("value {value} is outside the domain {domain:?} of '{variable}'")]
    ValueOutOfDomain {
        variable: String,
        value: i8,
        domain: Vec<i8>,
    },

    #[error("fatigue flag '{variable}' cannot be cleared once set")]
    FatigueCleared { variable: String },

    #[error("outcome is already fixed at {outcome}; the episode is terminal")]
    OutcomeFixed { outcome: i8 },

    #[error("invalid action: {reason}")]
    InvalidAction { reason: String },

    #[error("invalid action name '{input}'. Expected one of: {expected}")]
    ParseAction { input: String, expected: String },

    #[error("no positional transition is implemented for action '{action}' (rule '{rule}')")]
    TransitionNotImplemented { action: String, rule: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
