//! Error types for command definition, matching and execution.

use thiserror::Error;

/// A segment could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read `{segment}` as {kind} for argument `{argument}`")]
pub struct ArgumentError {
    /// Name of the argument being serialized.
    pub argument: String,
    /// The kind the segment was expected to be.
    pub kind: &'static str,
    /// The offending input segment.
    pub segment: String,
}

impl ArgumentError {
    /// Create a new argument error.
    pub fn new(argument: impl Into<String>, kind: &'static str, segment: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            kind,
            segment: segment.into(),
        }
    }
}

/// Failures surfaced by a [`Commander`](crate::Commander).
///
/// Rejection by the admission predicate is policy, not an error, and never
/// appears here.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command definition itself is malformed.
    #[error("invalid command definition: {0}")]
    Definition(String),

    /// Selecting the entry or extracting its values failed.
    #[error("failed to compile `{input}` against `{signature}`")]
    Parse {
        input: String,
        signature: String,
        #[source]
        source: ArgumentError,
    },

    /// The selected handler returned an error or panicked.
    #[error("command handler failed: {0}")]
    Runtime(#[source] anyhow::Error),

    /// Awaitable dispatch was requested without an execution pool.
    #[error("cannot dispatch asynchronously without an execution pool")]
    NoPool,
}

impl CommandError {
    /// Whether this failure was raised while executing a handler.
    pub fn is_runtime(&self) -> bool {
        matches!(self, CommandError::Runtime(_))
    }

    /// Whether this failure was raised while selecting or compiling an entry.
    pub fn is_parse(&self) -> bool {
        matches!(self, CommandError::Parse { .. })
    }
}
