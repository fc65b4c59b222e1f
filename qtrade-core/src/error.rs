//! Errors in the library.
use thiserror::Error;

/// Errors raised by qtrade.
///
/// Library functions return [`anyhow::Result`]; errors originating from this
/// crate wrap a [`QtradeError`] and can be recovered with
/// [`anyhow::Error::downcast_ref`].
#[derive(Error, Debug, PartialEq)]
pub enum QtradeError {
    /// Invalid construction parameter.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Sampling from a replay memory holding no transitions.
    #[error("Replay memory is empty")]
    EmptyBuffer,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKey(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueType(String),
}
