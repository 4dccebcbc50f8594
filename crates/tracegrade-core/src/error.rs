//! Evaluation error types.
//!
//! Malformed input data never produces an error; it is dropped or defaulted
//! during ingestion. The only input-level signal is an empty session.

use thiserror::Error;

/// Errors that can occur while evaluating a session.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Nothing survived ingestion.
    #[error("No valid events to evaluate")]
    NoValidEvents,
}

/// Errors raised by a pluggable scorer or analyzer. They are logged and
/// answered with the built-in implementation, never returned to callers.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The external implementation returned an error.
    #[error("{capability} failed: {message}")]
    Failed {
        capability: &'static str,
        message: String,
    },

    /// The external implementation answered with unusable data.
    #[error("{capability} returned malformed output: {message}")]
    Malformed {
        capability: &'static str,
        message: String,
    },

    /// The external implementation did not answer in time.
    #[error("{capability} timed out after {timeout_ms}ms")]
    Timeout {
        capability: &'static str,
        timeout_ms: u64,
    },
}
