//! Engine error taxonomy.

use thiserror::Error;

/// Errors surfaced by aggregation operations.
///
/// Aggregates fail on the first failing sub-operation: a partial matrix or a
/// partially merged batch is never returned as complete.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The upstream API answered with a non-success status or a payload
    /// that does not parse as the expected shape.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A named entity was absent after a full scan. Domain-level, not
    /// transport-level: the upstream request itself succeeded.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Malformed caller input.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl EngineError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
