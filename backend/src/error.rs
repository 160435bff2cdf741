//! Error types for the observatory engine.
//!
//! Every failure the engine can produce falls into one of a few classes, each
//! with its own caching and retry semantics:
//!
//! - [`ObservatoryError::Data`]: malformed input, rejected before any ephemeris work.
//! - [`ObservatoryError::Oracle`]: the ephemeris provider failed; results are never cached.
//! - [`ObservatoryError::Persistence`]: the persistent store failed; callers degrade
//!   to memory-only operation or recomputation.
//! - [`ObservatoryError::Worker`]: a pooled computation panicked or was cancelled.
//!
//! None of these are process-fatal.

use crate::db::repository::RepositoryError;

/// Result type used throughout the computation and cache layers.
pub type ObservatoryResult<T> = Result<T, ObservatoryError>;

/// Error type for calculators, the cache manager and the observatory facade.
///
/// The type is `Clone` so a single failed computation can be handed to every
/// caller that was waiting on the same in-flight key.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ObservatoryError {
    /// Malformed date, time, offset or location.
    #[error("Data error: {0}")]
    Data(String),

    /// The ephemeris oracle could not answer a query.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The persistent store is unavailable or rejected a payload.
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    /// A worker-pool task panicked or was cancelled before producing a result.
    #[error("Worker error: {0}")]
    Worker(String),
}

impl ObservatoryError {
    /// Create a data error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    /// Create an oracle error.
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::Oracle(message.into())
    }

    /// Create a worker error.
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    /// Whether the caller supplied bad input (as opposed to an engine failure).
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

impl From<serde_json::Error> for ObservatoryError {
    fn from(err: serde_json::Error) -> Self {
        ObservatoryError::Persistence(RepositoryError::internal(format!(
            "Payload serialization failed: {}",
            err
        )))
    }
}
