//! Repository trait for abstracting persistent cache storage.
//!
//! The persistent tier is a plain key-value store partitioned into domains.
//! Payloads are opaque JSON documents; the store never interprets them.
//! Implementations can be swapped via dependency injection (in-memory for
//! tests, one-file-per-key on disk for the server).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Storage domain of a persisted cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheDomain {
    /// Key = year (e.g. `"2026"`), payload = list of events.
    YearlyEvents,
    /// Key = ISO date (e.g. `"2026-02-24"`), payload = planet -> visibility record.
    DailyVisibility,
}

impl CacheDomain {
    /// Stable name used for directories and log output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::YearlyEvents => "yearly-events",
            Self::DailyVisibility => "daily-visibility",
        }
    }

    /// All domains known to the engine.
    pub const fn all() -> [CacheDomain; 2] {
        [Self::YearlyEvents, Self::DailyVisibility]
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate over keys used by [`CacheRepository::delete_where`].
pub type KeyPredicate<'a> = &'a (dyn Fn(&str) -> bool + Send + Sync);

/// Repository trait for the persistent cache tier.
///
/// # Semantics
/// - `put` is an upsert: exactly one payload per `(domain, key)`.
/// - Writes are last-writer-wins; there are no cross-key transactions.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a single instance can be shared
/// between request handlers and background jobs.
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if the store is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch the payload stored under `key`, if any.
    async fn get(&self, domain: CacheDomain, key: &str) -> RepositoryResult<Option<String>>;

    /// Insert or replace the payload stored under `key`.
    async fn put(&self, domain: CacheDomain, key: &str, payload: &str) -> RepositoryResult<()>;

    /// List every key stored in `domain` (unordered).
    async fn list_keys(&self, domain: CacheDomain) -> RepositoryResult<Vec<String>>;

    /// Delete every key in `domain` matching `predicate`.
    ///
    /// # Returns
    /// Number of entries removed.
    async fn delete_where(
        &self,
        domain: CacheDomain,
        predicate: KeyPredicate<'_>,
    ) -> RepositoryResult<usize>;
}
