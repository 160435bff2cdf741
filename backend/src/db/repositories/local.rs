//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`CacheRepository`]
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMaps, providing fast, deterministic, and isolated
//! execution. Nothing survives a restart.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::db::repository::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use lunar_observatory::db::repositories::LocalRepository;
/// use lunar_observatory::db::repository::{CacheDomain, CacheRepository};
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// repo.put(CacheDomain::YearlyEvents, "2026", "[]").await.unwrap();
/// assert_eq!(repo.entry_count(CacheDomain::YearlyEvents), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    writes: Arc<AtomicUsize>,
}

struct LocalData {
    entries: HashMap<CacheDomain, HashMap<String, String>>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the health status for testing store failures.
    ///
    /// While unhealthy every operation except `health_check` fails with a
    /// connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.entries.clear();
    }

    /// Number of entries stored in a domain.
    pub fn entry_count(&self, domain: CacheDomain) -> usize {
        self.data
            .read()
            .entries
            .get(&domain)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Number of successful `put` calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str, domain: CacheDomain) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Local store is not healthy",
                ErrorContext::new(operation).with_domain(domain.as_str()),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get(&self, domain: CacheDomain, key: &str) -> RepositoryResult<Option<String>> {
        self.check_health("get", domain)?;
        let data = self.data.read();
        Ok(data
            .entries
            .get(&domain)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, domain: CacheDomain, key: &str, payload: &str) -> RepositoryResult<()> {
        self.check_health("put", domain)?;
        let mut data = self.data.write();
        data.entries
            .entry(domain)
            .or_default()
            .insert(key.to_string(), payload.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_keys(&self, domain: CacheDomain) -> RepositoryResult<Vec<String>> {
        self.check_health("list_keys", domain)?;
        let data = self.data.read();
        Ok(data
            .entries
            .get(&domain)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_where(
        &self,
        domain: CacheDomain,
        predicate: KeyPredicate<'_>,
    ) -> RepositoryResult<usize> {
        self.check_health("delete_where", domain)?;
        let mut data = self.data.write();
        let Some(entries) = data.entries.get_mut(&domain) else {
            return Ok(0);
        };
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        Ok(before - entries.len())
    }
}
