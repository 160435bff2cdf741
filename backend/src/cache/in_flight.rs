//! Per-key in-flight registry.
//!
//! Concurrent requests for the same key share one computation. The
//! computation runs as its own tokio task, so it finishes (and fills the
//! cache) even if every caller that asked for it goes away.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::error::{ObservatoryError, ObservatoryResult};

/// Handle on a running computation; clone it to wait from several places.
pub type SharedComputation<T> = Shared<BoxFuture<'static, ObservatoryResult<T>>>;

pub struct InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pending: Arc<Mutex<HashMap<String, SharedComputation<T>>>>,
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the computation running for `key`, or start one with `start`.
    ///
    /// The returned flag is `true` when this call started the computation.
    /// The entry is removed as soon as the computation finishes.
    pub fn join_or_start<F, Fut>(&self, key: &str, start: F) -> (SharedComputation<T>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ObservatoryResult<T>> + Send + 'static,
    {
        let mut pending = self.pending.lock();
        if let Some(existing) = pending.get(key) {
            return (existing.clone(), false);
        }

        let registry = Arc::clone(&self.pending);
        let owned_key = key.to_string();
        let computation = start();
        let handle = tokio::spawn(async move {
            let result = computation.await;
            registry.lock().remove(&owned_key);
            result
        });

        let shared = async move {
            handle.await.unwrap_or_else(|e| {
                Err(ObservatoryError::worker(format!(
                    "Background computation aborted: {}",
                    e
                )))
            })
        }
        .boxed()
        .shared();

        pending.insert(key.to_string(), shared.clone());
        (shared, true)
    }

    /// Computation currently running for `key`, if any.
    pub fn get(&self, key: &str) -> Option<SharedComputation<T>> {
        self.pending.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
