//! Bounded pool for blocking ephemeris work.
//!
//! Oracle calls are synchronous and CPU-bound, so they run on tokio's blocking
//! threads. A semaphore caps how many run at once; callers queue on a permit.

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::error::{ObservatoryError, ObservatoryResult};

#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Pool running at most `size` computations concurrently (minimum 1).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `job` on a blocking thread once a permit is free.
    ///
    /// A panic inside `job` surfaces as [`ObservatoryError::Worker`].
    pub async fn run<T, F>(&self, job: F) -> ObservatoryResult<T>
    where
        F: FnOnce() -> ObservatoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ObservatoryError::worker(format!("Worker pool closed: {}", e)))?;

        match tokio::task::spawn_blocking(job).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(ObservatoryError::worker(format!(
                "Computation task panicked: {}",
                e
            ))),
            Err(e) => Err(ObservatoryError::worker(format!(
                "Computation task cancelled: {}",
                e
            ))),
        }
    }
}
