//! Job tracking for background cache fills.
//!
//! Each background computation is identified by its cache key (for example
//! `yearly-events:2027`). The tracker keeps one record per key with status
//! and progress logs so failures stay observable after the task is gone.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A single log entry with timestamp and message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    /// Pending or running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

/// Job metadata and logs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JobRecord {
    pub key: String,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error: Option<String>,
    pub logs: Vec<LogEntry>,
}

/// In-memory job tracker.
#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl JobTracker {
    /// Create a new job tracker.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a pending job for `key`.
    ///
    /// Returns `false` (and leaves the record alone) when a job for the key is
    /// already pending or running. A done or failed record is replaced.
    pub fn schedule(&self, key: &str) -> bool {
        let mut jobs = self.jobs.write();
        if jobs.get(key).is_some_and(|job| job.status.is_active()) {
            return false;
        }
        jobs.insert(
            key.to_string(),
            JobRecord {
                key: key.to_string(),
                status: JobStatus::Pending,
                created_at: chrono::Utc::now(),
                completed_at: None,
                error: None,
                logs: vec![],
            },
        );
        true
    }

    /// Mark a job as running.
    pub fn start(&self, key: &str) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(key) {
            job.status = JobStatus::Running;
        }
    }

    /// Add a log entry to a job.
    pub fn log(&self, key: &str, level: LogLevel, message: impl Into<String>) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(key) {
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level,
                message: message.into(),
            });
        }
    }

    /// Mark a job as done.
    pub fn complete(&self, key: &str) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(key) {
            job.status = JobStatus::Done;
            job.completed_at = Some(chrono::Utc::now());
        }
    }

    /// Mark a job as failed.
    pub fn fail(&self, key: &str, error_message: impl Into<String>) {
        let error_message = error_message.into();
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(key) {
            job.status = JobStatus::Failed;
            job.completed_at = Some(chrono::Utc::now());
            job.error = Some(error_message.clone());
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Error,
                message: error_message,
            });
        }
    }

    /// Get a job by key.
    pub fn get(&self, key: &str) -> Option<JobRecord> {
        self.jobs.read().get(key).cloned()
    }

    /// Whether a job for `key` is pending or running.
    pub fn is_active(&self, key: &str) -> bool {
        self.jobs
            .read()
            .get(key)
            .is_some_and(|job| job.status.is_active())
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}
