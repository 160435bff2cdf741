//! Two-tier cache in front of the expensive calculators.
//!
//! Reads go memory -> persistent store -> compute. Computed payloads are
//! written through to the persistent store before they land in memory, so the
//! memory tier never holds anything the store has not been asked to keep.
//! Oracle and worker failures are never cached.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::in_flight::InFlight;
use crate::config::{CacheSettings, ObservatoryConfig};
use crate::db::{CacheDomain, CacheRepository};
use crate::ephemeris::EphemerisOracle;
use crate::error::{ObservatoryError, ObservatoryResult};
use crate::models::{iso_date, parse_date, DailyVisibility, Event, ObserverLocation};
use crate::services::job_tracker::{JobRecord, JobTracker, LogLevel};
use crate::services::visibility_computer::VisibilityComputer;
use crate::services::worker_pool::WorkerPool;
use crate::services::yearly_events::{validate_year, YearlyEventGenerator};

/// Result of a year lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum YearEvents {
    Ready(Vec<Event>),
    /// Generation is scheduled or running; ask again later.
    Pending,
}

/// Outcome of [`CacheManager::warm_up_at`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmUpReport {
    pub removed_visibility: usize,
    pub filled_days: usize,
    pub failed_days: usize,
    pub scheduled_years: Vec<i32>,
}

/// Key under which background jobs are tracked (`yearly-events:2027`).
pub fn job_key(domain: CacheDomain, key: &str) -> String {
    format!("{}:{}", domain.as_str(), key)
}

pub struct CacheManager {
    repo: Arc<dyn CacheRepository>,
    pool: WorkerPool,
    jobs: JobTracker,
    generator: YearlyEventGenerator,
    computer: VisibilityComputer,
    observer: ObserverLocation,
    offset: FixedOffset,
    settings: CacheSettings,
    years: RwLock<HashMap<i32, Vec<Event>>>,
    days: RwLock<HashMap<NaiveDate, DailyVisibility>>,
    year_jobs: InFlight<Vec<Event>>,
    day_jobs: InFlight<DailyVisibility>,
}

impl CacheManager {
    pub fn new(
        oracle: Arc<dyn EphemerisOracle>,
        repo: Arc<dyn CacheRepository>,
        config: &ObservatoryConfig,
    ) -> ObservatoryResult<Self> {
        Ok(Self {
            repo,
            pool: WorkerPool::new(config.workers.max_concurrent),
            jobs: JobTracker::new(),
            generator: YearlyEventGenerator::new(oracle.clone(), config)?,
            computer: VisibilityComputer::new(oracle),
            observer: config.observer.location()?,
            offset: config.observer.offset()?,
            settings: config.cache.clone(),
            years: RwLock::new(HashMap::new()),
            days: RwLock::new(HashMap::new()),
            year_jobs: InFlight::new(),
            day_jobs: InFlight::new(),
        })
    }

    /// Today's civil date for the reference observer.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn jobs(&self) -> &JobTracker {
        &self.jobs
    }

    pub fn job(&self, key: &str) -> Option<JobRecord> {
        self.jobs.get(key)
    }

    pub fn repository(&self) -> &Arc<dyn CacheRepository> {
        &self.repo
    }

    /// Memory-tier entry count per domain.
    pub fn memory_len(&self, domain: CacheDomain) -> usize {
        match domain {
            CacheDomain::YearlyEvents => self.years.read().len(),
            CacheDomain::DailyVisibility => self.days.read().len(),
        }
    }

    /// Drop the memory tier. The persistent tier is untouched.
    pub fn clear_memory(&self) {
        self.years.write().clear();
        self.days.write().clear();
    }

    async fn load<T: DeserializeOwned>(&self, domain: CacheDomain, key: &str) -> Option<T> {
        match self.repo.get(domain, key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Discarding unreadable {}/{} entry: {}", domain, key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) if e.is_retryable() => {
                log::warn!("Persistent read of {}/{} failed, recomputing: {}", domain, key, e);
                None
            }
            Err(e) => {
                log::error!(
                    "Persistent read of {}/{} failed permanently, recomputing: {}",
                    domain,
                    key,
                    e
                );
                None
            }
        }
    }

    async fn persist<T: Serialize>(&self, domain: CacheDomain, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Could not serialize {}/{}: {}", domain, key, e);
                return;
            }
        };
        match self.repo.put(domain, key, &payload).await {
            Ok(()) => {}
            Err(e) if e.is_retryable() => {
                log::warn!("Persistent write of {}/{} failed: {}", domain, key, e)
            }
            Err(e) => {
                log::error!("Persistent write of {}/{} failed permanently: {}", domain, key, e)
            }
        }
    }

    // =========================================================
    // Daily visibility
    // =========================================================

    /// Visibility for `date`, computing it on the worker pool on a full miss.
    pub async fn visibility(self: &Arc<Self>, date: NaiveDate) -> ObservatoryResult<DailyVisibility> {
        validate_year(date.year())?;

        let cached = self.days.read().get(&date).cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let key = iso_date(date);
        if let Some(stored) = self.load::<DailyVisibility>(CacheDomain::DailyVisibility, &key).await {
            self.remember_day(date, stored.clone());
            return Ok(stored);
        }

        let this = Arc::clone(self);
        let (computation, started) = self
            .day_jobs
            .join_or_start(&key, move || async move { this.fill_visibility(date).await });
        if started {
            log::debug!("Computing visibility for {}", key);
        }
        computation.await
    }

    async fn fill_visibility(self: Arc<Self>, date: NaiveDate) -> ObservatoryResult<DailyVisibility> {
        // A computation that finished after our memory lookup already stored it
        let cached = self.days.read().get(&date).cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let computer = self.computer.clone();
        let observer = self.observer;
        let offset = self.offset;
        let computed = self
            .pool
            .run(move || computer.compute(date, &observer, offset))
            .await?;

        self.persist(CacheDomain::DailyVisibility, &iso_date(date), &computed)
            .await;
        self.remember_day(date, computed.clone());
        Ok(computed)
    }

    /// Insert into the memory tier, evicting the days farthest from today
    /// once it holds more than `memory_visibility_days`.
    fn remember_day(&self, date: NaiveDate, visibility: DailyVisibility) {
        let capacity = self.settings.memory_visibility_days.max(1);
        let mut days = self.days.write();
        days.insert(date, visibility);
        if days.len() <= capacity {
            return;
        }

        let today = self.today();
        let mut farthest: Vec<NaiveDate> = days.keys().copied().collect();
        farthest.sort_by_key(|day| std::cmp::Reverse((*day - today).num_days().abs()));
        let excess = days.len() - capacity;
        for day in farthest.into_iter().take(excess) {
            days.remove(&day);
        }
        log::debug!("Evicted {} visibility days from memory", excess);
    }

    /// Remove visibility entries dated before `today - retention_days` or
    /// after `today + visibility_horizon_days`.
    ///
    /// Keys that do not parse as dates are kept. Returns the number of
    /// persisted entries removed.
    pub async fn cleanup_old_visibility_at(
        &self,
        today: NaiveDate,
        retention_days: u32,
    ) -> ObservatoryResult<usize> {
        let threshold = today - Duration::days(i64::from(retention_days));
        let horizon = today + Duration::days(i64::from(self.settings.visibility_horizon_days));
        let keep = move |date: NaiveDate| date >= threshold && date <= horizon;
        let is_expired = move |key: &str| parse_date(key).is_ok_and(|date| !keep(date));

        let removed = self
            .repo
            .delete_where(CacheDomain::DailyVisibility, &is_expired)
            .await?;
        self.days.write().retain(|date, _| keep(*date));

        log::info!(
            "Removed {} visibility entries outside {}..={}",
            removed,
            iso_date(threshold),
            iso_date(horizon)
        );
        Ok(removed)
    }

    pub async fn cleanup_old_visibility(&self, retention_days: u32) -> ObservatoryResult<usize> {
        self.cleanup_old_visibility_at(self.today(), retention_days)
            .await
    }

    // =========================================================
    // Yearly events
    // =========================================================

    /// Events of `year`, or `Pending` after scheduling their generation.
    pub async fn year_events(self: &Arc<Self>, year: i32) -> ObservatoryResult<YearEvents> {
        validate_year(year)?;

        let cached = self.years.read().get(&year).cloned();
        if let Some(hit) = cached {
            return Ok(YearEvents::Ready(hit));
        }

        let key = year.to_string();
        if let Some(stored) = self.load::<Vec<Event>>(CacheDomain::YearlyEvents, &key).await {
            self.years.write().insert(year, stored.clone());
            return Ok(YearEvents::Ready(stored));
        }

        self.schedule_year(year);
        Ok(YearEvents::Pending)
    }

    /// Start background generation of `year` unless it is already running.
    ///
    /// Returns `true` if this call started a job.
    pub fn schedule_year(self: &Arc<Self>, year: i32) -> bool {
        let key = year.to_string();
        let job = job_key(CacheDomain::YearlyEvents, &key);
        let this = Arc::clone(self);
        let (_, started) = self.year_jobs.join_or_start(&key, move || {
            this.jobs.schedule(&job);
            async move { this.fill_year(year, job).await }
        });
        if started {
            log::info!("Scheduled event generation for {}", year);
        }
        started
    }

    /// Events of `year`, waiting for generation if needed.
    pub async fn year_events_blocking(self: &Arc<Self>, year: i32) -> ObservatoryResult<Vec<Event>> {
        if let YearEvents::Ready(events) = self.year_events(year).await? {
            return Ok(events);
        }
        let key = year.to_string();
        if let Some(computation) = self.year_jobs.get(&key) {
            return computation.await;
        }
        // The job finished between the lookup and now
        let cached = self.years.read().get(&year).cloned();
        if let Some(events) = cached {
            return Ok(events);
        }
        let reason = self
            .jobs
            .get(&job_key(CacheDomain::YearlyEvents, &key))
            .and_then(|job| job.error)
            .unwrap_or_else(|| "no result".to_string());
        Err(ObservatoryError::worker(format!(
            "Event generation for {} failed: {}",
            year, reason
        )))
    }

    async fn fill_year(self: Arc<Self>, year: i32, job: String) -> ObservatoryResult<Vec<Event>> {
        self.jobs.start(&job);
        self.jobs
            .log(&job, LogLevel::Info, format!("Generating events for {}...", year));

        let generator = self.generator.clone();
        match self.pool.run(move || generator.generate(year)).await {
            Ok(events) => {
                self.persist(CacheDomain::YearlyEvents, &year.to_string(), &events)
                    .await;
                self.years.write().insert(year, events.clone());
                self.jobs.log(
                    &job,
                    LogLevel::Success,
                    format!("✓ Generated {} events for {}", events.len(), year),
                );
                self.jobs.complete(&job);
                Ok(events)
            }
            Err(e) => {
                log::error!("Event generation for {} failed: {}", year, e);
                self.jobs.fail(&job, e.to_string());
                Err(e)
            }
        }
    }

    // =========================================================
    // Warm-up
    // =========================================================

    /// Cleanup, fill the visibility window and schedule the warm years.
    pub async fn warm_up_at(self: &Arc<Self>, today: NaiveDate) -> WarmUpReport {
        let mut report = WarmUpReport::default();

        match self
            .cleanup_old_visibility_at(today, self.settings.visibility_retention_days)
            .await
        {
            Ok(removed) => report.removed_visibility = removed,
            Err(e) => log::warn!("Visibility cleanup failed: {}", e),
        }

        for offset in 0..self.settings.warm_window_days {
            let date = today + Duration::days(i64::from(offset));
            match self.visibility(date).await {
                Ok(_) => report.filled_days += 1,
                Err(e) => {
                    log::warn!("Warm-up of visibility for {} failed: {}", date, e);
                    report.failed_days += 1;
                }
            }
        }

        for year in (0..self.settings.warm_years as i32).map(|i| today.year() + i) {
            match self.year_events(year).await {
                Ok(YearEvents::Pending) => report.scheduled_years.push(year),
                Ok(YearEvents::Ready(_)) => {}
                Err(e) => log::warn!("Warm-up of events for {} failed: {}", year, e),
            }
        }

        log::info!(
            "Warm-up done: removed {}, filled {} days, scheduled {:?}",
            report.removed_visibility,
            report.filled_days,
            report.scheduled_years
        );
        report
    }

    pub async fn warm_up(self: &Arc<Self>) -> WarmUpReport {
        let today = self.today();
        self.warm_up_at(today).await
    }
}
