//! Service layer: calculators, background-job plumbing and the facade.
//!
//! The calculators (`moon_calendar`, `eclipse`, `event_classifier`,
//! `opposition`, `yearly_events`, `visibility_computer`) are synchronous and
//! pure given an oracle. `worker_pool` and `job_tracker` run and track them
//! off the async executor, and `observatory` ties everything to the cache.

pub mod eclipse;
pub mod event_classifier;
pub mod job_tracker;
pub mod moon_calendar;
pub mod observatory;
pub mod opposition;
pub mod visibility_computer;
pub mod worker_pool;
pub mod yearly_events;

pub use eclipse::EclipseDetector;
pub use event_classifier::classify_moon_event;
pub use job_tracker::{JobRecord, JobStatus, JobTracker, LogEntry, LogLevel};
pub use moon_calendar::{CalendarRequest, MoonCalendar};
pub use observatory::{MorningBrief, NextMajorEvent, Observatory};
pub use opposition::OppositionDetector;
pub use visibility_computer::VisibilityComputer;
pub use worker_pool::WorkerPool;
pub use yearly_events::YearlyEventGenerator;
