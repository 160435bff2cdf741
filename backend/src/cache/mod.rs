//! Multi-tier caching for computed observation data.
//!
//! ```text
//! request ──► memory (RwLock<HashMap>) ──miss──► CacheRepository ──miss──► compute
//!                 ▲                                   ▲                      │
//!                 └───────────── populate ◄───────────┴──── write-through ◄──┘
//! ```
//!
//! Two domains are cached: yearly event lists (generated in the background,
//! callers see [`YearEvents::Pending`] until they exist) and daily visibility
//! (computed on the worker pool while the caller waits). Concurrent misses on
//! one key share a single computation through [`InFlight`].

pub mod in_flight;
pub mod manager;

pub use in_flight::{InFlight, SharedComputation};
pub use manager::{job_key, CacheManager, WarmUpReport, YearEvents};
