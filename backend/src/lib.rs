//! # Lunar Observatory
//!
//! Celestial computation and caching engine for a lunar-calendar and
//! sky-events service.
//!
//! For a civil date (and optionally an observer location) the engine derives
//! the lunar-calendar day (tithi, paksha, nakshatra, rashi, illumination, age,
//! distance), solar and lunar eclipses, supermoons, planetary oppositions and
//! nightly planet-visibility windows. Year-scale results are cached in two
//! tiers and generated in the background so repeated queries never redo
//! ephemeris work.
//!
//! ## Architecture
//!
//! - [`ephemeris`]: the [`ephemeris::EphemerisOracle`] trait and the built-in
//!   siderust-backed implementation
//! - [`models`]: domain records and calendar/time helpers
//! - [`services`]: calculators, worker pool, job tracker and the
//!   [`services::Observatory`] facade
//! - [`cache`]: memory tier, in-flight collapsing and background fills
//! - [`db`]: persistent cache tier (repository pattern)
//! - [`config`]: TOML + environment configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod cache;
pub mod config;
pub mod db;
pub mod ephemeris;
pub mod error;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{ObservatoryError, ObservatoryResult};
