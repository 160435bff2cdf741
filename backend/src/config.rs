//! Engine configuration.
//!
//! Loaded from `observatory.toml` (searched in the same locations as
//! `repository.toml`), falling back to built-in defaults when no file is
//! present. A handful of environment variables override file values:
//!
//! - `HOST`, `PORT`: server bind address
//! - `OBSERVER_LAT`, `OBSERVER_LON`: reference observer
//!
//! Storage selection (`REPOSITORY_TYPE`, `CACHE_DIR`) lives in
//! [`crate::db::factory`].

use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ObservatoryResult;
use crate::models::{utc_offset, ObserverLocation};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservatoryConfig {
    #[serde(default)]
    pub observer: ObserverSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub workers: WorkerSettings,
    #[serde(default)]
    pub eclipse: EclipseSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Reference observer used for year events, visibility and the brief.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverSettings {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: f64,
    /// Region name attached to observer-local events (supermoons, oppositions).
    #[serde(default = "default_region_label")]
    pub region_label: String,
}

fn default_latitude() -> f64 {
    23.0225
}

fn default_longitude() -> f64 {
    72.5714
}

fn default_utc_offset_hours() -> f64 {
    5.5
}

fn default_region_label() -> String {
    "India".to_string()
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            utc_offset_hours: default_utc_offset_hours(),
            region_label: default_region_label(),
        }
    }
}

impl ObserverSettings {
    pub fn location(&self) -> ObservatoryResult<ObserverLocation> {
        ObserverLocation::new(self.latitude, self.longitude)
    }

    pub fn offset(&self) -> ObservatoryResult<FixedOffset> {
        utc_offset(self.utc_offset_hours)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Persisted visibility older than this many days is deleted on warm-up
    /// and by the periodic cleanup.
    #[serde(default = "default_retention_days")]
    pub visibility_retention_days: u32,
    /// Days of visibility filled on warm-up, starting today.
    #[serde(default = "default_warm_window_days")]
    pub warm_window_days: u32,
    /// Years of events scheduled on warm-up, starting with the current one.
    #[serde(default = "default_warm_years")]
    pub warm_years: u32,
    /// Persisted visibility dated further ahead than this is deleted too.
    #[serde(default = "default_horizon_days")]
    pub visibility_horizon_days: u32,
    /// Most visibility days held in memory; the days farthest from today go first.
    #[serde(default = "default_memory_days")]
    pub memory_visibility_days: usize,
    /// Period of the server's background cleanup.
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u64,
}

fn default_retention_days() -> u32 {
    30
}

fn default_warm_window_days() -> u32 {
    7
}

fn default_warm_years() -> u32 {
    3
}

fn default_horizon_days() -> u32 {
    366
}

fn default_memory_days() -> usize {
    400
}

fn default_cleanup_interval_hours() -> u64 {
    24
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            visibility_retention_days: default_retention_days(),
            warm_window_days: default_warm_window_days(),
            warm_years: default_warm_years(),
            visibility_horizon_days: default_horizon_days(),
            memory_visibility_days: default_memory_days(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Upper bound on concurrently running ephemeris computations.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// A named longitude band. `lon_min > lon_max` wraps through 180°.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBand {
    pub name: String,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBand {
    pub fn new(name: impl Into<String>, lon_min: f64, lon_max: f64) -> Self {
        Self {
            name: name.into(),
            lon_min,
            lon_max,
        }
    }
}

/// Coarse global-visibility heuristic for eclipses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EclipseSettings {
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionBand>,
    /// Half-width of the night side around the antisolar point.
    #[serde(default = "default_lunar_half_width")]
    pub lunar_half_width_deg: f64,
    /// Half-width of the day side around the Sun's longitude.
    #[serde(default = "default_solar_half_width")]
    pub solar_half_width_deg: f64,
}

fn default_regions() -> Vec<RegionBand> {
    vec![
        RegionBand::new("Americas", -170.0, -30.0),
        RegionBand::new("Europe & Africa", -30.0, 60.0),
        RegionBand::new("Asia", 60.0, 150.0),
        RegionBand::new("Australia & Pacific", 150.0, -170.0),
    ]
}

fn default_lunar_half_width() -> f64 {
    120.0
}

fn default_solar_half_width() -> f64 {
    60.0
}

impl Default for EclipseSettings {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            lunar_half_width_deg: default_lunar_half_width(),
            solar_half_width_deg: default_solar_half_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ObservatoryConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ObservatoryConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Search standard locations for `observatory.toml`.
    pub fn find_default_file() -> Option<PathBuf> {
        [
            PathBuf::from("observatory.toml"),
            PathBuf::from("backend/observatory.toml"),
            PathBuf::from("../observatory.toml"),
        ]
        .into_iter()
        .find(|p| p.exists())
    }

    /// File from the default location (or built-in defaults), then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_default_file() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                log::info!("No observatory.toml found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HOST`, `PORT`, `OBSERVER_LAT` and `OBSERVER_LON`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", port))?;
        }
        if let Ok(lat) = std::env::var("OBSERVER_LAT") {
            self.observer.latitude = lat
                .parse()
                .with_context(|| format!("OBSERVER_LAT must be a number, got '{}'", lat))?;
        }
        if let Ok(lon) = std::env::var("OBSERVER_LON") {
            self.observer.longitude = lon
                .parse()
                .with_context(|| format!("OBSERVER_LON must be a number, got '{}'", lon))?;
        }
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.observer.location()?;
        self.observer.offset()?;
        if self.workers.max_concurrent == 0 {
            bail!("workers.max_concurrent must be at least 1");
        }
        if self.cache.memory_visibility_days == 0 {
            bail!("cache.memory_visibility_days must be at least 1");
        }
        if self.cache.cleanup_interval_hours == 0 {
            bail!("cache.cleanup_interval_hours must be at least 1");
        }
        if self.eclipse.regions.is_empty() {
            bail!("eclipse.regions must not be empty");
        }
        for width in [
            self.eclipse.lunar_half_width_deg,
            self.eclipse.solar_half_width_deg,
        ] {
            if !(0.0..=180.0).contains(&width) {
                bail!("eclipse half-widths must lie in [0, 180], got {}", width);
            }
        }
        Ok(())
    }
}
