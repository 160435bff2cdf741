#![allow(dead_code)]

use std::collections::HashSet;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use lunar_observatory::config::ObservatoryConfig;
use lunar_observatory::db::LocalRepository;
use lunar_observatory::ephemeris::{
    Body, EclipseSearch, EclipticPosition, EphemerisOracle, Horizontal, LongitudeMode,
};
use lunar_observatory::models::{EclipseKind, ObserverLocation, Planet};
use lunar_observatory::services::Observatory;
use lunar_observatory::{ObservatoryError, ObservatoryResult};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Mean daily motion of the Sun, degrees.
pub const SUN_RATE: f64 = 0.9856;
/// Mean daily motion of the Moon, degrees.
pub const MOON_RATE: f64 = 13.1764;

/// Scripted, call-counting oracle.
///
/// - Sun and Moon move uniformly from longitudes given at 2026-01-01 00:00 UTC
///   (the same in both longitude modes).
/// - Mars, Jupiter and Saturn sit 90° from the Sun unless an opposition window
///   puts them at 180°.
/// - Altitudes follow fixed daily sine curves of UTC hour: the Sun peaks at
///   12:00, Jupiter at 00:00 (a night planet), Mercury, Venus and Mars at
///   noon, Saturn never rises and the Moon is always at 30°.
/// - Eclipses are returned when a scripted peak lies within a day of the query.
pub struct MockOracle {
    sun_lon0: f64,
    moon_lon0: f64,
    moon_distance_km: f64,
    eclipses: Vec<(EclipseKind, EclipseSearch)>,
    oppositions: Vec<(Planet, DateTime<Utc>, DateTime<Utc>)>,
    failing: AtomicBool,
    position_calls: AtomicUsize,
    eclipse_calls: AtomicUsize,
    alt_az_calls: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            sun_lon0: 280.0,
            moon_lon0: 0.0,
            moon_distance_km: 384_400.0,
            eclipses: Vec::new(),
            oppositions: Vec::new(),
            failing: AtomicBool::new(false),
            position_calls: AtomicUsize::new(0),
            eclipse_calls: AtomicUsize::new(0),
            alt_az_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_moon(mut self, moon_lon0: f64, distance_km: f64) -> Self {
        self.moon_lon0 = moon_lon0;
        self.moon_distance_km = distance_km;
        self
    }

    pub fn with_eclipse(mut self, kind: EclipseKind, peak: DateTime<Utc>, magnitude: f64) -> Self {
        self.eclipses.push((kind, EclipseSearch { peak, magnitude }));
        self
    }

    pub fn with_opposition(mut self, planet: Planet, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.oppositions.push((planet, from, to));
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn position_calls(&self) -> usize {
        self.position_calls.load(Ordering::SeqCst)
    }

    pub fn eclipse_calls(&self) -> usize {
        self.eclipse_calls.load(Ordering::SeqCst)
    }

    pub fn alt_az_calls(&self) -> usize {
        self.alt_az_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.position_calls() + self.eclipse_calls() + self.alt_az_calls()
    }

    fn check(&self) -> ObservatoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ObservatoryError::oracle("scripted ephemeris failure"))
        } else {
            Ok(())
        }
    }

    fn days(instant: DateTime<Utc>) -> f64 {
        (instant - utc(2026, 1, 1, 0, 0)).num_seconds() as f64 / 86_400.0
    }

    pub fn sun_longitude(&self, instant: DateTime<Utc>) -> f64 {
        self.sun_lon0 + SUN_RATE * Self::days(instant)
    }

    fn in_opposition(&self, planet: Planet, instant: DateTime<Utc>) -> bool {
        self.oppositions
            .iter()
            .any(|(p, from, to)| *p == planet && instant >= *from && instant < *to)
    }
}

fn daily_sine(instant: DateTime<Utc>, peak_hour: f64, amplitude: f64) -> f64 {
    let hour = f64::from(instant.hour()) + f64::from(instant.minute()) / 60.0;
    amplitude * (TAU * (hour - peak_hour) / 24.0).cos()
}

impl EphemerisOracle for MockOracle {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        _mode: LongitudeMode,
    ) -> ObservatoryResult<EclipticPosition> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let sun = self.sun_longitude(instant);
        Ok(match body {
            Body::Sun => EclipticPosition::new(sun, 0.0, 149_600_000.0),
            Body::Moon => EclipticPosition::new(
                self.moon_lon0 + MOON_RATE * Self::days(instant),
                2.0,
                self.moon_distance_km,
            ),
            Body::Mars | Body::Jupiter | Body::Saturn => {
                let planet = match body {
                    Body::Mars => Planet::Mars,
                    Body::Jupiter => Planet::Jupiter,
                    _ => Planet::Saturn,
                };
                let offset = if self.in_opposition(planet, instant) { 180.0 } else { 90.0 };
                EclipticPosition::new(sun + offset, 0.0, 700_000_000.0)
            }
            Body::Mercury | Body::Venus => EclipticPosition::new(sun + 20.0, 0.0, 150_000_000.0),
        })
    }

    fn eclipse_search(
        &self,
        kind: EclipseKind,
        around: DateTime<Utc>,
    ) -> ObservatoryResult<Option<EclipseSearch>> {
        self.eclipse_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .eclipses
            .iter()
            .filter(|(k, search)| *k == kind && (search.peak - around).num_hours().abs() <= 24)
            .map(|(_, search)| *search)
            .min_by_key(|search| (search.peak - around).num_seconds().abs()))
    }

    fn topocentric_alt_az(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        _observer: &ObserverLocation,
    ) -> ObservatoryResult<Horizontal> {
        self.alt_az_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let altitude = match body {
            Body::Sun => daily_sine(instant, 12.0, 50.0),
            Body::Moon => 30.0,
            Body::Jupiter => daily_sine(instant, 0.0, 60.0),
            Body::Saturn => -10.0,
            Body::Mercury | Body::Venus | Body::Mars => daily_sine(instant, 12.0, 40.0),
        };
        Ok(Horizontal::new(altitude, 135.0))
    }
}

/// Config whose reference observer uses UTC so mock curves line up with civil time.
pub fn utc_config() -> ObservatoryConfig {
    let mut config = ObservatoryConfig::default();
    config.observer.utc_offset_hours = 0.0;
    config.workers.max_concurrent = 2;
    config
}

/// Observatory over a mock oracle and an in-memory repository.
pub fn observatory_with(
    oracle: Arc<MockOracle>,
    config: ObservatoryConfig,
) -> (Arc<Observatory>, Arc<LocalRepository>) {
    let repo = Arc::new(LocalRepository::new());
    let observatory = Observatory::new(oracle, repo.clone(), config).unwrap();
    (Arc::new(observatory), repo)
}
