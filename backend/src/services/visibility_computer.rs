//! Nightly planet-visibility computation.
//!
//! Samples the apparent altitude of each naked-eye planet and of the Sun at a
//! fixed 10-minute cadence over one local day, then reduces each altitude
//! curve to a [`VisibilityRecord`]:
//!
//! - rise / set: first and last sample above the horizon
//! - transit: sample of maximum altitude
//! - visible after sunset: planet above 10° while the Sun is below -6°
//! - best window: longest contiguous run with the planet above 20° and the
//!   Sun below -12°
//!
//! Rise and set come from sample positions, so a body crossing the horizon
//! more than twice in a day is summarized by its outermost crossings only.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;

use crate::ephemeris::{Body, EphemerisOracle};
use crate::error::ObservatoryResult;
use crate::models::{
    format_hhmm, local_midnight, sample_instant, DailyVisibility, ObserverLocation, Planet,
    Rating, VisibilityRecord,
};

/// Minutes between samples.
pub const SAMPLE_STEP_MINUTES: i64 = 10;

/// Samples per local day.
pub const SAMPLES_PER_DAY: usize = 144;

const AFTER_SUNSET_MIN_ALT_DEG: f64 = 10.0;
const AFTER_SUNSET_SUN_MAX_ALT_DEG: f64 = -6.0;
const BEST_WINDOW_MIN_ALT_DEG: f64 = 20.0;
const BEST_WINDOW_SUN_MAX_ALT_DEG: f64 = -12.0;
const EXCELLENT_MIN_ALT_DEG: f64 = 35.0;

/// One point of a planet's altitude curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeSample {
    pub instant: DateTime<Utc>,
    pub altitude: f64,
    pub azimuth: f64,
    pub sun_altitude: f64,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Index range `[start, end]` of the longest run where `pred` holds.
/// Earliest run wins ties.
fn longest_run<T>(items: &[T], pred: impl Fn(&T) -> bool) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut current: Option<usize> = None;

    for (i, item) in items.iter().enumerate() {
        match (pred(item), current) {
            (true, None) => current = Some(i),
            (false, Some(start)) => {
                best = longer(best, (start, i - 1));
                current = None;
            }
            _ => {}
        }
    }
    if let Some(start) = current {
        best = longer(best, (start, items.len() - 1));
    }
    best
}

fn longer(best: Option<(usize, usize)>, candidate: (usize, usize)) -> Option<(usize, usize)> {
    match best {
        Some((s, e)) if e - s >= candidate.1 - candidate.0 => Some((s, e)),
        _ => Some(candidate),
    }
}

/// Reduce an altitude curve to a visibility record.
pub fn summarize(planet: Planet, samples: &[AltitudeSample], offset: FixedOffset) -> VisibilityRecord {
    let above: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.altitude > 0.0)
        .map(|(i, _)| i)
        .collect();

    let (Some(&rise_idx), Some(&set_idx)) = (above.first(), above.last()) else {
        return VisibilityRecord::never_rises(planet);
    };

    let transit = samples
        .iter()
        .max_by(|a, b| a.altitude.total_cmp(&b.altitude))
        .unwrap_or(&samples[rise_idx]);

    let visible_after_sunset = samples.iter().any(|s| {
        s.altitude > AFTER_SUNSET_MIN_ALT_DEG && s.sun_altitude < AFTER_SUNSET_SUN_MAX_ALT_DEG
    });

    let best_view_window = longest_run(samples, |s| {
        s.altitude > BEST_WINDOW_MIN_ALT_DEG && s.sun_altitude < BEST_WINDOW_SUN_MAX_ALT_DEG
    })
    .map(|(start, end)| {
        format!(
            "{} - {}",
            format_hhmm(samples[start].instant, offset),
            format_hhmm(samples[end].instant, offset)
        )
    });

    let max_altitude = round2(transit.altitude);
    let rating = if !visible_after_sunset || best_view_window.is_none() {
        Rating::Poor
    } else if max_altitude < EXCELLENT_MIN_ALT_DEG {
        Rating::Good
    } else {
        Rating::Excellent
    };

    VisibilityRecord {
        visible: true,
        rise: Some(format_hhmm(samples[rise_idx].instant, offset)),
        set: Some(format_hhmm(samples[set_idx].instant, offset)),
        transit: Some(format_hhmm(transit.instant, offset)),
        max_altitude: Some(max_altitude),
        azimuth: Some(round2(transit.azimuth)),
        magnitude: planet.catalog_magnitude(),
        visible_after_sunset,
        best_view_window,
        rating,
    }
}

/// Computes [`DailyVisibility`] by sampling the oracle.
#[derive(Clone)]
pub struct VisibilityComputer {
    oracle: Arc<dyn EphemerisOracle>,
}

impl VisibilityComputer {
    pub fn new(oracle: Arc<dyn EphemerisOracle>) -> Self {
        Self { oracle }
    }

    /// Sample instants of the local day starting at midnight of `date`.
    pub fn sample_instants(
        date: NaiveDate,
        offset: FixedOffset,
    ) -> ObservatoryResult<Vec<DateTime<Utc>>> {
        let start = local_midnight(date, offset)?;
        Ok((0..SAMPLES_PER_DAY)
            .map(|i| sample_instant(start, SAMPLE_STEP_MINUTES, i))
            .collect())
    }

    /// Visibility of every planet on `date` for `observer`.
    pub fn compute(
        &self,
        date: NaiveDate,
        observer: &ObserverLocation,
        offset: FixedOffset,
    ) -> ObservatoryResult<DailyVisibility> {
        let instants = Self::sample_instants(date, offset)?;

        let sun_altitudes = instants
            .iter()
            .map(|t| {
                self.oracle
                    .topocentric_alt_az(Body::Sun, *t, observer)
                    .map(|h| h.altitude_deg())
            })
            .collect::<ObservatoryResult<Vec<f64>>>()?;

        let mut result = DailyVisibility::new();
        for planet in Planet::ALL {
            let samples = instants
                .iter()
                .zip(&sun_altitudes)
                .map(|(t, sun_altitude)| {
                    let h = self.oracle.topocentric_alt_az(planet.into(), *t, observer)?;
                    Ok(AltitudeSample {
                        instant: *t,
                        altitude: h.altitude_deg(),
                        azimuth: h.azimuth_deg(),
                        sun_altitude: *sun_altitude,
                    })
                })
                .collect::<ObservatoryResult<Vec<_>>>()?;

            result.insert(planet.as_str().to_string(), summarize(planet, &samples, offset));
        }

        log::debug!("Computed visibility for {}", date);
        Ok(result)
    }
}
