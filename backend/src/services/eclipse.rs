//! Eclipse detection for a civil date.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;

use crate::config::{EclipseSettings, RegionBand};
use crate::ephemeris::{Body, EclipseSearch, EphemerisOracle, LongitudeMode};
use crate::error::ObservatoryResult;
use crate::models::{
    format_hhmm, local_date, local_midnight, visibility_note, EclipseKind, EclipseRecord,
    EclipseType, ObserverLocation,
};

/// Apparent lunar altitude above which an eclipsed Moon counts as visible.
const LUNAR_HORIZON_DEG: f64 = -0.5;

/// Offsets from the peak at which the Moon's altitude is sampled.
const LUNAR_SAMPLE_OFFSETS_H: [i64; 3] = [-2, 0, 2];

/// Normalize a longitude into `(-180, 180]`.
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// An arc on the longitude circle, `start` eastwards over `length` degrees.
#[derive(Debug, Clone, Copy)]
struct Arc360 {
    start: f64,
    length: f64,
}

impl Arc360 {
    fn centered(center: f64, half_width: f64) -> Self {
        Self {
            start: (center - half_width).rem_euclid(360.0),
            length: (2.0 * half_width).min(360.0),
        }
    }

    fn band(band: &RegionBand) -> Self {
        let span = band.lon_max - band.lon_min;
        let length = if span >= 360.0 { 360.0 } else { span.rem_euclid(360.0) };
        Self {
            start: band.lon_min.rem_euclid(360.0),
            length,
        }
    }

    fn contains(&self, lon: f64) -> bool {
        (lon - self.start).rem_euclid(360.0) <= self.length
    }

    fn overlaps(&self, other: &Arc360) -> bool {
        self.contains(other.start) || other.contains(self.start)
    }
}

/// Names of the bands overlapping `center ± half_width`, in configuration order.
pub fn regions_overlapping(regions: &[RegionBand], center: f64, half_width: f64) -> Vec<String> {
    let window = Arc360::centered(wrap_longitude(center), half_width);
    regions
        .iter()
        .filter(|band| Arc360::band(band).overlaps(&window))
        .map(|band| band.name.clone())
        .collect()
}

/// Finds solar and lunar eclipses whose maximum falls on a civil date.
#[derive(Clone)]
pub struct EclipseDetector {
    oracle: Arc<dyn EphemerisOracle>,
    settings: EclipseSettings,
}

impl EclipseDetector {
    pub fn new(oracle: Arc<dyn EphemerisOracle>, settings: EclipseSettings) -> Self {
        Self { oracle, settings }
    }

    /// Eclipse of `kind` peaking on `date` in the observer's offset, if any.
    pub fn detect(
        &self,
        kind: EclipseKind,
        date: NaiveDate,
        observer: &ObserverLocation,
        offset: FixedOffset,
    ) -> ObservatoryResult<Option<EclipseRecord>> {
        let around = local_midnight(date, offset)?;
        let Some(EclipseSearch { peak, magnitude }) = self.oracle.eclipse_search(kind, around)?
        else {
            return Ok(None);
        };

        if local_date(peak, offset) != date {
            log::debug!(
                "{} eclipse peak {} falls outside {}, skipping",
                kind,
                peak,
                date
            );
            return Ok(None);
        }

        let eclipse_type = EclipseType::classify(kind, magnitude);
        let visible_here = match kind {
            EclipseKind::Lunar => self.moon_above_horizon_near(peak, observer)?,
            EclipseKind::Solar => {
                magnitude > 0.0
                    && self
                        .oracle
                        .topocentric_alt_az(Body::Sun, peak, observer)?
                        .altitude_deg()
                        > 0.0
            }
        };
        let global_visibility = self.global_regions(kind, peak)?;

        Ok(Some(EclipseRecord {
            date,
            kind,
            eclipse_type,
            magnitude,
            visible_here,
            visibility_note: visibility_note(visible_here).to_string(),
            global_visibility,
            peak_instant: peak,
            peak_time_local: format_hhmm(peak, offset),
        }))
    }

    /// Solar then lunar eclipse for `date`.
    pub fn detect_both(
        &self,
        date: NaiveDate,
        observer: &ObserverLocation,
        offset: FixedOffset,
    ) -> ObservatoryResult<(Option<EclipseRecord>, Option<EclipseRecord>)> {
        let solar = self.detect(EclipseKind::Solar, date, observer, offset)?;
        let lunar = self.detect(EclipseKind::Lunar, date, observer, offset)?;
        Ok((solar, lunar))
    }

    fn moon_above_horizon_near(
        &self,
        peak: DateTime<Utc>,
        observer: &ObserverLocation,
    ) -> ObservatoryResult<bool> {
        for hours in LUNAR_SAMPLE_OFFSETS_H {
            let instant = peak + Duration::hours(hours);
            let horizontal = self.oracle.topocentric_alt_az(Body::Moon, instant, observer)?;
            if horizontal.altitude_deg() > LUNAR_HORIZON_DEG {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn global_regions(&self, kind: EclipseKind, peak: DateTime<Utc>) -> ObservatoryResult<Vec<String>> {
        let sun_lon = self
            .oracle
            .position(Body::Sun, peak, LongitudeMode::Geometric)?
            .longitude_deg();
        let (center, half_width) = match kind {
            EclipseKind::Lunar => (sun_lon + 180.0, self.settings.lunar_half_width_deg),
            EclipseKind::Solar => (sun_lon, self.settings.solar_half_width_deg),
        };
        Ok(regions_overlapping(&self.settings.regions, center, half_width))
    }
}
