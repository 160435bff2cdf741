//! Moon calendar calculator.
//!
//! Maps a civil date (plus optional time-of-day, offset and location) to the
//! lunar-calendar day: tithi, paksha, nakshatra, rashi, illumination, age and
//! distance. The tithi is evaluated at a canonical instant, 06:00 local by
//! default, while the `realtime_*` values follow the requested time.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::event_classifier::classify_moon_event;
use crate::ephemeris::{Body, EphemerisOracle, LongitudeMode};
use crate::error::ObservatoryResult;
use crate::models::{
    local_to_utc, nakshatra_for, parse_date, phase_name, rashi_for, tithi_name, utc_offset,
    weekday_name, CalendarDay, ObserverLocation, Paksha, SYNODIC_MONTH_DAYS, TITHI_SPAN_DEG,
};

/// Hour of the canonical "sunrise" instant.
pub const CANONICAL_HOUR: u32 = 6;

/// Default offset (+05:30).
pub const DEFAULT_UTC_OFFSET_HOURS: f64 = 5.5;

/// Input of [`MoonCalendar::compute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRequest {
    /// `YYYY-MM-DD` or `YYYY/MM/DD`.
    pub date: String,
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    #[serde(default = "default_offset")]
    pub utc_offset_hours: f64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Evaluate the tithi at 06:00 local rather than at `hour:minute`.
    #[serde(default = "default_true")]
    pub calculate_at_sunrise: bool,
}

fn default_hour() -> u32 {
    CANONICAL_HOUR
}

fn default_offset() -> f64 {
    DEFAULT_UTC_OFFSET_HOURS
}

fn default_true() -> bool {
    true
}

impl CalendarRequest {
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            hour: CANONICAL_HOUR,
            minute: 0,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            latitude: None,
            longitude: None,
            calculate_at_sunrise: true,
        }
    }

    /// Observer for this request; geocentric unless both coordinates are given.
    pub fn location(&self) -> ObservatoryResult<ObserverLocation> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => ObserverLocation::new(lat, lon),
            _ => Ok(ObserverLocation::geocentric()),
        }
    }

    /// Note describing which instant the tithi refers to.
    pub fn policy_note(&self) -> &'static str {
        if self.calculate_at_sunrise {
            "Tithi calculated at Sunrise (approx)"
        } else {
            "Exact time calculation"
        }
    }
}

/// Moon-minus-Sun elongation in `[0, 360)`.
pub fn elongation_deg(sun_lon: f64, moon_lon: f64) -> f64 {
    (moon_lon - sun_lon).rem_euclid(360.0)
}

/// Tithi index (1..=30) and paksha for an elongation.
pub fn tithi_from_elongation(elongation: f64) -> (u8, Paksha) {
    let index = ((elongation.rem_euclid(360.0) / TITHI_SPAN_DEG).floor() as u8 + 1).min(30);
    (index, Paksha::from_tithi(index))
}

/// Illuminated fraction of the disk, percent.
pub fn illumination_percent(elongation: f64) -> f64 {
    50.0 * (1.0 - elongation.to_radians().cos())
}

/// Days since new moon, from the elongation.
pub fn moon_age_days(elongation: f64) -> f64 {
    (elongation.rem_euclid(360.0) / 360.0) * SYNODIC_MONTH_DAYS
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

struct LunarSample {
    elongation: f64,
    moon_lon: f64,
    moon_lat: f64,
    moon_distance_km: f64,
}

/// Calendar calculator bound to an oracle.
#[derive(Clone)]
pub struct MoonCalendar {
    oracle: Arc<dyn EphemerisOracle>,
}

impl MoonCalendar {
    pub fn new(oracle: Arc<dyn EphemerisOracle>) -> Self {
        Self { oracle }
    }

    fn sample(&self, instant: DateTime<Utc>) -> ObservatoryResult<LunarSample> {
        let sun = self.oracle.position(Body::Sun, instant, LongitudeMode::Sidereal)?;
        let moon = self.oracle.position(Body::Moon, instant, LongitudeMode::Sidereal)?;
        Ok(LunarSample {
            elongation: elongation_deg(sun.longitude_deg(), moon.longitude_deg()),
            moon_lon: moon.longitude_deg(),
            moon_lat: moon.latitude_deg(),
            moon_distance_km: moon.distance_km(),
        })
    }

    /// Calendar day for a request. Fails with a data error on malformed input.
    pub fn compute(&self, request: &CalendarRequest) -> ObservatoryResult<CalendarDay> {
        let date = parse_date(&request.date)?;
        request.location()?;
        let offset = utc_offset(request.utc_offset_hours)?;

        let requested = local_to_utc(date, request.hour, request.minute, offset)?;
        let canonical = if request.calculate_at_sunrise {
            local_to_utc(date, CANONICAL_HOUR, 0, offset)?
        } else {
            requested
        };

        let sample = self.sample(canonical)?;
        let realtime_elongation = if canonical != requested {
            self.sample(requested)?.elongation
        } else {
            sample.elongation
        };

        Ok(self.build_day(date, &sample, realtime_elongation))
    }

    /// Calendar day at the canonical 06:00 local instant.
    pub fn compute_for_date(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> ObservatoryResult<CalendarDay> {
        let canonical = local_to_utc(date, CANONICAL_HOUR, 0, offset)?;
        let sample = self.sample(canonical)?;
        Ok(self.build_day(date, &sample, sample.elongation))
    }

    fn build_day(&self, date: NaiveDate, sample: &LunarSample, realtime_elongation: f64) -> CalendarDay {
        let (tithi_index, paksha) = tithi_from_elongation(sample.elongation);
        let illumination = illumination_percent(sample.elongation);
        let realtime_age = moon_age_days(realtime_elongation);

        CalendarDay {
            date,
            weekday: weekday_name(date).to_string(),
            tithi_index,
            paksha,
            tithi_name: tithi_name(tithi_index).to_string(),
            phase_name: phase_name(realtime_age).to_string(),
            phase_angle_deg: f64::from(tithi_index) * TITHI_SPAN_DEG,
            illumination_percent: round2(illumination),
            moon_age_days: round2(moon_age_days(sample.elongation)),
            realtime_illumination_percent: round2(illumination_percent(realtime_elongation)),
            realtime_moon_age_days: round2(realtime_age),
            distance_km: sample.moon_distance_km.round(),
            moon_latitude_deg: sample.moon_lat,
            nakshatra: nakshatra_for(sample.moon_lon).to_string(),
            rashi: rashi_for(sample.moon_lon).to_string(),
            classified_event: classify_moon_event(
                illumination,
                sample.moon_distance_km,
                tithi_index,
                paksha,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{EclipseSearch, EclipticPosition, Horizontal};
    use crate::error::ObservatoryError;
    use crate::models::{EclipseKind, MoonEvent};
    use chrono::TimeZone;

    /// Sun and Moon moving uniformly from fixed longitudes at 2026-01-01 00:00 UTC.
    struct UniformOracle {
        sun_lon0: f64,
        moon_lon0: f64,
        distance_km: f64,
    }

    impl UniformOracle {
        fn days(instant: DateTime<Utc>) -> f64 {
            let epoch = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
            (instant - epoch).num_seconds() as f64 / 86_400.0
        }
    }

    impl EphemerisOracle for UniformOracle {
        fn position(
            &self,
            body: Body,
            instant: DateTime<Utc>,
            _mode: LongitudeMode,
        ) -> ObservatoryResult<EclipticPosition> {
            let d = Self::days(instant);
            match body {
                Body::Sun => Ok(EclipticPosition::new(self.sun_lon0 + 0.9856 * d, 0.0, 1.496e8)),
                Body::Moon => Ok(EclipticPosition::new(
                    self.moon_lon0 + 13.1764 * d,
                    1.5,
                    self.distance_km,
                )),
                other => Err(ObservatoryError::oracle(format!("no data for {other}"))),
            }
        }

        fn eclipse_search(
            &self,
            _kind: EclipseKind,
            _around: DateTime<Utc>,
        ) -> ObservatoryResult<Option<EclipseSearch>> {
            Ok(None)
        }

        fn topocentric_alt_az(
            &self,
            _body: Body,
            _instant: DateTime<Utc>,
            _observer: &ObserverLocation,
        ) -> ObservatoryResult<Horizontal> {
            Ok(Horizontal::new(-10.0, 0.0))
        }
    }

    fn calendar(sun_lon0: f64, moon_lon0: f64, distance_km: f64) -> MoonCalendar {
        MoonCalendar::new(Arc::new(UniformOracle {
            sun_lon0,
            moon_lon0,
            distance_km,
        }))
    }

    #[test]
    fn test_tithi_from_elongation() {
        assert_eq!(tithi_from_elongation(0.0), (1, Paksha::Shukla));
        assert_eq!(tithi_from_elongation(179.99), (15, Paksha::Shukla));
        assert_eq!(tithi_from_elongation(180.0), (16, Paksha::Krishna));
        assert_eq!(tithi_from_elongation(359.999), (30, Paksha::Krishna));
    }

    #[test]
    fn test_illumination_extremes() {
        assert!(illumination_percent(0.0).abs() < 1e-12);
        assert!((illumination_percent(180.0) - 100.0).abs() < 1e-12);
        assert!((illumination_percent(90.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_moon_age_matches_reference_formula() {
        let age = moon_age_days(elongation_deg(300.0, 100.0));
        assert!((age - (160.0 / 360.0) * 29.530588).abs() < 1e-12);
    }

    #[test]
    fn test_full_moon_at_perigee_is_supermoon() {
        // Elongation at 2026-01-01 06:00 IST (00:30 UTC) is ~174.9 deg: Purnima
        let day = calendar(0.0, 175.0, 357_500.0)
            .compute(&CalendarRequest::for_date("2026-01-01"))
            .unwrap();
        assert_eq!(day.tithi_index, 15);
        assert_eq!(day.tithi_name, "Purnima");
        assert_eq!(day.paksha, Paksha::Shukla);
        assert_eq!(day.classified_event, MoonEvent::Supermoon);
        assert_eq!(day.phase_angle_deg, 180.0);
        assert_eq!(day.weekday, "Thursday");
        assert_eq!(day.distance_km, 357_500.0);
    }

    #[test]
    fn test_realtime_values_follow_requested_time() {
        let cal = calendar(0.0, 10.0, 384_000.0);
        let mut request = CalendarRequest::for_date("2026-01-01");
        request.hour = 22;

        let day = cal.compute(&request).unwrap();
        assert!(day.realtime_moon_age_days > day.moon_age_days);
        assert!(day.realtime_illumination_percent > day.illumination_percent);

        request.calculate_at_sunrise = false;
        let exact = cal.compute(&request).unwrap();
        assert_eq!(exact.moon_age_days, exact.realtime_moon_age_days);
        assert_eq!(exact.moon_age_days, day.realtime_moon_age_days);
    }

    #[test]
    fn test_canonical_request_has_identical_realtime_values() {
        let day = calendar(0.0, 42.0, 384_000.0)
            .compute(&CalendarRequest::for_date("2026/01/01"))
            .unwrap();
        assert_eq!(day.moon_age_days, day.realtime_moon_age_days);
        assert_eq!(day.illumination_percent, day.realtime_illumination_percent);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let cal = calendar(0.0, 0.0, 384_000.0);
        let bad_date = CalendarRequest::for_date("2026-02-30");
        assert!(cal.compute(&bad_date).unwrap_err().is_data_error());

        let mut bad_lat = CalendarRequest::for_date("2026-02-01");
        bad_lat.latitude = Some(95.0);
        bad_lat.longitude = Some(0.0);
        assert!(cal.compute(&bad_lat).unwrap_err().is_data_error());

        let mut bad_time = CalendarRequest::for_date("2026-02-01");
        bad_time.hour = 25;
        assert!(cal.compute(&bad_time).unwrap_err().is_data_error());

        let mut bad_offset = CalendarRequest::for_date("2026-02-01");
        bad_offset.utc_offset_hours = 20.0;
        assert!(cal.compute(&bad_offset).unwrap_err().is_data_error());
    }

    #[test]
    fn test_policy_note() {
        let mut request = CalendarRequest::for_date("2026-01-01");
        assert_eq!(request.policy_note(), "Tithi calculated at Sunrise (approx)");
        request.calculate_at_sunrise = false;
        assert_eq!(request.policy_note(), "Exact time calculation");
    }
}
