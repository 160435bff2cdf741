//! Observatory facade.
//!
//! The single entry point used by the HTTP layer and the server binary. It
//! owns the calculators and the [`CacheManager`] and exposes the consumer
//! operations: daily snapshot, year events, upcoming and next-major events,
//! visibility, cleanup, warm-up, morning brief and job lookup.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::eclipse::EclipseDetector;
use super::job_tracker::JobRecord;
use super::moon_calendar::{CalendarRequest, MoonCalendar};
use crate::cache::{CacheManager, WarmUpReport, YearEvents};
use crate::config::ObservatoryConfig;
use crate::db::CacheRepository;
use crate::ephemeris::EphemerisOracle;
use crate::error::ObservatoryResult;
use crate::models::{
    iso_date, parse_date, sort_events, utc_offset, DailySnapshot, DailyVisibility, Event, Planet,
};

/// Look-ahead of [`Observatory::next_major_event`].
pub const NEXT_MAJOR_HORIZON_DAYS: u32 = 3;

/// Title of the morning brief notification.
pub const BRIEF_TITLE: &str = "Lunar Observatory";

/// Answer of [`Observatory::next_major_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextMajorEvent {
    pub has_major_within_3_days: bool,
    pub next_event: Option<Event>,
}

/// Short daily summary: Moon phase plus planets worth looking at tonight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorningBrief {
    pub date: NaiveDate,
    pub title: String,
    pub moon_phase: String,
    pub illumination_percent: f64,
    pub visible_planets: Vec<String>,
    pub body: String,
}

/// Planets rated Good or Excellent, in catalog order.
pub fn well_placed_planets(visibility: &DailyVisibility) -> Vec<String> {
    Planet::ALL
        .iter()
        .filter(|planet| {
            visibility
                .get(planet.as_str())
                .is_some_and(|record| record.rating.is_well_placed())
        })
        .map(|planet| planet.display_name().to_string())
        .collect()
}

/// Notification body of the morning brief.
pub fn brief_body(moon_phase: &str, illumination_percent: f64, planets: &[String]) -> String {
    let planet_line = if planets.is_empty() {
        "No major planets well placed tonight".to_string()
    } else {
        format!("Best Tonight:\n{}", planets.join(", "))
    };
    format!(
        "Moon: {}\nIllumination: {}%\n\n{}",
        moon_phase, illumination_percent, planet_line
    )
}

pub struct Observatory {
    config: ObservatoryConfig,
    calendar: MoonCalendar,
    eclipses: EclipseDetector,
    cache: Arc<CacheManager>,
}

impl Observatory {
    pub fn new(
        oracle: Arc<dyn EphemerisOracle>,
        repo: Arc<dyn CacheRepository>,
        config: ObservatoryConfig,
    ) -> ObservatoryResult<Self> {
        let cache = Arc::new(CacheManager::new(oracle.clone(), repo, &config)?);
        Ok(Self {
            calendar: MoonCalendar::new(oracle.clone()),
            eclipses: EclipseDetector::new(oracle, config.eclipse.clone()),
            cache,
            config,
        })
    }

    pub fn config(&self) -> &ObservatoryConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Today's civil date for the reference observer.
    pub fn today(&self) -> NaiveDate {
        self.cache.today()
    }

    /// Calendar day, eclipses and tithi-policy note for one request.
    pub async fn daily_snapshot(&self, request: CalendarRequest) -> ObservatoryResult<DailySnapshot> {
        // Reject bad input before queueing on the pool
        let date = parse_date(&request.date)?;
        let location = request.location()?;
        let offset = utc_offset(request.utc_offset_hours)?;

        let calendar = self.calendar.clone();
        let eclipses = self.eclipses.clone();
        self.cache
            .pool()
            .run(move || {
                let day = calendar.compute(&request)?;
                let (solar_eclipse, lunar_eclipse) =
                    eclipses.detect_both(date, &location, offset)?;
                Ok(DailySnapshot {
                    location,
                    calendar: day,
                    solar_eclipse,
                    lunar_eclipse,
                    note: request.policy_note().to_string(),
                })
            })
            .await
    }

    /// Request for the reference observer at the canonical instant of `date`.
    pub fn reference_request(&self, date: NaiveDate) -> CalendarRequest {
        let mut request = CalendarRequest::for_date(iso_date(date));
        request.utc_offset_hours = self.config.observer.utc_offset_hours;
        request.latitude = Some(self.config.observer.latitude);
        request.longitude = Some(self.config.observer.longitude);
        request
    }

    pub async fn year_events(&self, year: i32) -> ObservatoryResult<YearEvents> {
        self.cache.year_events(year).await
    }

    /// Events dated `today..=today + horizon_days`, sorted by date then id.
    ///
    /// Years still being generated contribute nothing yet; their generation
    /// is scheduled by the lookup.
    pub async fn upcoming_events_at(
        &self,
        today: NaiveDate,
        horizon_days: u32,
    ) -> ObservatoryResult<Vec<Event>> {
        let end = today + Duration::days(i64::from(horizon_days));
        let mut upcoming = Vec::new();

        for year in today.year()..=end.year() {
            match self.cache.year_events(year).await? {
                YearEvents::Ready(events) => upcoming.extend(
                    events
                        .into_iter()
                        .filter(|event| event.date >= today && event.date <= end),
                ),
                YearEvents::Pending => {
                    log::debug!("Events for {} pending, omitted from upcoming", year)
                }
            }
        }

        sort_events(&mut upcoming);
        Ok(upcoming)
    }

    pub async fn upcoming_events(&self, horizon_days: u32) -> ObservatoryResult<Vec<Event>> {
        self.upcoming_events_at(self.today(), horizon_days).await
    }

    /// First major, locally visible event within the next three days.
    pub async fn next_major_event_at(&self, today: NaiveDate) -> ObservatoryResult<NextMajorEvent> {
        let next_event = self
            .upcoming_events_at(today, NEXT_MAJOR_HORIZON_DAYS)
            .await?
            .into_iter()
            .find(|event| event.is_major() && event.visible_from_observer);
        Ok(NextMajorEvent {
            has_major_within_3_days: next_event.is_some(),
            next_event,
        })
    }

    pub async fn next_major_event(&self) -> ObservatoryResult<NextMajorEvent> {
        self.next_major_event_at(self.today()).await
    }

    pub async fn visibility(&self, date: NaiveDate) -> ObservatoryResult<DailyVisibility> {
        self.cache.visibility(date).await
    }

    pub async fn cleanup_old_visibility(&self, retention_days: u32) -> ObservatoryResult<usize> {
        self.cache.cleanup_old_visibility(retention_days).await
    }

    pub async fn warm_up(&self) -> WarmUpReport {
        self.cache.warm_up().await
    }

    /// Moon phase and well-placed planets for `today`.
    pub async fn morning_brief_at(&self, today: NaiveDate) -> ObservatoryResult<MorningBrief> {
        let snapshot = self.daily_snapshot(self.reference_request(today)).await?;
        let visibility = self.visibility(today).await?;

        let visible_planets = well_placed_planets(&visibility);
        let moon_phase = snapshot.calendar.phase_name.clone();
        let illumination_percent = snapshot.calendar.illumination_percent;

        Ok(MorningBrief {
            date: today,
            title: BRIEF_TITLE.to_string(),
            body: brief_body(&moon_phase, illumination_percent, &visible_planets),
            moon_phase,
            illumination_percent,
            visible_planets,
        })
    }

    pub async fn morning_brief(&self) -> ObservatoryResult<MorningBrief> {
        self.morning_brief_at(self.today()).await
    }

    pub fn job(&self, key: &str) -> Option<JobRecord> {
        self.cache.job(key)
    }
}
