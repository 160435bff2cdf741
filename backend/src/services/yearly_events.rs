//! Year-scale event generation.
//!
//! Runs the calendar, eclipse and opposition calculators for every day of a
//! year from the reference observer's point of view and turns each positive
//! detection into an [`Event`]. The whole year either succeeds or fails.

use chrono::{Datelike, FixedOffset, NaiveDate};
use std::sync::Arc;

use super::eclipse::EclipseDetector;
use super::moon_calendar::MoonCalendar;
use super::opposition::OppositionDetector;
use crate::config::ObservatoryConfig;
use crate::ephemeris::EphemerisOracle;
use crate::error::{ObservatoryError, ObservatoryResult};
use crate::models::{
    EclipseKind, EclipseRecord, Event, EventType, MoonEvent, ObserverLocation, Planet, Priority,
};

/// Earliest year the engine will generate events for.
pub const MIN_SUPPORTED_YEAR: i32 = 1800;
/// Latest year the engine will generate events for.
pub const MAX_SUPPORTED_YEAR: i32 = 2200;

/// Reject years outside the supported range.
pub fn validate_year(year: i32) -> ObservatoryResult<()> {
    if (MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ObservatoryError::data(format!(
            "year {} outside supported range {}..={}",
            year, MIN_SUPPORTED_YEAR, MAX_SUPPORTED_YEAR
        )))
    }
}

/// Every civil date of `year`.
pub fn days_of_year(year: i32) -> impl Iterator<Item = NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    first
        .into_iter()
        .flat_map(|d| d.iter_days())
        .take_while(move |d| d.year() == year)
}

fn eclipse_event(record: &EclipseRecord) -> Event {
    let (event_type, title) = match record.kind {
        EclipseKind::Lunar => (EventType::LunarEclipse, "Lunar Eclipse"),
        EclipseKind::Solar => (EventType::SolarEclipse, "Solar Eclipse"),
    };
    Event {
        id: Event::make_id(event_type, record.date),
        date: record.date,
        event_type,
        title: title.to_string(),
        priority: Priority::Major,
        visible_from_observer: record.visible_here,
        visibility_regions: record.global_visibility.clone(),
        peak_time_local: Some(record.peak_time_local.clone()),
        planet: None,
    }
}

/// Produces the event list of a year for a fixed reference observer.
#[derive(Clone)]
pub struct YearlyEventGenerator {
    calendar: MoonCalendar,
    eclipses: EclipseDetector,
    oppositions: OppositionDetector,
    observer: ObserverLocation,
    offset: FixedOffset,
    region_label: String,
}

impl YearlyEventGenerator {
    pub fn new(
        oracle: Arc<dyn EphemerisOracle>,
        config: &ObservatoryConfig,
    ) -> ObservatoryResult<Self> {
        Ok(Self {
            calendar: MoonCalendar::new(oracle.clone()),
            eclipses: EclipseDetector::new(oracle.clone(), config.eclipse.clone()),
            oppositions: OppositionDetector::new(oracle),
            observer: config.observer.location()?,
            offset: config.observer.offset()?,
            region_label: config.observer.region_label.clone(),
        })
    }

    fn local_event(&self, id: String, date: NaiveDate, event_type: EventType, title: String) -> Event {
        Event {
            id,
            date,
            event_type,
            title,
            priority: Priority::Major,
            visible_from_observer: true,
            visibility_regions: vec![self.region_label.clone()],
            peak_time_local: None,
            planet: None,
        }
    }

    /// Events detected on a single date.
    pub fn events_for_day(&self, date: NaiveDate) -> ObservatoryResult<Vec<Event>> {
        let mut events = Vec::new();

        let (solar, lunar) = self.eclipses.detect_both(date, &self.observer, self.offset)?;
        events.extend(lunar.iter().chain(solar.iter()).map(eclipse_event));

        let day = self.calendar.compute_for_date(date, self.offset)?;
        if day.classified_event == MoonEvent::Supermoon {
            events.push(self.local_event(
                Event::make_id(EventType::Supermoon, date),
                date,
                EventType::Supermoon,
                "Supermoon".to_string(),
            ));
        }

        for planet in self.oppositions.planets_in_opposition(date, self.offset)? {
            events.push(self.opposition_event(planet, date));
        }

        Ok(events)
    }

    fn opposition_event(&self, planet: Planet, date: NaiveDate) -> Event {
        let mut event = self.local_event(
            Event::opposition_id(planet.as_str(), date),
            date,
            EventType::PlanetaryOpposition,
            format!("{} Opposition", planet.display_name()),
        );
        event.planet = Some(planet.display_name().to_string());
        event
    }

    /// All events of `year`, in generation order. Fails if any day fails.
    pub fn generate(&self, year: i32) -> ObservatoryResult<Vec<Event>> {
        validate_year(year)?;
        let mut events = Vec::new();
        for date in days_of_year(year) {
            events.extend(self.events_for_day(date)?);
        }
        log::info!("Generated {} events for {}", events.len(), year);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_of_year() {
        assert_eq!(days_of_year(2026).count(), 365);
        assert_eq!(days_of_year(2024).count(), 366);
        assert_eq!(
            days_of_year(2026).last(),
            NaiveDate::from_ymd_opt(2026, 12, 31)
        );
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year(2026).is_ok());
        assert!(validate_year(1800).is_ok());
        assert!(validate_year(1799).unwrap_err().is_data_error());
        assert!(validate_year(2201).unwrap_err().is_data_error());
    }

    #[test]
    fn test_eclipse_event_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let record = EclipseRecord {
            date,
            kind: EclipseKind::Lunar,
            eclipse_type: crate::models::EclipseType::Total,
            magnitude: 1.15,
            visible_here: true,
            visibility_note: "Visible from this location".to_string(),
            global_visibility: vec!["Asia".to_string(), "Americas".to_string()],
            peak_instant: chrono::Utc::now(),
            peak_time_local: "17:03".to_string(),
        };
        let event = eclipse_event(&record);
        assert_eq!(event.id, "lunar_eclipse_2026-03-03");
        assert_eq!(event.title, "Lunar Eclipse");
        assert!(event.is_major());
        assert_eq!(event.visibility_regions, record.global_visibility);
        assert_eq!(event.peak_time_local.as_deref(), Some("17:03"));
    }
}
