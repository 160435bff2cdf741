//! Sky events generated per year.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time::iso_date;

/// Kind of sky event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    LunarEclipse,
    SolarEclipse,
    Supermoon,
    PlanetaryOpposition,
}

impl EventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LunarEclipse => "lunar_eclipse",
            Self::SolarEclipse => "solar_eclipse",
            Self::Supermoon => "supermoon",
            Self::PlanetaryOpposition => "planetary_opposition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Major,
    Minor,
}

/// A dated sky event. Identity is `id`, a pure function of type, date and
/// (for oppositions) planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub priority: Priority,
    pub visible_from_observer: bool,
    pub visibility_regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_time_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
}

impl Event {
    /// Deterministic id for a non-planet event.
    pub fn make_id(event_type: EventType, date: NaiveDate) -> String {
        format!("{}_{}", event_type.as_str(), iso_date(date))
    }

    /// Deterministic id for a planetary opposition (`mars_opposition_2027-02-19`).
    pub fn opposition_id(planet: &str, date: NaiveDate) -> String {
        format!("{}_opposition_{}", planet.to_lowercase(), iso_date(date))
    }

    pub fn is_major(&self) -> bool {
        self.priority == Priority::Major
    }
}

/// Sort by date, then id, so equal-date events have a stable order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}
