//! Nightly planet-visibility records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Naked-eye planets covered by the visibility engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Planet {
    pub const ALL: [Planet; 5] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
    ];

    /// Superior planets checked for opposition.
    pub const OPPOSITION_CANDIDATES: [Planet; 3] = [Planet::Mars, Planet::Jupiter, Planet::Saturn];

    /// Lowercase key used in payloads and ids.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mercury => "mercury",
            Self::Venus => "venus",
            Self::Mars => "mars",
            Self::Jupiter => "jupiter",
            Self::Saturn => "saturn",
        }
    }

    /// Capitalized name used in titles.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
        }
    }

    /// Typical apparent visual magnitude.
    pub const fn catalog_magnitude(&self) -> f64 {
        match self {
            Self::Mercury => -0.4,
            Self::Venus => -4.0,
            Self::Mars => -1.5,
            Self::Jupiter => -2.7,
            Self::Saturn => 0.5,
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Planet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Planet::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown planet: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Poor,
    Good,
    Excellent,
}

impl Rating {
    /// Worth mentioning in the morning brief.
    pub fn is_well_placed(&self) -> bool {
        matches!(self, Self::Good | Self::Excellent)
    }
}

/// One planet's visibility over one local day. Times are local `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRecord {
    pub visible: bool,
    pub rise: Option<String>,
    pub set: Option<String>,
    pub transit: Option<String>,
    pub max_altitude: Option<f64>,
    pub azimuth: Option<f64>,
    pub magnitude: f64,
    pub visible_after_sunset: bool,
    pub best_view_window: Option<String>,
    #[serde(rename = "visibility_rating")]
    pub rating: Rating,
}

impl VisibilityRecord {
    /// Record for a planet that never clears the horizon.
    pub fn never_rises(planet: Planet) -> Self {
        Self {
            visible: false,
            rise: None,
            set: None,
            transit: None,
            max_altitude: None,
            azimuth: None,
            magnitude: planet.catalog_magnitude(),
            visible_after_sunset: false,
            best_view_window: None,
            rating: Rating::Poor,
        }
    }
}

/// Planet key (`"mars"`) -> record, for one date.
pub type DailyVisibility = BTreeMap<String, VisibilityRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_parsing() {
        assert_eq!("Mars".parse::<Planet>().unwrap(), Planet::Mars);
        assert!("pluto".parse::<Planet>().is_err());
    }

    #[test]
    fn test_never_rises_record() {
        let record = VisibilityRecord::never_rises(Planet::Venus);
        assert!(!record.visible);
        assert_eq!(record.rating, Rating::Poor);
        assert_eq!(record.magnitude, -4.0);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["visibility_rating"], "Poor");
        assert!(json["rise"].is_null());
    }
}
