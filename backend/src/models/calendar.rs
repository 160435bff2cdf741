//! Lunar-calendar records and the fixed naming tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::eclipse::EclipseRecord;
use super::observer::ObserverLocation;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588;

/// Angular width of one tithi.
pub const TITHI_SPAN_DEG: f64 = 12.0;

const TITHI_NAMES_SHUKLA: [&str; 15] = [
    "Shukla Pratipada",
    "Shukla Dwitiya",
    "Shukla Tritiya",
    "Shukla Chaturthi",
    "Shukla Panchami",
    "Shukla Shashthi",
    "Shukla Saptami",
    "Shukla Ashtami",
    "Shukla Navami",
    "Shukla Dashami",
    "Shukla Ekadashi",
    "Shukla Dwadashi",
    "Shukla Trayodashi",
    "Shukla Chaturdashi",
    "Purnima",
];

const TITHI_NAMES_KRISHNA: [&str; 15] = [
    "Krishna Pratipada",
    "Krishna Dwitiya",
    "Krishna Tritiya",
    "Krishna Chaturthi",
    "Krishna Panchami",
    "Krishna Shashthi",
    "Krishna Saptami",
    "Krishna Ashtami",
    "Krishna Navami",
    "Krishna Dashami",
    "Krishna Ekadashi",
    "Krishna Dwadashi",
    "Krishna Trayodashi",
    "Krishna Chaturdashi",
    "Amavasya",
];

/// The 27 lunar mansions, 13°20' each starting at sidereal 0°.
pub const NAKSHATRAS: [&str; 27] = [
    "Ashwini",
    "Bharani",
    "Krittika",
    "Rohini",
    "Mrigashirsha",
    "Ardra",
    "Punarvasu",
    "Pushya",
    "Ashlesha",
    "Magha",
    "Purva Phalguni",
    "Uttara Phalguni",
    "Hasta",
    "Chitra",
    "Swati",
    "Vishakha",
    "Anuradha",
    "Jyeshtha",
    "Mula",
    "Purva Ashadha",
    "Uttara Ashadha",
    "Shravana",
    "Dhanishta",
    "Shatabhisha",
    "Purva Bhadrapada",
    "Uttara Bhadrapada",
    "Revati",
];

/// The 12 sidereal signs.
pub const RASHIS: [&str; 12] = [
    "Mesha (Aries)",
    "Vrishabha (Taurus)",
    "Mithuna (Gemini)",
    "Karka (Cancer)",
    "Simha (Leo)",
    "Kanya (Virgo)",
    "Tula (Libra)",
    "Vrishchika (Scorpio)",
    "Dhanu (Sagittarius)",
    "Makara (Capricorn)",
    "Kumbha (Aquarius)",
    "Meena (Pisces)",
];

/// Upper age bounds (days) of the eight named phases; past the last bound
/// the cycle wraps back to "New Moon".
const PHASE_BINS: [(f64, &str); 8] = [
    (1.84566, "New Moon"),
    (5.53699, "Waxing Crescent"),
    (9.22831, "First Quarter"),
    (12.91963, "Waxing Gibbous"),
    (16.61096, "Full Moon"),
    (20.30228, "Waning Gibbous"),
    (23.99361, "Last Quarter"),
    (27.68493, "Waning Crescent"),
];

/// Lunar fortnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Paksha {
    /// Waxing half, tithis 1..=15.
    Shukla,
    /// Waning half, tithis 16..=30.
    Krishna,
}

impl Paksha {
    pub fn from_tithi(tithi_index: u8) -> Self {
        if tithi_index <= 15 {
            Self::Shukla
        } else {
            Self::Krishna
        }
    }
}

impl fmt::Display for Paksha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shukla => f.write_str("Shukla"),
            Self::Krishna => f.write_str("Krishna"),
        }
    }
}

/// Perigee/apogee full-moon classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoonEvent {
    Supermoon,
    Micromoon,
    None,
}

/// Tithi name for an index in `1..=30`.
pub fn tithi_name(tithi_index: u8) -> &'static str {
    let index = tithi_index.clamp(1, 30) as usize;
    if index <= 15 {
        TITHI_NAMES_SHUKLA[index - 1]
    } else {
        TITHI_NAMES_KRISHNA[index - 16]
    }
}

/// Nakshatra containing a sidereal longitude.
pub fn nakshatra_for(longitude_deg: f64) -> &'static str {
    let lon = longitude_deg.rem_euclid(360.0);
    NAKSHATRAS[(lon / (360.0 / 27.0)) as usize % 27]
}

/// Rashi containing a sidereal longitude.
pub fn rashi_for(longitude_deg: f64) -> &'static str {
    let lon = longitude_deg.rem_euclid(360.0);
    RASHIS[(lon / 30.0) as usize % 12]
}

/// Eight-bin phase name for a moon age in days.
pub fn phase_name(moon_age_days: f64) -> &'static str {
    PHASE_BINS
        .iter()
        .find(|(upper, _)| moon_age_days < *upper)
        .map(|(_, name)| *name)
        .unwrap_or("New Moon")
}

/// English weekday name.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    use chrono::Datelike;
    match date.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

/// Position of one civil day in the lunar calendar.
///
/// The tithi fields and `illumination_percent`/`moon_age_days` describe the
/// canonical instant (06:00 local by default). The `realtime_*` fields
/// describe the exact time-of-day that was asked for and may differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub tithi_index: u8,
    pub paksha: Paksha,
    pub tithi_name: String,
    pub phase_name: String,
    pub phase_angle_deg: f64,
    pub illumination_percent: f64,
    pub moon_age_days: f64,
    pub realtime_illumination_percent: f64,
    pub realtime_moon_age_days: f64,
    pub distance_km: f64,
    pub moon_latitude_deg: f64,
    pub nakshatra: String,
    pub rashi: String,
    pub classified_event: MoonEvent,
}

/// Everything the `/moon` view shows for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub location: ObserverLocation,
    pub calendar: CalendarDay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar_eclipse: Option<EclipseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunar_eclipse: Option<EclipseRecord>,
    pub note: String,
}
