//! Data Transfer Objects for the HTTP API.
//!
//! Response payloads are mostly the domain types themselves (they already
//! derive Serialize); this module holds query strings and the few wrappers
//! that add request metadata.

use serde::{Deserialize, Serialize};

use crate::models::Event;
use crate::services::moon_calendar::{CalendarRequest, CANONICAL_HOUR, DEFAULT_UTC_OFFSET_HOURS};

pub use crate::services::job_tracker::JobRecord;
pub use crate::services::observatory::{MorningBrief, NextMajorEvent};

/// Query parameters for `GET /v1/moon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonQuery {
    /// Date as `YYYY-MM-DD` or `YYYY/MM/DD`
    #[serde(alias = "d")]
    pub date: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub minute: Option<u32>,
    /// UTC offset in hours (default +5.5)
    #[serde(default)]
    pub utc_offset: Option<f64>,
    /// Evaluate the tithi at 06:00 local (default true)
    #[serde(default)]
    pub sunrise: Option<bool>,
}

impl From<MoonQuery> for CalendarRequest {
    fn from(query: MoonQuery) -> Self {
        CalendarRequest {
            date: query.date,
            hour: query.hour.unwrap_or(CANONICAL_HOUR),
            minute: query.minute.unwrap_or(0),
            utc_offset_hours: query.utc_offset.unwrap_or(DEFAULT_UTC_OFFSET_HOURS),
            latitude: query.lat,
            longitude: query.lon,
            calculate_at_sunrise: query.sunrise.unwrap_or(true),
        }
    }
}

/// Query parameters for `GET /v1/events/upcoming`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpcomingQuery {
    /// Look-ahead in days (default 30)
    #[serde(default)]
    pub days: Option<u32>,
}

/// Query parameters for `GET /v1/visibility`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisibilityQuery {
    /// Date as `YYYY-MM-DD` (default today)
    #[serde(default)]
    pub date: Option<String>,
}

/// Whether a year's events exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearStatus {
    Ready,
    Pending,
}

/// Response for `GET /v1/events/year/{year}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearEventsResponse {
    pub year: i32,
    pub status: YearStatus,
    pub events: Vec<Event>,
    /// Job to poll while pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_key: Option<String>,
}

/// Response for `GET /v1/events/upcoming`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingResponse {
    pub days: u32,
    pub total: usize,
    pub events: Vec<Event>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Persistent cache status
    pub cache: String,
}
