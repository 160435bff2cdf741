//! Eclipse records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which body is eclipsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EclipseKind {
    Solar,
    Lunar,
}

impl EclipseKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Lunar => "lunar",
        }
    }
}

impl fmt::Display for EclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eclipse type derived from magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EclipseType {
    Total,
    Partial,
    Annular,
    Penumbral,
}

impl EclipseType {
    /// Classify by magnitude: total at `m >= 1`, partial for `0 < m < 1`,
    /// otherwise penumbral (lunar) or annular (solar).
    pub fn classify(kind: EclipseKind, magnitude: f64) -> Self {
        if magnitude >= 1.0 {
            Self::Total
        } else if magnitude > 0.0 {
            Self::Partial
        } else {
            match kind {
                EclipseKind::Lunar => Self::Penumbral,
                EclipseKind::Solar => Self::Annular,
            }
        }
    }
}

/// Note shown next to the local-visibility flag.
pub fn visibility_note(visible_here: bool) -> &'static str {
    if visible_here {
        "Visible from this location"
    } else {
        "Not visible from this location"
    }
}

/// An eclipse whose maximum falls on `date` (observer's civil calendar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclipseRecord {
    pub date: NaiveDate,
    pub kind: EclipseKind,
    #[serde(rename = "type")]
    pub eclipse_type: EclipseType,
    pub magnitude: f64,
    pub visible_here: bool,
    pub visibility_note: String,
    pub global_visibility: Vec<String>,
    pub peak_instant: DateTime<Utc>,
    pub peak_time_local: String,
}
