//! Supermoon / micromoon classification.

use crate::models::{MoonEvent, Paksha};

/// Perigee threshold for a supermoon.
pub const SUPERMOON_MAX_DISTANCE_KM: f64 = 360_000.0;

/// Apogee threshold for a micromoon.
pub const MICROMOON_MIN_DISTANCE_KM: f64 = 405_000.0;

/// Classify a day's Moon. Only the Purnima (Shukla 15) day can classify;
/// perigee or apogee at new moon never does.
///
/// `_illumination_percent` is accepted for parity with the calendar record but
/// does not gate the result: the tithi already pins the full-moon day.
pub fn classify_moon_event(
    _illumination_percent: f64,
    distance_km: f64,
    tithi_index: u8,
    paksha: Paksha,
) -> MoonEvent {
    let is_purnima = tithi_index == 15 && paksha == Paksha::Shukla;
    if !is_purnima {
        return MoonEvent::None;
    }
    if distance_km <= SUPERMOON_MAX_DISTANCE_KM {
        MoonEvent::Supermoon
    } else if distance_km >= MICROMOON_MIN_DISTANCE_KM {
        MoonEvent::Micromoon
    } else {
        MoonEvent::None
    }
}
