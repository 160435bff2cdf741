//! Planetary opposition detection.

use chrono::{FixedOffset, NaiveDate};
use std::sync::Arc;

use crate::ephemeris::{angular_separation_deg, Body, EphemerisOracle, LongitudeMode};
use crate::error::ObservatoryResult;
use crate::models::{local_midnight, Planet};

/// Maximum distance from 180° separation that still counts as opposition.
pub const OPPOSITION_TOLERANCE_DEG: f64 = 1.0;

#[derive(Clone)]
pub struct OppositionDetector {
    oracle: Arc<dyn EphemerisOracle>,
}

impl OppositionDetector {
    pub fn new(oracle: Arc<dyn EphemerisOracle>) -> Self {
        Self { oracle }
    }

    /// Outer planets within tolerance of opposition at local midnight of `date`.
    pub fn planets_in_opposition(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> ObservatoryResult<Vec<Planet>> {
        let instant = local_midnight(date, offset)?;
        let sun = self
            .oracle
            .position(Body::Sun, instant, LongitudeMode::Geometric)?;

        let mut found = Vec::new();
        for planet in Planet::OPPOSITION_CANDIDATES {
            let position = self
                .oracle
                .position(planet.into(), instant, LongitudeMode::Geometric)?;
            let separation = angular_separation_deg(&position, &sun);
            if (separation - 180.0).abs() < OPPOSITION_TOLERANCE_DEG {
                log::debug!("{} at {:.2}° from the Sun on {}", planet, separation, date);
                found.push(planet);
            }
        }
        Ok(found)
    }
}
