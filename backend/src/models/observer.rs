//! Observer location on the Earth's surface.

use serde::{Deserialize, Serialize};

use crate::error::{ObservatoryError, ObservatoryResult};

/// Geographic observer position (degrees, east-positive longitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Height above sea level in meters.
    #[serde(default)]
    pub elevation_m: f64,
}

impl ObserverLocation {
    /// Create a validated location.
    pub fn new(latitude: f64, longitude: f64) -> ObservatoryResult<Self> {
        let location = Self {
            latitude,
            longitude,
            elevation_m: 0.0,
        };
        location.validate()?;
        Ok(location)
    }

    /// The Earth's centre projected on the equator/prime meridian.
    pub const fn geocentric() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            elevation_m: 0.0,
        }
    }

    /// Reject out-of-range or non-finite coordinates.
    pub fn validate(&self) -> ObservatoryResult<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ObservatoryError::data(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ObservatoryError::data(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl Default for ObserverLocation {
    fn default() -> Self {
        Self::geocentric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_location() {
        let ahmedabad = ObserverLocation::new(23.0225, 72.5714).unwrap();
        assert_eq!(ahmedabad.elevation_m, 0.0);
    }

    #[test]
    fn test_invalid_location() {
        assert!(ObserverLocation::new(91.0, 0.0).is_err());
        assert!(ObserverLocation::new(0.0, -180.5).is_err());
        assert!(ObserverLocation::new(f64::NAN, 0.0)
            .unwrap_err()
            .is_data_error());
    }
}
