//! Ephemeris oracle abstraction.
//!
//! Calculators never talk to a concrete ephemeris; they receive an
//! `Arc<dyn EphemerisOracle>` and ask it for body positions, eclipse maxima
//! and horizon coordinates. [`SiderustEphemeris`] is the built-in
//! implementation over siderust's VSOP87/ELP2000 theories; tests inject
//! scripted doubles.
//!
//! All angles are degrees, distances kilometers and instants UTC. Calls are
//! synchronous and may be slow, so callers run them on the worker pool.

use chrono::{DateTime, Utc};
use qtty::angular::Degrees;
use qtty::length::Kilometers;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ObservatoryResult;
use crate::models::{EclipseKind, ObserverLocation, Planet};

pub mod vsop87;

pub use vsop87::SiderustEphemeris;

/// Bodies the oracle can locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl From<Planet> for Body {
    fn from(planet: Planet) -> Self {
        match planet {
            Planet::Mercury => Body::Mercury,
            Planet::Venus => Body::Venus,
            Planet::Mars => Body::Mars,
            Planet::Jupiter => Body::Jupiter,
            Planet::Saturn => Body::Saturn,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
        };
        f.write_str(name)
    }
}

/// Zero point of ecliptic longitude.
///
/// Passed on every call; the oracle keeps no mode between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongitudeMode {
    /// Lahiri ayanamsha subtracted (calendar math).
    Sidereal,
    /// Tropical, equinox of date (eclipse and visibility math).
    Geometric,
}

/// Geocentric ecliptic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPosition {
    /// In `[0, 360)`.
    pub longitude: Degrees,
    pub latitude: Degrees,
    pub distance: Kilometers,
}

impl EclipticPosition {
    pub fn new(longitude_deg: f64, latitude_deg: f64, distance_km: f64) -> Self {
        Self {
            longitude: Degrees::new(longitude_deg.rem_euclid(360.0)),
            latitude: Degrees::new(latitude_deg),
            distance: Kilometers::new(distance_km),
        }
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude.value()
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude.value()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance.value()
    }
}

/// Apparent horizon coordinates (refraction included).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude: Degrees,
    /// Measured from north through east, in `[0, 360)`.
    pub azimuth: Degrees,
}

impl Horizontal {
    pub fn new(altitude_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            altitude: Degrees::new(altitude_deg),
            azimuth: Degrees::new(azimuth_deg.rem_euclid(360.0)),
        }
    }

    pub fn altitude_deg(&self) -> f64 {
        self.altitude.value()
    }

    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth.value()
    }
}

/// Maximum of an eclipse found by [`EphemerisOracle::eclipse_search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseSearch {
    pub peak: DateTime<Utc>,
    /// Umbral magnitude for lunar eclipses (`<= 0` means penumbral only);
    /// for solar eclipses the Moon/Sun diameter ratio when total, the
    /// covered fraction when partial and `0` when annular.
    pub magnitude: f64,
}

/// Source of raw astronomical positions.
pub trait EphemerisOracle: Send + Sync {
    /// Geocentric ecliptic position of `body` at `instant`.
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        mode: LongitudeMode,
    ) -> ObservatoryResult<EclipticPosition>;

    /// Maximum of the eclipse of `kind` nearest `around`, if one peaks
    /// within one day of it.
    fn eclipse_search(
        &self,
        kind: EclipseKind,
        around: DateTime<Utc>,
    ) -> ObservatoryResult<Option<EclipseSearch>>;

    /// Apparent altitude/azimuth of `body` seen from `observer`.
    fn topocentric_alt_az(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        observer: &ObserverLocation,
    ) -> ObservatoryResult<Horizontal>;
}

/// Angular separation between two ecliptic directions, in degrees.
pub fn angular_separation_deg(a: &EclipticPosition, b: &EclipticPosition) -> f64 {
    let to_vec = |p: &EclipticPosition| {
        let (lon, lat) = (p.longitude_deg().to_radians(), p.latitude_deg().to_radians());
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    };
    let (u, v) = (to_vec(a), to_vec(b));
    let dot = u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
    let cross = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let cross_norm = (cross[0].powi(2) + cross[1].powi(2) + cross[2].powi(2)).sqrt();
    cross_norm.atan2(dot).to_degrees()
}
