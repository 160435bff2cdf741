//! Ephemeris backed by siderust's VSOP87 and ELP2000-82B theories.
//!
//! siderust reports geocentric positions in the mean ecliptic of J2000 and
//! topocentric altitudes without atmospheric refraction. This module adds
//! precession to the equinox of date, the Lahiri ayanamsha, refraction, and
//! the shadow geometry that turns a syzygy into an eclipse magnitude.

use chrono::{DateTime, Duration, Utc};
use siderust::bodies::solar_system::{Jupiter, Mars, Mercury, Moon, Saturn, Sun, Venus};
use siderust::coordinates::cartesian;
use siderust::coordinates::centers::{Geocentric, Geodetic, Heliocentric};
use siderust::coordinates::frames::{self, ECEF};
use siderust::coordinates::transform::TransformCenter;
use siderust::ephemeris::{Ephemeris, Vsop87Ephemeris};
use siderust::qtty::{AstronomicalUnit, Days, Degree, Degrees, Meters};
use siderust::time::{Interval, JulianDate, ModifiedJulianDate, MJD};
use siderust::{find_phase_events, AltitudeProvider, AzimuthProvider, PhaseKind, PhaseSearchOpts};

use super::{
    angular_separation_deg, Body, EclipseSearch, EclipticPosition, EphemerisOracle, Horizontal,
    LongitudeMode,
};
use crate::error::{ObservatoryError, ObservatoryResult};
use crate::models::{EclipseKind, ObserverLocation};

const AU_KM: f64 = 149_597_870.7;
const EARTH_RADIUS_KM: f64 = 6378.137;
const SUN_RADIUS_KM: f64 = 696_000.0;
const MOON_RADIUS_KM: f64 = 1737.4;

/// Atmospheric enlargement of the Earth's shadow.
const DANJON_ENLARGEMENT: f64 = 1.02;

/// Lahiri ayanamsha at J2000.0.
const LAHIRI_J2000_DEG: f64 = 23.853;

/// Eclipses are only reported within this distance of the search instant.
const SEARCH_WINDOW_DAYS: f64 = 1.0;

/// Half-width of the bracket around the syzygy searched for the maximum.
const PEAK_BRACKET_DAYS: f64 = 0.2;

const GOLDEN_ITERATIONS: usize = 32;

/// Built-in [`EphemerisOracle`]; needs no data files at runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiderustEphemeris;

impl SiderustEphemeris {
    pub fn new() -> Self {
        Self
    }

    /// Lahiri ayanamsha for `t` Julian centuries since J2000.
    pub fn lahiri_ayanamsha_deg(t: f64) -> f64 {
        LAHIRI_J2000_DEG + general_precession_deg(t)
    }

    /// Instant of the full (lunar) or new (solar) moon nearest `around`,
    /// when one falls inside the search reach.
    fn nearest_syzygy(
        &self,
        kind: EclipseKind,
        around: DateTime<Utc>,
    ) -> ObservatoryResult<Option<DateTime<Utc>>> {
        let wanted = match kind {
            EclipseKind::Lunar => PhaseKind::FullMoon,
            EclipseKind::Solar => PhaseKind::NewMoon,
        };
        let center: ModifiedJulianDate = julian_date(around)?.to::<MJD>();
        let reach = SEARCH_WINDOW_DAYS + PEAK_BRACKET_DAYS;
        let window = Interval::new(center + Days::new(-reach), center + Days::new(reach));

        Ok(
            find_phase_events::<Vsop87Ephemeris>(window, PhaseSearchOpts::default())
                .into_iter()
                .filter(|event| event.kind == wanted)
                .filter_map(|event| event.mjd.to_chrono())
                .min_by_key(|instant| (*instant - around).num_milliseconds().abs()),
        )
    }

    /// Distance of the Moon's centre from the shadow axis (lunar) or from
    /// the Sun's centre (solar), geocentric.
    fn eclipse_offset_deg(&self, kind: EclipseKind, instant: DateTime<Utc>) -> ObservatoryResult<f64> {
        let sun = self.position(Body::Sun, instant, LongitudeMode::Geometric)?;
        let moon = self.position(Body::Moon, instant, LongitudeMode::Geometric)?;
        let separation = angular_separation_deg(&sun, &moon);
        Ok(match kind {
            EclipseKind::Lunar => 180.0 - separation,
            EclipseKind::Solar => separation,
        })
    }

    /// Golden-section minimisation of the eclipse offset over `[lo, hi]`.
    ///
    /// The syzygy is a conjunction in longitude; the eclipse maximum is the
    /// closest approach and can lie up to an hour or so away from it.
    fn minimise_offset(
        &self,
        kind: EclipseKind,
        lo: DateTime<Utc>,
        hi: DateTime<Utc>,
    ) -> ObservatoryResult<DateTime<Utc>> {
        let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
        let (mut a, mut b) = (0.0_f64, (hi - lo).num_milliseconds() as f64 / 86_400_000.0);
        let at = |x: f64| lo + days(x);

        let mut c = b - inv_phi * (b - a);
        let mut d = a + inv_phi * (b - a);
        let mut fc = self.eclipse_offset_deg(kind, at(c))?;
        let mut fd = self.eclipse_offset_deg(kind, at(d))?;
        for _ in 0..GOLDEN_ITERATIONS {
            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - inv_phi * (b - a);
                fc = self.eclipse_offset_deg(kind, at(c))?;
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + inv_phi * (b - a);
                fd = self.eclipse_offset_deg(kind, at(d))?;
            }
        }
        Ok(at((a + b) / 2.0))
    }

    fn lunar_magnitude(&self, peak: DateTime<Utc>) -> ObservatoryResult<Option<f64>> {
        let sun = self.position(Body::Sun, peak, LongitudeMode::Geometric)?;
        let moon = self.position(Body::Moon, peak, LongitudeMode::Geometric)?;
        let (penumbral_r, umbral_r) = shadow_radii_deg(sun.distance_km(), moon.distance_km());
        let moon_r = asin_deg(MOON_RADIUS_KM / moon.distance_km());
        let offset = 180.0 - angular_separation_deg(&sun, &moon);

        let penumbral_magnitude = (penumbral_r - offset + moon_r) / (2.0 * moon_r);
        if penumbral_magnitude <= 0.0 {
            return Ok(None);
        }
        Ok(Some((umbral_r - offset + moon_r) / (2.0 * moon_r)))
    }

    fn solar_magnitude(&self, peak: DateTime<Utc>) -> ObservatoryResult<Option<f64>> {
        let sun = self.position(Body::Sun, peak, LongitudeMode::Geometric)?;
        let moon = self.position(Body::Moon, peak, LongitudeMode::Geometric)?;
        let pi_moon = asin_deg(EARTH_RADIUS_KM / moon.distance_km());
        let pi_sun = asin_deg(EARTH_RADIUS_KM / sun.distance_km());
        let sun_r = asin_deg(SUN_RADIUS_KM / sun.distance_km());
        // Seen from the sub-lunar point, one Earth radius closer
        let moon_r = asin_deg(MOON_RADIUS_KM / (moon.distance_km() - EARTH_RADIUS_KM));
        let separation = angular_separation_deg(&sun, &moon);

        let partial_limit = pi_moon - pi_sun + sun_r + moon_r;
        if separation >= partial_limit {
            return Ok(None);
        }
        let central = separation < pi_moon - pi_sun;
        let magnitude = if central && moon_r >= sun_r {
            moon_r / sun_r
        } else if central {
            0.0
        } else {
            ((partial_limit - separation) / (2.0 * sun_r)).clamp(1e-3, 0.999)
        };
        Ok(Some(magnitude))
    }
}

impl EphemerisOracle for SiderustEphemeris {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        mode: LongitudeMode,
    ) -> ObservatoryResult<EclipticPosition> {
        let jd = julian_date(instant)?;
        let (lon_j2000, lat, dist) = ecliptic_j2000(body, jd);
        let lon = match mode {
            LongitudeMode::Geometric => lon_j2000 + general_precession_deg(jd.julian_centuries()),
            // Of-date longitude minus an ayanamsha that precesses with it
            LongitudeMode::Sidereal => lon_j2000 - LAHIRI_J2000_DEG,
        };
        if !(lon.is_finite() && lat.is_finite() && dist.is_finite()) {
            return Err(ObservatoryError::oracle(format!(
                "non-finite position for {} at {}",
                body, instant
            )));
        }
        Ok(EclipticPosition::new(lon, lat, dist))
    }

    fn eclipse_search(
        &self,
        kind: EclipseKind,
        around: DateTime<Utc>,
    ) -> ObservatoryResult<Option<EclipseSearch>> {
        let Some(syzygy) = self.nearest_syzygy(kind, around)? else {
            return Ok(None);
        };

        let bracket = days(PEAK_BRACKET_DAYS);
        let peak = self.minimise_offset(kind, syzygy - bracket, syzygy + bracket)?;
        if (peak - around).abs() > days(SEARCH_WINDOW_DAYS) {
            return Ok(None);
        }

        let magnitude = match kind {
            EclipseKind::Lunar => self.lunar_magnitude(peak)?,
            EclipseKind::Solar => self.solar_magnitude(peak)?,
        };
        Ok(magnitude.map(|magnitude| EclipseSearch { peak, magnitude }))
    }

    fn topocentric_alt_az(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        observer: &ObserverLocation,
    ) -> ObservatoryResult<Horizontal> {
        observer.validate()?;
        let mjd: ModifiedJulianDate = julian_date(instant)?.to::<MJD>();
        let site = Geodetic::<ECEF>::new(
            Degrees::new(observer.longitude),
            Degrees::new(observer.latitude),
            Meters::new(observer.elevation_m),
        );

        let (true_alt, azimuth) = match body {
            Body::Sun => horizon(&Sun, &site, mjd),
            Body::Moon => horizon(&Moon, &site, mjd),
            Body::Mercury => horizon(&Mercury, &site, mjd),
            Body::Venus => horizon(&Venus, &site, mjd),
            Body::Mars => horizon(&Mars, &site, mjd),
            Body::Jupiter => horizon(&Jupiter, &site, mjd),
            Body::Saturn => horizon(&Saturn, &site, mjd),
        };
        let apparent_alt = true_alt + refraction_deg(true_alt);

        if !apparent_alt.is_finite() || !azimuth.is_finite() {
            return Err(ObservatoryError::oracle(format!(
                "non-finite horizon coordinates for {} at {}",
                body, instant
            )));
        }
        Ok(Horizontal::new(apparent_alt, azimuth))
    }
}

fn julian_date(instant: DateTime<Utc>) -> ObservatoryResult<JulianDate> {
    JulianDate::try_from_chrono(instant).map_err(|e| {
        ObservatoryError::oracle(format!("cannot convert {} to TT: {}", instant, e))
    })
}

/// Geocentric longitude (deg), latitude (deg) and distance (km), mean
/// ecliptic of J2000.
fn ecliptic_j2000(body: Body, jd: JulianDate) -> (f64, f64, f64) {
    match body {
        Body::Sun => {
            // The Earth seen from the Sun, reversed
            let earth = Vsop87Ephemeris::earth_heliocentric(jd).to_spherical();
            (
                earth.azimuth.value() + 180.0,
                -earth.polar.value(),
                earth.distance.value() * AU_KM,
            )
        }
        Body::Moon => {
            let moon = Vsop87Ephemeris::moon_geocentric(jd).to_spherical();
            (moon.azimuth.value(), moon.polar.value(), moon.distance.value())
        }
        Body::Mercury => planet_geocentric(Mercury::vsop87a(jd), jd),
        Body::Venus => planet_geocentric(Venus::vsop87a(jd), jd),
        Body::Mars => planet_geocentric(Mars::vsop87a(jd), jd),
        Body::Jupiter => planet_geocentric(Jupiter::vsop87a(jd), jd),
        Body::Saturn => planet_geocentric(Saturn::vsop87a(jd), jd),
    }
}

fn planet_geocentric(
    heliocentric: cartesian::Position<Heliocentric, frames::EclipticMeanJ2000, AstronomicalUnit>,
    jd: JulianDate,
) -> (f64, f64, f64) {
    let geocentric: cartesian::Position<Geocentric, frames::EclipticMeanJ2000, AstronomicalUnit> =
        heliocentric.to_center(jd);
    let sph = geocentric.to_spherical();
    (
        sph.azimuth.value(),
        sph.polar.value(),
        sph.distance.value() * AU_KM,
    )
}

/// True topocentric altitude and azimuth, degrees.
fn horizon<T>(target: &T, site: &Geodetic<ECEF>, mjd: ModifiedJulianDate) -> (f64, f64)
where
    T: AltitudeProvider + AzimuthProvider,
{
    (
        target.altitude_at(site, mjd).to::<Degree>().value(),
        target.azimuth_at(site, mjd).to::<Degree>().value(),
    )
}

fn days(d: f64) -> Duration {
    Duration::milliseconds((d * 86_400_000.0).round() as i64)
}

fn asin_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin().to_degrees()
}

/// General precession in longitude since J2000 (IAU 2006, truncated).
fn general_precession_deg(t: f64) -> f64 {
    (5028.796195 * t + 1.1054348 * t * t) / 3600.0
}

/// Refraction to add to a true altitude (Saemundsson), zero well below the horizon.
fn refraction_deg(true_alt: f64) -> f64 {
    if true_alt < -2.0 {
        return 0.0;
    }
    let arcmin = 1.02 / (true_alt + 10.3 / (true_alt + 5.11)).to_radians().tan();
    (arcmin / 60.0).max(0.0)
}

/// Penumbral and umbral shadow radii at the Moon's distance, degrees.
fn shadow_radii_deg(sun_dist_km: f64, moon_dist_km: f64) -> (f64, f64) {
    let pi_sun = (EARTH_RADIUS_KM / sun_dist_km).asin();
    let pi_moon = (EARTH_RADIUS_KM / moon_dist_km).asin();
    let s_sun = (SUN_RADIUS_KM / sun_dist_km).asin();

    let penumbral = DANJON_ENLARGEMENT * (pi_moon + pi_sun + s_sun);
    let umbral = DANJON_ENLARGEMENT * (pi_moon + pi_sun - s_sun);
    (penumbral.to_degrees(), umbral.to_degrees())
}
