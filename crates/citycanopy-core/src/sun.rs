//! Sun position and scene lighting.
//!
//! The astronomical formula is external ([`SunPositionProvider`]); this
//! module only turns a sun position into a map light.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SurfaceError;
use crate::surface::MapSurface;

/// Sun position in radians.
///
/// `azimuth` follows the SunCalc convention: measured from south, positive
/// toward west. `altitude` is the angle above the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

/// Computes the sun position for a time and place.
pub trait SunPositionProvider {
    fn compute_position(&self, at: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition;
}

impl<F> SunPositionProvider for F
where
    F: Fn(DateTime<Utc>, f64, f64) -> SunPosition,
{
    fn compute_position(&self, at: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition {
        self(at, lat, lon)
    }
}

/// Light color when the sun is high
pub const DAYLIGHT_COLOR: &str = "#ffffff";
/// Light color within 10° of the horizon
pub const GOLDEN_HOUR_COLOR: &str = "#ffd2a1";
/// Light color below the horizon
pub const NIGHT_COLOR: &str = "#6b7a99";

/// Map light derived from a sun position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunLight {
    /// `[radial, azimuthal°, polar°]`; azimuthal is a compass bearing,
    /// polar is measured from straight up
    pub position: [f64; 3],
    /// 0..1
    pub intensity: f64,
    pub color: String,
}

impl SunLight {
    pub fn from_position(sun: SunPosition) -> Self {
        let altitude_deg = sun.altitude.to_degrees();
        let bearing = (sun.azimuth.to_degrees() + 180.0).rem_euclid(360.0);
        let polar = (90.0 - altitude_deg).clamp(0.0, 90.0);

        let (intensity, color) = if altitude_deg <= 0.0 {
            (0.1, NIGHT_COLOR)
        } else if altitude_deg < 10.0 {
            (0.2 + 0.8 * sun.altitude.sin(), GOLDEN_HOUR_COLOR)
        } else {
            (0.2 + 0.8 * sun.altitude.sin(), DAYLIGHT_COLOR)
        };

        Self {
            position: [1.5, bearing, polar],
            intensity: intensity.clamp(0.0, 1.0),
            color: color.to_string(),
        }
    }

    /// Sun is above the horizon
    pub fn is_daylight(&self) -> bool {
        self.position[2] < 90.0
    }
}

/// Compute the sun for `at` at (lat, lon) and push the light to the surface.
pub fn apply_sun_light<S, P>(
    surface: &mut S,
    provider: &P,
    at: DateTime<Utc>,
    lat: f64,
    lon: f64,
) -> Result<SunLight, SurfaceError>
where
    S: MapSurface + ?Sized,
    P: SunPositionProvider + ?Sized,
{
    let sun = provider.compute_position(at, lat, lon);
    let light = SunLight::from_position(sun);
    debug!(
        "Sun at {}: azimuth {:.1}°, altitude {:.1}° -> intensity {:.2}",
        at,
        sun.azimuth.to_degrees(),
        sun.altitude.to_degrees(),
        light.intensity
    );
    surface.set_light(&light)?;
    Ok(light)
}
