//! Local metric frame for mesh coordinates.

use citycanopy_core::feature::FeatureExt;
use citycanopy_core::{meters_per_degree_lng, GeoBounds, LngLat, METERS_PER_DEGREE};
use geojson::Feature;

/// Equirectangular projection around a reference point.
///
/// Output is in meters, x east and y north of the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    pub origin: LngLat,
    lng_scale: f64,
}

impl LocalProjection {
    pub fn new(origin: LngLat) -> Self {
        Self {
            origin,
            lng_scale: meters_per_degree_lng(origin.lat),
        }
    }

    /// Centered on the bounding box of every trunk footprint
    pub fn from_trunks(trunks: &[Feature]) -> Option<Self> {
        let mut bounds: Option<GeoBounds> = None;
        for footprint in trunks.iter().filter_map(|t| t.footprint().ok()) {
            for c in footprint.exterior().0.iter() {
                let p = LngLat::from(*c);
                match bounds.as_mut() {
                    Some(b) => b.extend(p),
                    None => bounds = GeoBounds::from_points([p]),
                }
            }
        }
        bounds.map(|b| Self::new(b.center()))
    }

    pub fn project(&self, p: LngLat) -> (f64, f64) {
        (
            (p.lng - self.origin.lng) * self.lng_scale,
            (p.lat - self.origin.lat) * METERS_PER_DEGREE,
        )
    }
}
