//! Geometry library seam.
//!
//! The engines never do polygon math themselves; they call a [`GeometryLib`].
//! [`GeoGeometry`] is the production implementation on top of the `geo`
//! crate.

use geo::{BoundingRect, Centroid, ChamberlainDuquetteArea, Coord, Intersects, LineString, Polygon};
use std::f64::consts::PI;

use crate::error::GeometryError;
use crate::feature::distinct_vertex_count;
use crate::types::{GeoBounds, LngLat};

/// Polygon operations consumed by placement, deletion and export.
pub trait GeometryLib {
    /// Point lies inside the polygon or on its boundary
    fn point_in_polygon(&self, point: LngLat, polygon: &Polygon<f64>) -> bool;

    /// Circle of `radius_m` meters around `center`
    fn buffer_point(&self, center: LngLat, radius_m: f64) -> Polygon<f64>;

    /// Bounding box of the polygon's exterior
    fn bbox_of_polygon(&self, polygon: &Polygon<f64>) -> Option<GeoBounds>;

    /// Area in square meters
    fn polygon_area(&self, polygon: &Polygon<f64>) -> f64;

    /// Area-weighted centroid
    fn centroid(&self, polygon: &Polygon<f64>) -> Option<LngLat>;

    /// Great-circle distance in meters
    fn distance_meters(&self, a: LngLat, b: LngLat) -> f64;

    /// Closed polygon from an open or closed vertex list
    fn make_polygon(&self, vertices: &[LngLat]) -> Result<Polygon<f64>, GeometryError>;
}

/// `geo`-backed geometry library.
#[derive(Debug, Clone, Copy)]
pub struct GeoGeometry {
    /// Number of segments used to approximate buffered circles
    pub circle_steps: usize,
}

impl GeoGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circle_steps(circle_steps: usize) -> Self {
        Self {
            circle_steps: circle_steps.max(3),
        }
    }
}

impl Default for GeoGeometry {
    fn default() -> Self {
        Self { circle_steps: 32 }
    }
}

impl GeometryLib for GeoGeometry {
    fn point_in_polygon(&self, point: LngLat, polygon: &Polygon<f64>) -> bool {
        polygon.intersects(&geo::Point::from(point))
    }

    fn buffer_point(&self, center: LngLat, radius_m: f64) -> Polygon<f64> {
        let steps = self.circle_steps.max(3);
        let mut coords: Vec<Coord<f64>> = (0..steps)
            .map(|i| {
                let theta = 2.0 * PI * (i as f64) / (steps as f64);
                center
                    .offset_meters(radius_m * theta.cos(), radius_m * theta.sin())
                    .into()
            })
            .collect();
        coords.push(coords[0]);
        Polygon::new(LineString::from(coords), vec![])
    }

    fn bbox_of_polygon(&self, polygon: &Polygon<f64>) -> Option<GeoBounds> {
        polygon
            .bounding_rect()
            .map(|r| GeoBounds::new(r.min().x, r.min().y, r.max().x, r.max().y))
    }

    fn polygon_area(&self, polygon: &Polygon<f64>) -> f64 {
        polygon.chamberlain_duquette_unsigned_area()
    }

    fn centroid(&self, polygon: &Polygon<f64>) -> Option<LngLat> {
        polygon.centroid().map(LngLat::from)
    }

    #[allow(deprecated)]
    fn distance_meters(&self, a: LngLat, b: LngLat) -> f64 {
        use geo::HaversineDistance;
        geo::Point::from(a).haversine_distance(&geo::Point::from(b))
    }

    fn make_polygon(&self, vertices: &[LngLat]) -> Result<Polygon<f64>, GeometryError> {
        if let Some(bad) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(GeometryError::NonFinite {
                what: format!("polygon vertex {bad}"),
            });
        }
        let mut coords: Vec<Coord<f64>> = vertices.iter().map(|&v| v.into()).collect();
        if coords.len() > 1 && coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        let ring = LineString::from(coords);
        let distinct = distinct_vertex_count(&ring);
        if distinct < 3 {
            return Err(GeometryError::DegenerateRing { vertices: distinct });
        }
        Ok(Polygon::new(ring, vec![]))
    }
}
