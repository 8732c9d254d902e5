//! Regions targeted by area placement and deletion.

use citycanopy_core::{GeometryError, GeometryLib, LngLat};
use geo::Polygon;

use crate::shape::TreeShape;

/// A brush stroke or a user-drawn polygon.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementArea {
    /// Shape of radius `radius_m` meters around `center`
    Brush {
        center: LngLat,
        radius_m: f64,
        shape: TreeShape,
    },
    /// Arbitrary polygon in geographic degrees
    Polygon(Polygon<f64>),
}

impl PlacementArea {
    pub fn brush(center: LngLat, radius_m: f64, shape: TreeShape) -> Self {
        PlacementArea::Brush {
            center,
            radius_m,
            shape,
        }
    }

    /// Resolve to a concrete polygon
    pub fn to_polygon<G: GeometryLib + ?Sized>(
        &self,
        geometry: &G,
    ) -> Result<Polygon<f64>, GeometryError> {
        match self {
            PlacementArea::Brush {
                center,
                radius_m,
                shape,
            } => shape.polygon(geometry, *center, *radius_m),
            PlacementArea::Polygon(polygon) => Ok(polygon.clone()),
        }
    }
}

impl From<Polygon<f64>> for PlacementArea {
    fn from(polygon: Polygon<f64>) -> Self {
        PlacementArea::Polygon(polygon)
    }
}
