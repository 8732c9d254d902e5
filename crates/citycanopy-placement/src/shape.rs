//! Footprint shapes for tree parts and brushes.

use citycanopy_core::{GeometryError, GeometryLib, LngLat};
use geo::Polygon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outline used for trunks, canopies and brush areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeShape {
    /// Buffered circle of radius `size`
    #[default]
    Circle,
    /// Axis-aligned square of side `2 × size`
    Square,
    /// Equilateral triangle, apex up, circumradius `size`
    Triangle,
}

impl TreeShape {
    /// Footprint centered on `center` with characteristic size in meters
    pub fn polygon<G: GeometryLib + ?Sized>(
        self,
        geometry: &G,
        center: LngLat,
        size: f64,
    ) -> Result<Polygon<f64>, GeometryError> {
        if !center.is_finite() || !size.is_finite() {
            return Err(GeometryError::NonFinite {
                what: format!("{self} footprint at {center}"),
            });
        }

        match self {
            TreeShape::Circle => Ok(geometry.buffer_point(center, size)),
            TreeShape::Square => geometry.make_polygon(&[
                center.offset_meters(-size, -size),
                center.offset_meters(size, -size),
                center.offset_meters(size, size),
                center.offset_meters(-size, size),
            ]),
            TreeShape::Triangle => {
                let vertices: Vec<LngLat> = [90.0_f64, 210.0, 330.0]
                    .iter()
                    .map(|deg| {
                        let a = deg.to_radians();
                        center.offset_meters(size * a.cos(), size * a.sin())
                    })
                    .collect();
                geometry.make_polygon(&vertices)
            }
        }
    }
}

impl fmt::Display for TreeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeShape::Circle => write!(f, "circle"),
            TreeShape::Square => write!(f, "square"),
            TreeShape::Triangle => write!(f, "triangle"),
        }
    }
}

impl FromStr for TreeShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "circle" => Ok(TreeShape::Circle),
            "square" => Ok(TreeShape::Square),
            "triangle" => Ok(TreeShape::Triangle),
            other => Err(format!("Unknown shape: {}", other)),
        }
    }
}
