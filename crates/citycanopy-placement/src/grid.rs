//! Uniform grid over geographic points for minimum-spacing checks.
//!
//! Cells are `2 × min_distance` meters on a side, converted to degrees at a
//! reference latitude fixed when the grid is built. Any point closer than
//! `min_distance` to a query therefore sits in the 3×3 block of cells
//! around the query's own cell.

use citycanopy_core::{meters_per_degree_lng, LngLat, METERS_PER_DEGREE};
use std::collections::HashMap;

type CellKey = (i64, i64);

/// Spatial hash of placed tree centers.
///
/// Built fresh for every placement operation; points are never removed.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_meters: f64,
    cell_lng: f64,
    cell_lat: f64,
    cells: HashMap<CellKey, Vec<LngLat>>,
    len: usize,
}

impl SpatialGrid {
    /// Grid sized for `min_distance` meters around `reference_lat`
    pub fn new(min_distance: f64, reference_lat: f64) -> Self {
        // Non-positive spacing still needs a usable cell size
        let cell_meters = if min_distance.is_finite() && min_distance > 0.0 {
            2.0 * min_distance
        } else {
            1.0
        };
        let lng_scale = meters_per_degree_lng(reference_lat).abs().max(f64::EPSILON);

        Self {
            cell_meters,
            cell_lng: cell_meters / lng_scale,
            cell_lat: cell_meters / METERS_PER_DEGREE,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Grid pre-filled with `points`
    pub fn from_points<I>(points: I, min_distance: f64, reference_lat: f64) -> Self
    where
        I: IntoIterator<Item = LngLat>,
    {
        let mut grid = Self::new(min_distance, reference_lat);
        for p in points {
            grid.insert(p);
        }
        grid
    }

    fn key_for(&self, p: LngLat) -> CellKey {
        (
            (p.lng / self.cell_lng).floor() as i64,
            (p.lat / self.cell_lat).floor() as i64,
        )
    }

    pub fn insert(&mut self, point: LngLat) {
        let key = self.key_for(point);
        self.cells.entry(key).or_default().push(point);
        self.len += 1;
    }

    /// True if any stored point is strictly closer than `min_distance` meters.
    ///
    /// Distances use the planar approximation at the query point's latitude.
    /// Queries wider than the grid was built for scan extra rings of cells.
    pub fn has_neighbor_within(&self, point: LngLat, min_distance: f64) -> bool {
        if !(min_distance > 0.0) || self.len == 0 {
            return false;
        }

        let rings = ((min_distance / self.cell_meters).ceil() as i64).max(1);
        let (cx, cy) = self.key_for(point);
        for dx in -rings..=rings {
            for dy in -rings..=rings {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                if bucket
                    .iter()
                    .any(|other| point.planar_distance_meters(other) < min_distance)
                {
                    return true;
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
