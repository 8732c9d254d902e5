//! Geographic primitives shared by every CityCanopy crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Meters per degree of longitude at the given latitude.
#[inline]
pub fn meters_per_degree_lng(lat: f64) -> f64 {
    METERS_PER_DEGREE * lat.to_radians().cos()
}

/// A geographic position in degrees (WGS84 order: longitude first).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Offset this point by a distance in meters (east, north) using the
    /// flat-earth approximation at this point's latitude.
    pub fn offset_meters(&self, east: f64, north: f64) -> Self {
        Self {
            lng: self.lng + east / meters_per_degree_lng(self.lat),
            lat: self.lat + north / METERS_PER_DEGREE,
        }
    }

    /// Approximate planar distance in meters.
    ///
    /// Uses `111320 m` per degree of latitude and `111320 * cos(lat)` per
    /// degree of longitude, evaluated at this point's latitude.
    pub fn planar_distance_meters(&self, other: &LngLat) -> f64 {
        let dx = (other.lng - self.lng) * meters_per_degree_lng(self.lat);
        let dy = (other.lat - self.lat) * METERS_PER_DEGREE;
        (dx * dx + dy * dy).sqrt()
    }

    /// Position as a GeoJSON coordinate
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }
}

impl From<geo::Coord<f64>> for LngLat {
    fn from(c: geo::Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<geo::Point<f64>> for LngLat {
    fn from(p: geo::Point<f64>) -> Self {
        Self::new(p.x(), p.y())
    }
}

impl From<LngLat> for geo::Coord<f64> {
    fn from(p: LngLat) -> Self {
        geo::Coord { x: p.lng, y: p.lat }
    }
}

impl From<LngLat> for geo::Point<f64> {
    fn from(p: LngLat) -> Self {
        geo::Point::new(p.lng, p.lat)
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// A pixel position on the rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Smallest box around all points, or `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = LngLat>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first.lng, first.lat, first.lng, first.lat);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    /// Grow the box to include a point
    pub fn extend(&mut self, p: LngLat) {
        self.min_lng = self.min_lng.min(p.lng);
        self.min_lat = self.min_lat.min(p.lat);
        self.max_lng = self.max_lng.max(p.lng);
        self.max_lat = self.max_lat.max(p.lat);
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn contains(&self, p: LngLat) -> bool {
        (self.min_lng..=self.max_lng).contains(&p.lng)
            && (self.min_lat..=self.max_lat).contains(&p.lat)
    }
}

/// Identifier shared by a trunk feature and its canopy feature.
///
/// Trunk and canopy live in separate collections and are linked only
/// through this id; lookups always go through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(String);

impl TreeId {
    /// Prefix used by generated ids
    pub const PREFIX: &'static str = "tree-";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for the given counter value (`tree-<n>`)
    pub fn from_counter(n: u64) -> Self {
        Self(format!("{}{}", Self::PREFIX, n))
    }

    /// Numeric suffix of a generated id
    pub fn counter(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TreeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Hands out unique `tree-<n>` ids for a session.
#[derive(Debug, Clone, Default)]
pub struct TreeIdAllocator {
    next: u64,
}

impl TreeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn allocate(&mut self) -> TreeId {
        let id = TreeId::from_counter(self.next);
        self.next += 1;
        id
    }

    /// Make sure future ids never collide with `existing`
    pub fn observe(&mut self, existing: &TreeId) {
        if let Some(n) = existing.counter() {
            self.next = self.next.max(n.saturating_add(1));
        }
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}
