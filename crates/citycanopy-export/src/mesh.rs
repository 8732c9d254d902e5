//! Triangulation of extruded footprints.
//!
//! A ring of N distinct vertices becomes a closed prism of `4N - 4`
//! triangles: `N - 2` per cap and two per side wall.

use nalgebra::{Point3, Vector3};
use tracing::debug;

/// One triangle with its unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vector3<f64>,
    pub vertices: [Point3<f64>; 3],
}

impl Facet {
    /// Triangle with the normal implied by its winding (`+z` if degenerate)
    pub fn from_winding(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::z);
        Self {
            normal,
            vertices: [a, b, c],
        }
    }

    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).norm() / 2.0
    }

    pub fn is_finite(&self) -> bool {
        self.normal.iter().all(|v| v.is_finite())
            && self
                .vertices
                .iter()
                .all(|p| p.coords.iter().all(|v| v.is_finite()))
    }
}

/// Distinct vertices of a ring: closing point and repeats dropped
pub fn distinct_ring(ring: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(ring.len());
    for &p in ring {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Twice the signed area; positive for counter-clockwise rings
pub fn signed_area2(ring: &[(f64, f64)]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum()
}

/// Extrude a ring from `base` to `base + height`.
///
/// Caps are fans from vertex 0. The ring is made counter-clockwise first
/// so wall normals point outward. Rings with fewer than 3 distinct vertices
/// produce nothing.
pub fn extrude_ring(ring: &[(f64, f64)], base: f64, height: f64) -> Vec<Facet> {
    let mut pts = distinct_ring(ring);
    let n = pts.len();
    if n < 3 {
        debug!("Skipping ring with {} distinct vertices", n);
        return Vec::new();
    }
    if signed_area2(&pts) < 0.0 {
        pts.reverse();
    }

    let top = base + height;
    let at = |i: usize, z: f64| Point3::new(pts[i].0, pts[i].1, z);
    let mut facets = Vec::with_capacity(4 * n - 4);

    for i in 1..n - 1 {
        facets.push(Facet {
            normal: -Vector3::z(),
            vertices: [at(0, base), at(i + 1, base), at(i, base)],
        });
    }
    for i in 1..n - 1 {
        facets.push(Facet {
            normal: Vector3::z(),
            vertices: [at(0, top), at(i, top), at(i + 1, top)],
        });
    }
    for i in 0..n {
        let j = (i + 1) % n;
        let (a0, b0, b1, a1) = (at(i, base), at(j, base), at(j, top), at(i, top));
        facets.push(Facet::from_winding(a0, b0, b1));
        facets.push(Facet::from_winding(a0, b1, a1));
    }
    facets
}
