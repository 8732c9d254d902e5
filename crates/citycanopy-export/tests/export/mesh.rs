use citycanopy_export::{extrude_ring, Facet};
use nalgebra::{Point3, Vector3};

fn square(s: f64) -> Vec<(f64, f64)> {
    vec![(0.0, 0.0), (s, 0.0), (s, s), (0.0, s), (0.0, 0.0)]
}

fn net_flux(facets: &[Facet]) -> Vector3<f64> {
    facets
        .iter()
        .fold(Vector3::zeros(), |acc, f| acc + f.normal * f.area())
}

#[test]
fn test_square_prism_has_twelve_triangles() {
    let facets = extrude_ring(&square(3.0), 0.0, 5.0);
    assert_eq!(facets.len(), 12);

    let bottom = facets.iter().filter(|f| f.normal == -Vector3::z()).count();
    let top = facets.iter().filter(|f| f.normal == Vector3::z()).count();
    assert_eq!(bottom, 2);
    assert_eq!(top, 2);
}

#[test]
fn test_square_prism_is_closed() {
    let facets = extrude_ring(&square(3.0), 0.0, 5.0);
    assert!(net_flux(&facets).norm() < 1e-9);

    let surface: f64 = facets.iter().map(Facet::area).sum();
    // Two 3x3 caps and four 3x5 walls
    assert!((surface - (2.0 * 9.0 + 4.0 * 15.0)).abs() < 1e-9);
}

#[test]
fn test_normals_follow_winding_and_point_outward() {
    let facets = extrude_ring(&square(2.0), 1.0, 4.0);
    let center = Point3::new(1.0, 1.0, 3.0);

    for facet in &facets {
        let [a, b, c] = facet.vertices;
        let implied = Facet::from_winding(a, b, c).normal;
        assert!((implied - facet.normal).norm() < 1e-9);

        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        assert!((centroid - center).dot(&facet.normal) > 0.0);
    }
}

#[test]
fn test_clockwise_ring_is_normalized() {
    let mut ring = square(2.0);
    ring.reverse();
    let facets = extrude_ring(&ring, 0.0, 1.0);
    assert_eq!(facets.len(), 12);

    let center = Point3::new(1.0, 1.0, 0.5);
    for facet in &facets {
        let [a, b, c] = facet.vertices;
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        assert!((centroid - center).dot(&facet.normal) > 0.0);
    }
}

#[test]
fn test_cap_heights() {
    let facets = extrude_ring(&square(1.0), 2.0, 3.0);
    for facet in facets.iter().filter(|f| f.normal.z.abs() > 0.5) {
        let expected = if facet.normal.z > 0.0 { 5.0 } else { 2.0 };
        assert!(facet.vertices.iter().all(|v| v.z == expected));
    }
}

#[test]
fn test_polygon_prism_closed() {
    let hexagon: Vec<(f64, f64)> = (0..6)
        .map(|i| {
            let a = i as f64 * std::f64::consts::PI / 3.0;
            (a.cos() * 4.0, a.sin() * 4.0)
        })
        .collect();
    let facets = extrude_ring(&hexagon, 0.0, 7.0);
    assert_eq!(facets.len(), 4 * 6 - 4);
    assert!(net_flux(&facets).norm() < 1e-9);
}
