use citycanopy_core::feature::FeatureExt;
use citycanopy_core::{GeoGeometry, GeometryLib, InMemorySurface, LngLat, SceneData};
use citycanopy_placement::{
    max_possible_trees, PlacementArea, PlacementConfig, StopReason, TreePlacementEngine,
    TreeShape,
};
use proptest::prelude::*;

const ORIGIN: LngLat = LngLat {
    lng: 13.4,
    lat: 52.5,
};

fn square_area(side_m: f64) -> PlacementArea {
    let geo = GeoGeometry::new();
    let polygon = geo
        .make_polygon(&[
            ORIGIN,
            ORIGIN.offset_meters(side_m, 0.0),
            ORIGIN.offset_meters(side_m, side_m),
            ORIGIN.offset_meters(0.0, side_m),
        ])
        .unwrap();
    PlacementArea::Polygon(polygon)
}

fn tree_centers(data: &SceneData) -> Vec<LngLat> {
    let geo = GeoGeometry::new();
    data.tree_trunk_data()
        .iter()
        .map(|t| geo.centroid(&t.footprint().unwrap()).unwrap())
        .collect()
}

fn square_engine(seed: u64) -> TreePlacementEngine {
    let config = PlacementConfig {
        shape: TreeShape::Square,
        ..Default::default()
    };
    TreePlacementEngine::new(config).with_seed(seed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_spacing_and_capacity(
        seed in any::<u64>(),
        count in 1usize..80,
        spacing in 1.5f64..8.0,
        side in 10.0f64..60.0,
    ) {
        let mut data = SceneData::new();
        let mut surface = InMemorySurface::new();
        data.install_sources(&mut surface).unwrap();
        let mut engine = square_engine(seed);

        let area = square_area(side);
        let report = engine
            .place_in_area(&mut data, &mut surface, &area, count, spacing)
            .unwrap();

        let polygon = area.to_polygon(engine.geometry()).unwrap();
        let cap = max_possible_trees(engine.geometry().polygon_area(&polygon), spacing);
        prop_assert!(report.placed <= cap);
        prop_assert!(report.placed <= count);
        prop_assert_eq!(report.placed, data.tree_count());

        let centers = tree_centers(&data);
        for (i, a) in centers.iter().enumerate() {
            for b in &centers[i + 1..] {
                let d = a.planar_distance_meters(b);
                prop_assert!(d >= spacing * 0.999, "{} m apart at spacing {}", d, spacing);
            }
        }
    }
}

#[test]
fn test_capacity_caps_request() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let mut engine = square_engine(3);

    let report = engine
        .place_in_area(&mut data, &mut surface, &square_area(10.0), 100, 2.0)
        .unwrap();

    assert!(report.capped());
    assert!(report.target <= 32);
    assert!(report.placed <= report.target);
    assert_ne!(report.stop, StopReason::Superseded);
}

#[test]
fn test_spacing_respects_existing_trees() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let mut engine = square_engine(5);

    let area = square_area(30.0);
    engine
        .place_in_area(&mut data, &mut surface, &area, 10, 4.0)
        .unwrap();
    engine
        .place_in_area(&mut data, &mut surface, &area, 10, 4.0)
        .unwrap();

    let centers = tree_centers(&data);
    for (i, a) in centers.iter().enumerate() {
        for b in &centers[i + 1..] {
            assert!(a.planar_distance_meters(b) >= 4.0 * 0.999);
        }
    }
}

#[test]
fn test_brush_trees_stay_inside() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let mut engine = square_engine(9);

    let area = PlacementArea::brush(ORIGIN, 20.0, TreeShape::Circle);
    let report = engine
        .place_in_area(&mut data, &mut surface, &area, 15, 3.0)
        .unwrap();
    assert_eq!(report.stop, StopReason::Completed);
    assert_eq!(report.placed, 15);

    for c in tree_centers(&data) {
        assert!(ORIGIN.planar_distance_meters(&c) <= 20.0 + 1e-6);
    }
}

#[test]
fn test_zero_count_places_nothing() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let mut engine = square_engine(1);

    let report = engine
        .place_in_area(&mut data, &mut surface, &square_area(10.0), 0, 2.0)
        .unwrap();
    assert_eq!(report.placed, 0);
    assert_eq!(report.stop, StopReason::Completed);
}

#[test]
fn test_unreachable_density_stops_early() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let config = PlacementConfig {
        shape: TreeShape::Square,
        max_consecutive_failures: 20,
        ..Default::default()
    };
    let mut engine = TreePlacementEngine::new(config).with_seed(42);

    // Capacity formula allows 31 but random packing saturates much earlier
    let report = engine
        .place_in_area(&mut data, &mut surface, &square_area(10.0), 31, 2.0)
        .unwrap();
    assert!(report.placed <= 31);
    if report.placed < 31 {
        assert!(matches!(
            report.stop,
            StopReason::AreaFull | StopReason::AttemptLimit
        ));
    }
}
