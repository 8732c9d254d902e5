use citycanopy_core::{
    GeoGeometry, GeometryLib, InMemorySurface, LngLat, SceneData, ScreenPoint, TreeId,
};
use citycanopy_placement::{PlacementArea, PlacementConfig, TreePlacementEngine, TreeShape};

const THREE_FEATURES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "geometry": {"type": "Polygon", "coordinates": [[[0.0,0.0],[0.0002,0.0],[0.0002,0.0002],[0.0,0.0002],[0.0,0.0]]]},
     "properties": {"height": 20}},
    {"type": "Feature",
     "geometry": {"type": "Polygon", "coordinates": [[[0.001,0.001],[0.00101,0.001],[0.00101,0.00101],[0.001,0.00101],[0.001,0.001]]]},
     "properties": {"id": "tree-0", "isTrunk": true, "height": 4, "base": 0}},
    {"type": "Feature",
     "geometry": {"type": "Polygon", "coordinates": [[[0.00098,0.00098],[0.00103,0.00098],[0.00103,0.00103],[0.00098,0.00103],[0.00098,0.00098]]]},
     "properties": {"id": "tree-0", "isCanopy": true, "height": 6, "base": 4}}
  ]
}"#;

fn loaded() -> (SceneData, InMemorySurface) {
    let mut data = SceneData::new();
    data.load_geojson_str(THREE_FEATURES).unwrap();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    (data, surface)
}

#[test]
fn test_load_then_delete_at_point() {
    let (mut data, mut surface) = loaded();
    assert_eq!(data.building_data().len(), 1);
    assert_eq!(data.tree_trunk_data().len(), 1);
    assert_eq!(data.tree_canopy_data().len(), 1);

    let engine = TreePlacementEngine::default();
    let removed = engine
        .delete_at_point(&mut data, &mut surface, ScreenPoint::new(0.001005, 0.001005))
        .unwrap();

    assert_eq!(removed, 1);
    assert!(data.tree_trunk_data().is_empty());
    assert!(data.tree_canopy_data().is_empty());
    assert_eq!(data.building_data().len(), 1);
}

#[test]
fn test_delete_at_empty_point() {
    let (mut data, mut surface) = loaded();
    let engine = TreePlacementEngine::default();

    // Over the building only
    let removed = engine
        .delete_at_point(&mut data, &mut surface, ScreenPoint::new(0.0001, 0.0001))
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(data.tree_count(), 1);
}

#[test]
fn test_delete_at_point_hits_canopy_edge() {
    let (mut data, mut surface) = loaded();
    let engine = TreePlacementEngine::default();

    // Inside the canopy but outside the trunk
    let removed = engine
        .delete_at_point(&mut data, &mut surface, ScreenPoint::new(0.00099, 0.00099))
        .unwrap();
    assert_eq!(removed, 1);
    assert!(data.tree_canopy_data().is_empty());
}

fn planted_row() -> (SceneData, InMemorySurface, TreePlacementEngine) {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let config = PlacementConfig {
        shape: TreeShape::Square,
        ..Default::default()
    };
    let mut engine = TreePlacementEngine::new(config).with_seed(8);

    let origin = LngLat::new(4.9, 52.37);
    for i in 0..10 {
        engine
            .place_single_tree(
                &mut data,
                &mut surface,
                origin.offset_meters(i as f64 * 10.0, 0.0),
                Some(10.0),
            )
            .unwrap();
    }
    (data, surface, engine)
}

#[test]
fn test_delete_in_polygon_only_inside() {
    let (mut data, mut surface, engine) = planted_row();
    let origin = LngLat::new(4.9, 52.37);

    // Covers trees 0..=4 (x = 0..40 m)
    let polygon = GeoGeometry::new()
        .make_polygon(&[
            origin.offset_meters(-5.0, -5.0),
            origin.offset_meters(45.0, -5.0),
            origin.offset_meters(45.0, 5.0),
            origin.offset_meters(-5.0, 5.0),
        ])
        .unwrap();

    let removed = engine
        .delete_in_polygon(&mut data, &mut surface, &polygon)
        .unwrap();
    assert_eq!(removed, 5);
    assert_eq!(data.tree_count(), 5);
    assert_eq!(data.tree_canopy_data().len(), 5);

    let remaining: Vec<TreeId> = data.tree_ids().collect();
    for n in 5..10 {
        assert!(remaining.contains(&TreeId::from_counter(n)));
    }
}

#[test]
fn test_delete_in_brush_area() {
    let (mut data, mut surface, engine) = planted_row();
    let center = LngLat::new(4.9, 52.37).offset_meters(90.0, 0.0);

    let removed = engine
        .delete_in_area(
            &mut data,
            &mut surface,
            &PlacementArea::brush(center, 12.0, TreeShape::Circle),
        )
        .unwrap();
    // Trees at 80 m and 90 m
    assert_eq!(removed, 2);
    assert_eq!(data.tree_count(), 8);
}
