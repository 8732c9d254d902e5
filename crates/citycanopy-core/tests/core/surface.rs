use citycanopy_core::surface::{CANOPY_LAYER, TRUNK_LAYER, TRUNK_SOURCE};
use citycanopy_core::{wait_for_style, InMemorySurface, MapSurface, SceneData, ScreenPoint};
use std::time::Duration;

const TREE: &str = r#"{"type": "FeatureCollection", "features": [
  {"type": "Feature",
   "geometry": {"type": "Polygon", "coordinates": [[[0.0,0.0],[0.001,0.0],[0.001,0.001],[0.0,0.001],[0.0,0.0]]]},
   "properties": {"id": "tree-0", "isTrunk": true, "height": 2}}
]}"#;

#[tokio::test]
async fn test_wait_for_style_eventually_ready() {
    let surface = InMemorySurface::new().with_style_delay(2);
    let result = wait_for_style(&surface, Duration::from_millis(1), 5).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_wait_for_style_gives_up() {
    let surface = InMemorySurface::new().with_style_delay(10);
    let err = wait_for_style(&surface, Duration::from_millis(1), 3)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Map style not ready after 3 attempts");
}

#[test]
fn test_install_and_sync_sources() {
    let mut scene = SceneData::new();
    scene.load_geojson_str(TREE).unwrap();

    let mut surface = InMemorySurface::new();
    scene.install_sources(&mut surface).unwrap();
    assert_eq!(surface.source_updates(), 4);
    assert_eq!(surface.source(TRUNK_SOURCE).unwrap().features.len(), 1);

    // A second install collides with the registered sources
    assert!(scene.install_sources(&mut surface).is_err());

    scene.sync_tree_sources(&mut surface).unwrap();
    assert_eq!(surface.source_updates(), 6);
}

#[test]
fn test_set_source_data_requires_existing_source() {
    let scene = SceneData::new();
    let mut surface = InMemorySurface::new();
    assert!(scene.sync_tree_sources(&mut surface).is_err());
}

#[test]
fn test_query_rendered_features_by_layer() {
    let mut scene = SceneData::new();
    scene.load_geojson_str(TREE).unwrap();
    let mut surface = InMemorySurface::new();
    scene.install_sources(&mut surface).unwrap();

    let inside = ScreenPoint::new(0.0005, 0.0005);
    let outside = ScreenPoint::new(0.005, 0.005);

    assert_eq!(
        surface
            .query_rendered_features(inside, &[TRUNK_LAYER, CANOPY_LAYER])
            .len(),
        1
    );
    assert!(surface
        .query_rendered_features(outside, &[TRUNK_LAYER])
        .is_empty());
    assert!(surface
        .query_rendered_features(inside, &[CANOPY_LAYER])
        .is_empty());
}
