use chrono::{TimeZone, Utc};
use citycanopy::{Config, EditorSession, InMemorySurface, LngLat, PlacementArea, ScreenPoint};
use citycanopy_core::event_bus::{
    EventCategory, EventFilter, ExportEvent, SceneEvent, TreeEvent,
};
use citycanopy_core::surface::BUILDING_LAYER;
use citycanopy_core::SunPosition;
use citycanopy_energy::{Palette, FILL_EXTRUSION_COLOR};
use citycanopy_placement::TreeShape;
use parking_lot::Mutex;
use std::sync::Arc;

use super::SCENE;

fn session() -> EditorSession {
    let mut session = EditorSession::headless(Config::default()).with_seed(7);
    session.load_str(SCENE).unwrap();
    session
}

#[test]
fn test_load_registers_sources_and_colors_buildings() {
    let session = session();
    let data = session.data();
    assert_eq!(data.building_data().len(), 2);
    assert_eq!(data.tree_count(), 1);
    assert_eq!(data.road_data().len(), 1);

    assert_eq!(session.surface().source_updates(), 4);
    assert!(session
        .surface()
        .paint_property(BUILDING_LAYER, FILL_EXTRUSION_COLOR)
        .is_some());
    assert_eq!(session.energy_columns(), vec!["energy", "height"]);
}

#[test]
fn test_malformed_load_keeps_scene() {
    let mut session = session();
    assert!(session.load_str("{\"type\": \"Feature\"}").is_err());
    assert_eq!(session.data().building_data().len(), 2);
    assert_eq!(session.tree_count(), 1);
}

#[test]
fn test_place_continues_numbering_after_load() {
    let mut session = session();
    let id = session.place_tree(LngLat::new(0.002, 0.002), Some(10.0)).unwrap();
    assert_eq!(id.as_str(), "tree-1");
    assert_eq!(session.tree_count(), 2);
}

#[tokio::test]
async fn test_area_fill_uses_default_spacing() {
    let mut session = session();
    let area = PlacementArea::brush(LngLat::new(0.01, 0.01), 30.0, TreeShape::Circle);

    let report = session.place_in_area(&area, 20, None).await.unwrap();
    assert_eq!(report.placed, 20);
    assert_eq!(session.tree_count(), 21);
}

#[tokio::test]
async fn test_counter_subscriber_sees_changes() {
    let mut session = session();
    let counts = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&counts);
    session.events().subscribe(
        EventFilter::Categories(vec![EventCategory::Trees]),
        move |event| {
            if let SceneEvent::Trees(TreeEvent::CountChanged { trees }) = event {
                seen.lock().push(trees);
            }
        },
    );

    session.place_tree(LngLat::new(0.002, 0.002), None).unwrap();
    let removed = session
        .delete_at_point(ScreenPoint::new(0.001005, 0.001005))
        .unwrap();
    assert_eq!(removed, 1);

    assert_eq!(*counts.lock(), vec![2, 1]);
}

#[test]
fn test_reset_clears_everything() {
    let mut session = session();
    session.reset().unwrap();
    assert!(session.data().is_empty());

    let id = session.place_tree(LngLat::new(0.0, 0.0), None).unwrap();
    assert_eq!(id.as_str(), "tree-0");
}

#[test]
fn test_palette_and_column_switch() {
    let mut session = session();
    let coloring = session.set_palette(Palette::Traffic).unwrap();
    assert_eq!(coloring.stops.len(), Palette::Traffic.colors().len());

    let coloring = session.set_energy_column("missing").unwrap();
    assert!(!coloring.stats.has_data);
    assert_eq!((coloring.stats.min, coloring.stats.max), (0.0, 100.0));
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.geojson");

    let mut session = session();
    session.place_tree(LngLat::new(0.002, 0.002), None).unwrap();
    session.save_file(&path).unwrap();

    let mut reloaded = EditorSession::headless(Config::default());
    reloaded.load_file(&path).unwrap();
    assert_eq!(reloaded.tree_count(), 2);
    assert_eq!(reloaded.data().building_data().len(), 2);
}

#[tokio::test]
async fn test_wait_for_map_gives_up() {
    let mut config = Config::default();
    config.map.style_poll_interval_ms = 1;
    config.map.style_max_attempts = 3;

    let surface = InMemorySurface::new().with_style_delay(10);
    let mut session = EditorSession::new(config, surface);
    let err = session.wait_for_map().await.unwrap_err();
    assert!(err.to_string().contains("3 attempts"));
}

#[tokio::test]
async fn test_export_from_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trees.stl");

    let session = session();
    let summary = session.export_stl(&path).await.unwrap();
    assert_eq!(summary.trees, 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("solid tree_0\n"));
}

#[tokio::test]
async fn test_chunked_export_reports_parts_to_receiver() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trees.stl");

    let mut config = Config::default();
    config.export.chunk_threshold = 0;
    config.export.chunk_size = 1;
    let mut session = EditorSession::headless(config).with_seed(7);
    session.load_str(SCENE).unwrap();

    let mut rx = session.events().receiver();
    let summary = session.export_stl(&path).await.unwrap();
    assert_eq!(summary.files.len(), 1);

    match rx.try_recv().unwrap() {
        SceneEvent::Export(ExportEvent::ChunkWritten { index, total, path }) => {
            assert_eq!((index, total), (1, 1));
            assert_eq!(path, summary.files[0]);
            assert!(path.exists());
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(
        rx.try_recv().unwrap(),
        SceneEvent::Export(ExportEvent::Finished { trees: 1, .. })
    ));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_sun_light_reaches_surface() {
    let mut session = session();
    let noon = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
    let provider = |_at: chrono::DateTime<Utc>, _lat: f64, _lon: f64| SunPosition {
        azimuth: 0.0,
        altitude: std::f64::consts::FRAC_PI_4,
    };

    let light = session
        .apply_sun(&provider, noon, LngLat::new(13.4, 52.5))
        .unwrap();
    assert_eq!(session.surface().light(), Some(&light));
}
