use citycanopy_core::{
    EventBus, EventCategory, EventFilter, GeoGeometry, GeometryLib, InMemorySurface, LngLat,
    SceneData, SceneEvent, TreeEvent,
};
use citycanopy_placement::{
    PlacementArea, PlacementConfig, StopReason, TreePlacementEngine, TreeShape,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn big_square() -> PlacementArea {
    let origin = LngLat::new(-0.12, 51.5);
    let polygon = GeoGeometry::new()
        .make_polygon(&[
            origin,
            origin.offset_meters(500.0, 0.0),
            origin.offset_meters(500.0, 500.0),
            origin.offset_meters(0.0, 500.0),
        ])
        .unwrap();
    PlacementArea::Polygon(polygon)
}

fn batched_config() -> PlacementConfig {
    PlacementConfig {
        shape: TreeShape::Square,
        batch_threshold: 100,
        batch_size: 50,
        ..Default::default()
    }
}

fn counter_events(bus: &EventBus) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Trees]),
        move |event| {
            if matches!(event, SceneEvent::Trees(TreeEvent::CountChanged { .. })) {
                c.fetch_add(1, Ordering::SeqCst);
            }
        },
    );
    count
}

#[tokio::test]
async fn test_large_request_commits_per_batch() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();

    let bus = Arc::new(EventBus::new());
    let refreshes = counter_events(&bus);
    let mut engine = TreePlacementEngine::new(batched_config())
        .with_seed(1)
        .with_events(bus.clone());

    let report = engine
        .place_trees(&mut data, &mut surface, &big_square(), 300, 2.0)
        .await
        .unwrap();

    assert_eq!(report.stop, StopReason::Completed);
    assert_eq!(report.placed, 300);
    assert_eq!(data.tree_count(), 300);
    assert_eq!(data.tree_canopy_data().len(), 300);
    assert_eq!(refreshes.load(Ordering::SeqCst), 6);
    // 4 installs plus two tree sources per batch
    assert_eq!(surface.source_updates(), 4 + 6 * 2);
}

#[tokio::test]
async fn test_small_request_commits_once() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();

    let bus = Arc::new(EventBus::new());
    let refreshes = counter_events(&bus);
    let mut engine = TreePlacementEngine::new(batched_config())
        .with_seed(2)
        .with_events(bus.clone());

    let report = engine
        .place_trees(&mut data, &mut surface, &big_square(), 40, 2.0)
        .await
        .unwrap();

    assert_eq!(report.placed, 40);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_newer_operation_stops_batches() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();

    let bus = Arc::new(EventBus::new());
    let mut engine = TreePlacementEngine::new(batched_config())
        .with_seed(3)
        .with_events(bus.clone());

    // The user starts something else as soon as the first batch lands
    let tracker = engine.tracker().clone();
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Trees]),
        move |event| {
            if matches!(event, SceneEvent::Trees(TreeEvent::CountChanged { .. })) {
                tracker.begin();
            }
        },
    );

    let report = engine
        .place_trees(&mut data, &mut surface, &big_square(), 300, 2.0)
        .await
        .unwrap();

    assert_eq!(report.stop, StopReason::Superseded);
    assert_eq!(report.placed, 50);
    assert_eq!(data.tree_count(), 50);
    assert_eq!(data.tree_canopy_data().len(), 50);
}

#[tokio::test]
async fn test_stale_token_places_nothing() {
    let mut data = SceneData::new();
    let mut surface = InMemorySurface::new();
    data.install_sources(&mut surface).unwrap();
    let mut engine = TreePlacementEngine::new(batched_config()).with_seed(4);

    let stale = engine.tracker().begin();
    engine.tracker().begin();

    let report = engine
        .place_in_area_batched(&mut data, &mut surface, &big_square(), 200, 2.0, &stale)
        .await
        .unwrap();
    assert_eq!(report.stop, StopReason::Superseded);
    assert_eq!(report.placed, 0);
    assert!(data.is_empty());
}
