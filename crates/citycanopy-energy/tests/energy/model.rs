use citycanopy_core::surface::BUILDING_LAYER;
use citycanopy_core::{
    EnergyEvent, EventBus, EventCategory, EventFilter, InMemorySurface, SceneData, SceneEvent,
};
use citycanopy_energy::{EnergyColorModel, EnergyConfig, Palette, FILL_EXTRUSION_COLOR};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn buildings(values: &[Value]) -> SceneData {
    let features: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * 0.001;
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [x, 0.0], [x + 0.0005, 0.0], [x + 0.0005, 0.0005], [x, 0.0005], [x, 0.0]
                    ]]
                },
                "properties": {"energy": v, "height": 10}
            })
        })
        .collect();
    let text = json!({"type": "FeatureCollection", "features": features}).to_string();

    let mut data = SceneData::new();
    data.load_geojson_str(&text).unwrap();
    data
}

#[test]
fn test_apply_sets_building_paint() {
    let data = buildings(&[json!(120), json!("80.5"), json!(95), json!("bad"), json!(300)]);
    let mut surface = InMemorySurface::new();
    let model = EnergyColorModel::new(EnergyConfig::default());

    let coloring = model.apply(&mut surface, data.building_data()).unwrap();
    assert!(coloring.stats.has_data);
    assert_eq!(coloring.stats.count, 4);
    assert_eq!(coloring.stats.min, 80.5);
    assert_eq!(coloring.stats.max, 300.0);

    let paint = surface
        .paint_property(BUILDING_LAYER, FILL_EXTRUSION_COLOR)
        .unwrap();
    let expr = paint.as_array().unwrap();
    assert_eq!(expr[0], json!("interpolate"));
    assert_eq!(expr[2], json!(["to-number", ["get", "energy"], 0]));
    // Three header entries plus seven (value, color) pairs
    assert_eq!(expr.len(), 3 + 14);
}

#[test]
fn test_column_without_data() {
    let data = buildings(&[json!("n/a"), json!(null)]);
    let mut surface = InMemorySurface::new();
    let bus = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Energy]),
        move |e| s.lock().unwrap().push(e),
    );

    let mut model = EnergyColorModel::new(EnergyConfig::default()).with_events(bus);
    model.set_palette(Palette::Temperature);
    let coloring = model.apply(&mut surface, data.building_data()).unwrap();

    assert!(!coloring.stats.has_data);
    assert!(coloring.dense.uniform);
    assert_eq!(coloring.stops[0].color, Palette::Temperature.colors()[0]);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[SceneEvent::Energy(EnergyEvent::Recolored {
            column: "energy".to_string(),
            has_data: false,
        })]
    );
}

#[test]
fn test_switching_column_recomputes() {
    let data = buildings(&[json!(1), json!(2), json!(3)]);
    let mut model = EnergyColorModel::default();
    let first = model.analyze(data.building_data());

    model.set_column("height");
    let second = model.analyze(data.building_data());
    assert_eq!(second.stats.column, "height");
    assert_eq!(second.stats.min, 10.0);
    assert_ne!(first.stats, second.stats);
}
