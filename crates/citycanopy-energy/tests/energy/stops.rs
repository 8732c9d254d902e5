use citycanopy_energy::density::analyze_density;
use citycanopy_energy::stats::stats_from_values;
use citycanopy_energy::{build_color_stops, legend_thresholds, Palette};
use proptest::prelude::*;

fn palette_strategy() -> impl Strategy<Value = Palette> {
    prop::sample::select(Palette::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_stops_strictly_ascending(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 0..200),
        palette in palette_strategy(),
    ) {
        let stats = stats_from_values(&values, "v");
        let dense = analyze_density(&values, stats.min, stats.max);
        let stops = build_color_stops(&stats, &dense, palette);

        prop_assert_eq!(stops.len(), 7);
        for pair in stops.windows(2) {
            prop_assert!(pair[1].value > pair[0].value, "{:?}", stops);
        }
    }

    #[test]
    fn prop_repeated_value_ascending(value in -1.0e15f64..1.0e15, n in 1usize..50) {
        let values = vec![value; n];
        let stats = stats_from_values(&values, "v");
        let dense = analyze_density(&values, stats.min, stats.max);
        let stops = build_color_stops(&stats, &dense, Palette::Rainbow);

        for pair in stops.windows(2) {
            prop_assert!(pair[1].value > pair[0].value);
        }
    }

    #[test]
    fn prop_stops_ascending_over_full_f64_range(
        values in prop::collection::vec(
            prop::num::f64::NORMAL | prop::num::f64::ZERO,
            1..50,
        ),
    ) {
        let stats = stats_from_values(&values, "v");
        let dense = analyze_density(&values, stats.min, stats.max);
        let stops = build_color_stops(&stats, &dense, Palette::Temperature);

        prop_assert_eq!(stops.len(), 7);
        for pair in stops.windows(2) {
            prop_assert!(pair[1].value > pair[0].value, "{:?}", stops);
        }
    }

    #[test]
    fn prop_legend_within_range(values in prop::collection::vec(0.0f64..500.0, 1..100)) {
        let stats = stats_from_values(&values, "v");
        let dense = analyze_density(&values, stats.min, stats.max);
        let legend = legend_thresholds(&stats, &dense, Palette::Energy);

        prop_assert_eq!(legend.len(), 7);
        for entry in &legend {
            prop_assert!(entry.value >= stats.min - 1e-9 && entry.value <= stats.max + 1e-9);
        }
    }
}

#[test]
fn test_empty_input_uses_default_range() {
    let stats = stats_from_values(&[], "v");
    let dense = analyze_density(&[], stats.min, stats.max);
    assert!(dense.uniform);

    let stops = build_color_stops(&stats, &dense, Palette::Energy);
    assert_eq!(stops.first().map(|s| s.value), Some(0.0));
    assert_eq!(stops.last().map(|s| s.value), Some(100.0));
}

#[test]
fn test_extreme_magnitudes_stay_finite_and_ascending() {
    let values = [-1e308, 0.0, 1e308];
    let stats = stats_from_values(&values, "v");
    let dense = analyze_density(&values, stats.min, stats.max);
    assert!(dense.start.is_finite() && dense.end.is_finite());

    let stops = build_color_stops(&stats, &dense, Palette::Energy);
    assert_eq!(stops.len(), 7);
    assert!(stops.iter().all(|s| s.value.is_finite()), "{:?}", stops);
    for pair in stops.windows(2) {
        assert!(pair[1].value > pair[0].value, "{:?}", stops);
    }

    let legend = legend_thresholds(&stats, &dense, Palette::Energy);
    assert!(legend.iter().all(|e| e.value.is_finite()));
}

#[test]
fn test_top_of_range_falls_back_to_default() {
    let values = [f64::MAX; 3];
    let stats = stats_from_values(&values, "v");
    let dense = analyze_density(&values, stats.min, stats.max);

    let stops = build_color_stops(&stats, &dense, Palette::Energy);
    assert_eq!(stops.first().map(|s| s.value), Some(0.0));
    assert_eq!(stops.last().map(|s| s.value), Some(100.0));
}
