//! Color stops and legend thresholds.
//!
//! Both are computed from the same [`DenseRange`] so the legend always
//! describes the ramp actually painted.

use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::density::{lerp, DenseRange};
use crate::palette::{Palette, PALETTE_SIZE};
use crate::stats::{EnergyStatistics, DEFAULT_RANGE};

/// Gap enforced between consecutive stops
pub const STOP_EPSILON: f64 = 0.001;

/// One `(value, color)` pair of an interpolation ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: String,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub value: f64,
    pub color: String,
    pub label: String,
}

/// Ascending, duplicate-free color stops.
///
/// The first six palette colors spread linearly across the dense range and
/// the last color starts just above `max(dense.end, stats.max)`. A uniform
/// range spreads all seven colors across `[min, max]`.
pub fn build_color_stops(
    stats: &EnergyStatistics,
    dense: &DenseRange,
    palette: Palette,
) -> Vec<ColorStop> {
    let stops = ramp(stats.min, stats.max, dense, palette);
    if stops.iter().all(|s| s.value.is_finite()) {
        return stops;
    }

    warn!(
        "Column '{}' range [{}, {}] gives non-finite stops, using default range",
        stats.column, stats.min, stats.max
    );
    let (min, max) = DEFAULT_RANGE;
    ramp(min, max, &DenseRange::uniform(min, max), palette)
}

fn ramp(min: f64, max: f64, dense: &DenseRange, palette: Palette) -> Vec<ColorStop> {
    let colors = palette.colors();

    let mut stops: Vec<ColorStop> = if dense.uniform {
        (0..PALETTE_SIZE)
            .map(|i| ColorStop {
                value: lerp(min, max, i as f64 / (PALETTE_SIZE - 1) as f64),
                color: colors[i].to_string(),
            })
            .collect()
    } else {
        let mut stops: Vec<ColorStop> = (0..PALETTE_SIZE - 1)
            .map(|i| ColorStop {
                value: dense.at(i as f64 / (PALETTE_SIZE - 2) as f64),
                color: colors[i].to_string(),
            })
            .collect();
        stops.push(ColorStop {
            value: dense.end.max(max) + STOP_EPSILON,
            color: colors[PALETTE_SIZE - 1].to_string(),
        });
        stops
    };

    stops.sort_by(|a, b| a.value.total_cmp(&b.value));
    make_strictly_ascending(&mut stops);
    stops
}

fn make_strictly_ascending(stops: &mut [ColorStop]) {
    for i in 1..stops.len() {
        let prev = stops[i - 1].value;
        if !(stops[i].value > prev) {
            // Large magnitudes swallow the epsilon; step at least one ulp
            stops[i].value = (prev + STOP_EPSILON).max(prev.next_up());
        }
    }
}

/// Seven legend rows: min, 20/40/60/80% of the dense range, dense end, max
pub fn legend_thresholds(
    stats: &EnergyStatistics,
    dense: &DenseRange,
    palette: Palette,
) -> Vec<LegendEntry> {
    let values = [
        stats.min,
        dense.at(0.2),
        dense.at(0.4),
        dense.at(0.6),
        dense.at(0.8),
        dense.end,
        stats.max,
    ];

    values
        .iter()
        .zip(palette.colors())
        .map(|(&value, color)| LegendEntry {
            value,
            color: color.to_string(),
            label: format_legend_value(value),
        })
        .collect()
}

/// Compact label: no decimals from 100 up, one from 1, two below
pub fn format_legend_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 100.0 {
        format!("{:.0}", value)
    } else if magnitude >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}
