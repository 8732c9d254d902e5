//! # CityCanopy Energy
//!
//! Building recoloring by a numeric property. Values are binned to find the
//! densest part of the distribution so most of the color ramp lands where
//! most buildings are.

pub mod density;
pub mod expression;
pub mod model;
pub mod palette;
pub mod stats;
pub mod stops;

pub use density::{analyze_density, DenseRange, BIN_COUNT};
pub use expression::{paint_expression, FILL_EXTRUSION_COLOR};
pub use model::{EnergyColorModel, EnergyColoring, EnergyConfig};
pub use palette::Palette;
pub use stats::{compute_stats, numeric_columns, EnergyStatistics};
pub use stops::{
    build_color_stops, format_legend_value, legend_thresholds, ColorStop, LegendEntry, STOP_EPSILON,
};
