//! # Energy Color Model
//!
//! Recolors buildings by a numeric column. Statistics, dense range, stops
//! and legend are recomputed from scratch whenever the building collection
//! or the selected column changes.

use citycanopy_core::surface::BUILDING_LAYER;
use citycanopy_core::{EnergyEvent, EventBus, MapSurface, Result, SceneEvent};
use geojson::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::density::{analyze_density, DenseRange};
use crate::expression::{paint_expression, FILL_EXTRUSION_COLOR};
use crate::palette::Palette;
use crate::stats::{column_values, stats_from_values, EnergyStatistics};
use crate::stops::{build_color_stops, legend_thresholds, ColorStop, LegendEntry};

/// Column and palette selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Building property driving the colors
    pub column: String,
    pub palette: Palette,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            column: "energy".to_string(),
            palette: Palette::default(),
        }
    }
}

/// Everything derived for one (features, column, palette) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyColoring {
    pub stats: EnergyStatistics,
    pub dense: DenseRange,
    pub stops: Vec<ColorStop>,
    pub legend: Vec<LegendEntry>,
}

impl EnergyColoring {
    pub fn expression(&self) -> Value {
        paint_expression(&self.stats.column, &self.stops)
    }
}

#[derive(Debug, Default)]
pub struct EnergyColorModel {
    config: EnergyConfig,
    events: Option<Arc<EventBus>>,
}

impl EnergyColorModel {
    pub fn new(config: EnergyConfig) -> Self {
        Self {
            config,
            events: None,
        }
    }

    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.config
    }

    pub fn set_column(&mut self, column: impl Into<String>) {
        self.config.column = column.into();
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.config.palette = palette;
    }

    /// Derive statistics, stops and legend without touching the surface
    pub fn analyze(&self, buildings: &[Feature]) -> EnergyColoring {
        let column = &self.config.column;
        let values = column_values(buildings, column);
        let stats = stats_from_values(&values, column);
        let dense = analyze_density(&values, stats.min, stats.max);

        debug!(
            "Column '{}': {} values in [{}, {}], dense [{}, {}]{}",
            column,
            stats.count,
            stats.min,
            stats.max,
            dense.start,
            dense.end,
            if dense.uniform { " (uniform)" } else { "" }
        );

        EnergyColoring {
            stops: build_color_stops(&stats, &dense, self.config.palette),
            legend: legend_thresholds(&stats, &dense, self.config.palette),
            stats,
            dense,
        }
    }

    /// Recolor the building layer
    pub fn apply<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        buildings: &[Feature],
    ) -> Result<EnergyColoring> {
        let coloring = self.analyze(buildings);
        surface.set_paint_property(BUILDING_LAYER, FILL_EXTRUSION_COLOR, coloring.expression())?;

        info!(
            "Buildings colored by '{}' with {} palette",
            self.config.column, self.config.palette
        );
        if let Some(bus) = &self.events {
            bus.publish(SceneEvent::Energy(EnergyEvent::Recolored {
                column: self.config.column.clone(),
                has_data: coloring.stats.has_data,
            }));
        }
        Ok(coloring)
    }
}
