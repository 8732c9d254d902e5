//! Editor session: the explicit context object of the scene editor.
//!
//! An [`EditorSession`] owns the scene data, the map surface, the three
//! engines and the event bus. Every user action goes through it so the
//! data layer and the surface stay in step.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use citycanopy_core::{
    apply_sun_light, wait_for_style, DataEvent, EventBus, InMemorySurface, LngLat, MapSurface,
    OperationTracker, SceneData, SceneEvent, ScreenPoint, SunLight, SunPositionProvider, TreeId,
};
use citycanopy_energy::{numeric_columns, EnergyColorModel, EnergyColoring, Palette};
use citycanopy_export::{ExportSummary, MeshExporter};
use citycanopy_placement::{PlacementArea, PlacementReport, TreePlacementEngine};
use citycanopy_settings::Config;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Scene editor state tied to one map surface.
pub struct EditorSession<S: MapSurface = InMemorySurface> {
    config: Config,
    data: SceneData,
    surface: S,
    engine: TreePlacementEngine,
    energy: EnergyColorModel,
    exporter: MeshExporter,
    events: Arc<EventBus>,
    operations: OperationTracker,
    sources_installed: bool,
}

impl EditorSession<InMemorySurface> {
    /// Session on a headless in-memory surface
    pub fn headless(config: Config) -> Self {
        Self::new(config, InMemorySurface::new())
    }
}

impl<S: MapSurface> EditorSession<S> {
    pub fn new(config: Config, surface: S) -> Self {
        let events = Arc::new(EventBus::new());
        let operations = OperationTracker::new();

        let engine = TreePlacementEngine::new(config.placement.clone())
            .with_tracker(operations.clone())
            .with_events(Arc::clone(&events));
        let energy = EnergyColorModel::new(config.energy.clone()).with_events(Arc::clone(&events));
        let exporter = MeshExporter::new(config.export.clone()).with_events(Arc::clone(&events));

        Self {
            config,
            data: SceneData::new(),
            surface,
            engine,
            energy,
            exporter,
            events,
            operations,
            sources_installed: false,
        }
    }

    /// Seed the placement random generator
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            engine: self.engine.with_seed(seed),
            ..self
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data(&self) -> &SceneData {
        &self.data
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn operations(&self) -> &OperationTracker {
        &self.operations
    }

    pub fn energy(&self) -> &EnergyColorModel {
        &self.energy
    }

    pub fn tree_count(&self) -> usize {
        self.data.tree_count()
    }

    /// Wait for the map style, then register the scene sources
    pub async fn wait_for_map(&mut self) -> Result<()> {
        let map = &self.config.map;
        wait_for_style(&self.surface, map.poll_interval(), map.style_max_attempts).await?;
        self.ensure_sources()
    }

    fn ensure_sources(&mut self) -> Result<()> {
        if !self.sources_installed {
            self.data
                .install_sources(&mut self.surface)
                .context("Failed to register map sources")?;
            self.sources_installed = true;
            debug!("Map sources registered");
        }
        Ok(())
    }

    fn sync_all(&mut self) -> Result<()> {
        if self.sources_installed {
            self.data.sync_all_sources(&mut self.surface)?;
        } else {
            self.ensure_sources()?;
        }
        Ok(())
    }

    /// Replace the scene with a GeoJSON FeatureCollection.
    ///
    /// On error the scene is left as it was.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let summary = self.data.load_geojson_str(text)?;
        self.sync_all()?;

        self.events.publish(SceneEvent::Data(DataEvent::Loaded {
            buildings: summary.buildings,
            trees: summary.trunks,
            roads: summary.roads,
        }));

        if summary.buildings > 0 {
            self.recolor()?;
        }
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.load_str(&text)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        info!("Loaded scene from {}", path.display());
        Ok(())
    }

    /// Save every collection as one GeoJSON FeatureCollection
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let text = self.data.to_geojson_string()?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved scene to {}", path.display());
        Ok(())
    }

    /// Clear the scene and restart tree numbering
    pub fn reset(&mut self) -> Result<()> {
        self.operations.begin();
        self.data.reset();
        self.sync_all()?;
        self.events.publish(SceneEvent::Data(DataEvent::Reset));
        Ok(())
    }

    pub fn place_tree(&mut self, point: LngLat, total_height: Option<f64>) -> Result<TreeId> {
        self.ensure_sources()?;
        let id = self
            .engine
            .place_single_tree(&mut self.data, &mut self.surface, point, total_height)?;
        Ok(id)
    }

    /// Fill an area; `spacing` falls back to the configured default
    pub async fn place_in_area(
        &mut self,
        area: &PlacementArea,
        count: usize,
        spacing: Option<f64>,
    ) -> Result<PlacementReport> {
        self.ensure_sources()?;
        let spacing = spacing.unwrap_or(self.config.placement.default_spacing);
        let report = self
            .engine
            .place_trees(&mut self.data, &mut self.surface, area, count, spacing)
            .await?;
        Ok(report)
    }

    pub fn delete_at_point(&mut self, point: ScreenPoint) -> Result<usize> {
        self.ensure_sources()?;
        Ok(self
            .engine
            .delete_at_point(&mut self.data, &mut self.surface, point)?)
    }

    pub fn delete_in_area(&mut self, area: &PlacementArea) -> Result<usize> {
        self.ensure_sources()?;
        Ok(self
            .engine
            .delete_in_area(&mut self.data, &mut self.surface, area)?)
    }

    /// Recolor buildings with the current column and palette
    pub fn recolor(&mut self) -> Result<EnergyColoring> {
        self.ensure_sources()?;
        let coloring = self
            .energy
            .apply(&mut self.surface, self.data.building_data())?;
        Ok(coloring)
    }

    pub fn set_energy_column(&mut self, column: impl Into<String>) -> Result<EnergyColoring> {
        self.energy.set_column(column);
        self.recolor()
    }

    pub fn set_palette(&mut self, palette: Palette) -> Result<EnergyColoring> {
        self.energy.set_palette(palette);
        self.recolor()
    }

    /// Numeric building properties that can drive the coloring
    pub fn energy_columns(&self) -> Vec<String> {
        numeric_columns(self.data.building_data())
    }

    /// ASCII STL export, chunked and streamed as needed
    pub async fn export_stl(&self, path: &Path) -> Result<ExportSummary> {
        let summary = self
            .exporter
            .export_to_path(
                path,
                self.data.tree_trunk_data(),
                self.data.tree_canopy_data(),
            )
            .await
            .with_context(|| format!("Failed to export {}", path.display()))?;
        Ok(summary)
    }

    /// Binary STL export; returns the triangle count
    pub fn export_binary_stl(&self, path: &Path) -> Result<usize> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let triangles = self.exporter.export_binary(
            &mut writer,
            self.data.tree_trunk_data(),
            self.data.tree_canopy_data(),
        )?;
        info!("Wrote {} triangles to {}", triangles, path.display());
        Ok(triangles)
    }

    /// Light the scene for `at` as seen from `location`
    pub fn apply_sun<P: SunPositionProvider + ?Sized>(
        &mut self,
        provider: &P,
        at: DateTime<Utc>,
        location: LngLat,
    ) -> Result<SunLight> {
        let light = apply_sun_light(
            &mut self.surface,
            provider,
            at,
            location.lat,
            location.lng,
        )?;
        Ok(light)
    }
}

impl<S: MapSurface> std::fmt::Debug for EditorSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("trees", &self.data.tree_count())
            .field("buildings", &self.data.building_data().len())
            .field("sources_installed", &self.sources_installed)
            .finish()
    }
}
