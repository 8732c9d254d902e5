//! # Map Surface
//!
//! The interactive map is an external collaborator. Everything the core
//! needs from it goes through [`MapSurface`]: pushing source data, setting
//! paint properties and lights, picking features under a screen point and
//! checking style readiness.
//!
//! [`InMemorySurface`] records every call and is used for headless runs and
//! tests.

use geojson::{Feature, FeatureCollection, JsonValue};
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::SurfaceError;
use crate::feature::FeatureExt;
use crate::geometry::{GeoGeometry, GeometryLib};
use crate::sun::SunLight;
use crate::types::{GeoBounds, LngLat, ScreenPoint};

/// Source id for building footprints
pub const BUILDING_SOURCE: &str = "buildings";
/// Source id for tree trunks
pub const TRUNK_SOURCE: &str = "tree-trunks";
/// Source id for tree canopies
pub const CANOPY_SOURCE: &str = "tree-canopies";
/// Source id for roads
pub const ROAD_SOURCE: &str = "roads";

/// Extrusion layer rendering buildings
pub const BUILDING_LAYER: &str = "buildings-3d";
/// Extrusion layer rendering trunks
pub const TRUNK_LAYER: &str = "tree-trunks-3d";
/// Extrusion layer rendering canopies
pub const CANOPY_LAYER: &str = "tree-canopies-3d";
/// Line layer rendering roads
pub const ROAD_LAYER: &str = "roads-line";

/// Rendering surface the editor draws on.
pub trait MapSurface {
    /// Register a new GeoJSON source
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    /// Replace the data of an existing source
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    /// Set a paint property on a layer
    fn set_paint_property(
        &mut self,
        layer: &str,
        property: &str,
        value: JsonValue,
    ) -> Result<(), SurfaceError>;

    /// Rendered features under a screen point, restricted to `layers`
    fn query_rendered_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<Feature>;

    /// Currently visible geographic bounds
    fn bounds(&self) -> Option<GeoBounds>;

    /// Whether the style has finished loading
    fn is_style_loaded(&self) -> bool;

    /// Update the scene light
    fn set_light(&mut self, _light: &SunLight) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Build a FeatureCollection from a slice of features
pub fn collection_of(features: &[Feature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.to_vec(),
        foreign_members: None,
    }
}

/// Poll `is_style_loaded` until it holds, at most `max_attempts` times.
///
/// Returns [`SurfaceError::StyleNotReady`] once the budget is exhausted.
pub async fn wait_for_style<S: MapSurface + ?Sized>(
    surface: &S,
    interval: Duration,
    max_attempts: u32,
) -> Result<(), SurfaceError> {
    for attempt in 1..=max_attempts {
        if surface.is_style_loaded() {
            debug!("Map style ready after {} check(s)", attempt);
            return Ok(());
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    warn!("Map style still not loaded after {} checks", max_attempts);
    Err(SurfaceError::StyleNotReady {
        attempts: max_attempts,
    })
}

type ScreenProjection = Box<dyn Fn(ScreenPoint) -> LngLat>;

/// Headless [`MapSurface`] that keeps everything in memory.
pub struct InMemorySurface {
    sources: HashMap<String, FeatureCollection>,
    layers: HashMap<String, String>,
    paint: HashMap<(String, String), JsonValue>,
    light: Option<SunLight>,
    bounds: Option<GeoBounds>,
    checks_until_ready: Cell<u32>,
    source_updates: usize,
    screen_to_lnglat: ScreenProjection,
    geometry: GeoGeometry,
}

impl InMemorySurface {
    /// Surface with the standard layers registered and the style loaded
    pub fn new() -> Self {
        let layers = [
            (BUILDING_LAYER, BUILDING_SOURCE),
            (TRUNK_LAYER, TRUNK_SOURCE),
            (CANOPY_LAYER, CANOPY_SOURCE),
            (ROAD_LAYER, ROAD_SOURCE),
        ]
        .into_iter()
        .map(|(l, s)| (l.to_string(), s.to_string()))
        .collect();

        Self {
            sources: HashMap::new(),
            layers,
            paint: HashMap::new(),
            light: None,
            bounds: None,
            checks_until_ready: Cell::new(0),
            source_updates: 0,
            screen_to_lnglat: Box::new(|p| LngLat::new(p.x, p.y)),
            geometry: GeoGeometry::new(),
        }
    }

    /// Report "not loaded" for the first `checks` readiness checks
    pub fn with_style_delay(self, checks: u32) -> Self {
        self.checks_until_ready.set(checks);
        self
    }

    /// Replace the screen → geographic mapping used for picking
    pub fn with_screen_projection(mut self, f: impl Fn(ScreenPoint) -> LngLat + 'static) -> Self {
        self.screen_to_lnglat = Box::new(f);
        self
    }

    pub fn set_bounds(&mut self, bounds: GeoBounds) {
        self.bounds = Some(bounds);
    }

    /// Data currently held by a source
    pub fn source(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id)
    }

    /// Last value set for a paint property
    pub fn paint_property(&self, layer: &str, property: &str) -> Option<&JsonValue> {
        self.paint.get(&(layer.to_string(), property.to_string()))
    }

    pub fn light(&self) -> Option<&SunLight> {
        self.light.as_ref()
    }

    /// Number of `add_source` + `set_source_data` calls so far
    pub fn source_updates(&self) -> usize {
        self.source_updates
    }
}

impl Default for InMemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemorySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySurface")
            .field("sources", &self.sources.len())
            .field("paint", &self.paint.len())
            .field("source_updates", &self.source_updates)
            .finish()
    }
}

impl MapSurface for InMemorySurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource { id: id.to_string() });
        }
        self.sources.insert(id.to_string(), data);
        self.source_updates += 1;
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| SurfaceError::UnknownSource { id: id.to_string() })?;
        *source = data;
        self.source_updates += 1;
        Ok(())
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        property: &str,
        value: JsonValue,
    ) -> Result<(), SurfaceError> {
        self.paint
            .insert((layer.to_string(), property.to_string()), value);
        Ok(())
    }

    fn query_rendered_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<Feature> {
        let target = (self.screen_to_lnglat)(point);
        let mut hits = Vec::new();
        for layer in layers {
            let Some(source) = self.layers.get(*layer).and_then(|s| self.sources.get(s)) else {
                continue;
            };
            hits.extend(
                source
                    .features
                    .iter()
                    .filter(|f| {
                        f.footprint()
                            .is_ok_and(|poly| self.geometry.point_in_polygon(target, &poly))
                    })
                    .cloned(),
            );
        }
        hits
    }

    fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    fn is_style_loaded(&self) -> bool {
        let remaining = self.checks_until_ready.get();
        if remaining == 0 {
            return true;
        }
        self.checks_until_ready.set(remaining - 1);
        false
    }

    fn set_light(&mut self, light: &SunLight) -> Result<(), SurfaceError> {
        self.light = Some(light.clone());
        Ok(())
    }
}
