//! # Tree Placement Engine
//!
//! Generates trunk and canopy footprints for single trees and fills areas
//! with trees at a minimum spacing using rejection sampling. Large requests
//! run in batches that yield to the runtime between batches and stop early
//! when a newer operation supersedes them.
//!
//! Every operation finishes mutating [`SceneData`] before it pushes anything
//! to the [`MapSurface`].

use citycanopy_core::feature::FeatureExt;
use citycanopy_core::{
    tree_part_feature, EventBus, GeoBounds, GeoGeometry, GeometryError, GeometryLib, LngLat,
    MapSurface, OperationToken, OperationTracker, Result, SceneData, SceneEvent, TreeEvent,
    TreeId, TreePart,
};
use geo::Polygon;
use geojson::Feature;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::area::PlacementArea;
use crate::grid::SpatialGrid;
use crate::shape::TreeShape;
use crate::sizing::TreeSizing;

/// Placement tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Lower bound of the random total height (meters)
    pub min_height: f64,
    /// Upper bound of the random total height (meters)
    pub max_height: f64,
    pub sizing: TreeSizing,
    /// Footprint shape of trunks and canopies
    pub shape: TreeShape,
    /// When false only trunks are generated
    pub include_canopy: bool,
    /// Spacing used when a request does not give one (meters)
    pub default_spacing: f64,
    /// Attempt budget per requested tree
    pub attempts_per_tree: usize,
    /// Attempt budget per tree of area capacity
    pub attempts_per_capacity: usize,
    /// Consecutive rejections after which the area counts as full
    pub max_consecutive_failures: usize,
    /// Requests of at least this many trees run batched
    pub batch_threshold: usize,
    /// Trees per batch
    pub batch_size: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_height: 5.0,
            max_height: 15.0,
            sizing: TreeSizing::default(),
            shape: TreeShape::default(),
            include_canopy: true,
            default_spacing: 3.0,
            attempts_per_tree: 50,
            attempts_per_capacity: 10,
            max_consecutive_failures: 500,
            batch_threshold: 1000,
            batch_size: 200,
        }
    }
}

/// Why an area placement stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The (possibly capped) target was reached
    Completed,
    /// Too many consecutive rejections
    AreaFull,
    /// Total attempt budget exhausted
    AttemptLimit,
    /// A newer operation started
    Superseded,
}

/// Outcome of an area placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    /// Trees the caller asked for
    pub requested: usize,
    /// Area capacity at the requested spacing
    pub max_possible: usize,
    /// `min(requested, max_possible)`
    pub target: usize,
    pub placed: usize,
    /// Random points drawn
    pub attempts: usize,
    pub stop: StopReason,
}

impl PlacementReport {
    /// The request was reduced to the area capacity
    pub fn capped(&self) -> bool {
        self.target < self.requested
    }

    /// Fewer trees placed than requested
    pub fn is_short(&self) -> bool {
        self.placed < self.requested
    }
}

/// Maximum trees of spacing `min_spacing` that fit in `area_m2`
pub fn max_possible_trees(area_m2: f64, min_spacing: f64) -> usize {
    if !(min_spacing > 0.0) {
        return usize::MAX;
    }
    let per_tree = PI * (min_spacing / 2.0).powi(2);
    let fit = (area_m2.max(0.0) / per_tree).floor();
    if fit >= usize::MAX as f64 {
        usize::MAX
    } else {
        fit as usize
    }
}

/// Rejection sampler state for one area operation.
struct Sampler {
    polygon: Polygon<f64>,
    bounds: GeoBounds,
    grid: SpatialGrid,
    min_spacing: f64,
    max_attempts: usize,
    max_failures: usize,
    attempts: usize,
    failures: usize,
}

impl Sampler {
    /// Next accepted point, or the reason sampling must stop
    fn draw<R, G>(&mut self, rng: &mut R, geometry: &G) -> std::result::Result<LngLat, StopReason>
    where
        R: Rng,
        G: GeometryLib + ?Sized,
    {
        loop {
            if self.attempts >= self.max_attempts {
                return Err(StopReason::AttemptLimit);
            }
            if self.failures >= self.max_failures {
                return Err(StopReason::AreaFull);
            }
            self.attempts += 1;

            let candidate = LngLat::new(
                rng.gen_range(self.bounds.min_lng..=self.bounds.max_lng),
                rng.gen_range(self.bounds.min_lat..=self.bounds.max_lat),
            );
            if geometry.point_in_polygon(candidate, &self.polygon)
                && !self.grid.has_neighbor_within(candidate, self.min_spacing)
            {
                self.grid.insert(candidate);
                self.failures = 0;
                return Ok(candidate);
            }
            self.failures += 1;
        }
    }
}

/// Area placement after capacity and budget have been worked out.
struct AreaPlan {
    sampler: Sampler,
    requested: usize,
    max_possible: usize,
    target: usize,
}

impl AreaPlan {
    fn report(&self, placed: usize, stop: StopReason) -> PlacementReport {
        PlacementReport {
            requested: self.requested,
            max_possible: self.max_possible,
            target: self.target,
            placed,
            attempts: self.sampler.attempts,
            stop,
        }
    }
}

type TreeFeatures = (Feature, Option<Feature>);

/// Places and removes trees in a [`SceneData`].
pub struct TreePlacementEngine<G: GeometryLib = GeoGeometry> {
    config: PlacementConfig,
    geometry: G,
    rng: StdRng,
    operations: OperationTracker,
    events: Option<Arc<EventBus>>,
}

impl TreePlacementEngine<GeoGeometry> {
    pub fn new(config: PlacementConfig) -> Self {
        Self::with_geometry(config, GeoGeometry::new())
    }
}

impl<G: GeometryLib> TreePlacementEngine<G> {
    pub fn with_geometry(config: PlacementConfig, geometry: G) -> Self {
        Self {
            config,
            geometry,
            rng: StdRng::from_entropy(),
            operations: OperationTracker::new(),
            events: None,
        }
    }

    /// Deterministic random stream
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Share a supersession tracker with other components
    pub fn with_tracker(mut self, tracker: OperationTracker) -> Self {
        self.operations = tracker;
        self
    }

    /// Publish tree events on `bus`
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlacementConfig {
        &mut self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn tracker(&self) -> &OperationTracker {
        &self.operations
    }

    fn publish(&self, event: TreeEvent) {
        if let Some(bus) = &self.events {
            bus.publish(SceneEvent::Trees(event));
        }
    }

    /// Push tree sources and refresh the counter
    fn commit<S: MapSurface + ?Sized>(&self, data: &SceneData, surface: &mut S) -> Result<()> {
        data.sync_tree_sources(surface)?;
        self.publish(TreeEvent::CountChanged {
            trees: data.tree_count(),
        });
        Ok(())
    }

    fn draw_height(&mut self) -> f64 {
        let (lo, hi) = if self.config.min_height <= self.config.max_height {
            (self.config.min_height, self.config.max_height)
        } else {
            (self.config.max_height, self.config.min_height)
        };
        self.rng.gen_range(lo..=hi)
    }

    /// Trunk and optional canopy features for one tree
    fn build_tree(
        &mut self,
        id: &TreeId,
        center: LngLat,
        total_height: Option<f64>,
    ) -> std::result::Result<TreeFeatures, GeometryError> {
        let total = match total_height {
            Some(h) if !h.is_finite() => {
                return Err(GeometryError::NonFinite {
                    what: "tree height".to_string(),
                })
            }
            Some(h) => h,
            None => self.draw_height(),
        };
        let dims = self.config.sizing.dimensions(total);
        let shape = self.config.shape;

        let trunk_poly = shape.polygon(&self.geometry, center, dims.trunk_size)?;
        let trunk = tree_part_feature(id, TreePart::Trunk, &trunk_poly, dims.trunk_height, 0.0);

        let canopy = if self.config.include_canopy {
            let canopy_poly = shape.polygon(&self.geometry, center, dims.canopy_size)?;
            Some(tree_part_feature(
                id,
                TreePart::Canopy,
                &canopy_poly,
                dims.canopy_height,
                dims.trunk_height,
            ))
        } else {
            None
        };
        Ok((trunk, canopy))
    }

    /// Place one tree at `point`.
    ///
    /// With no `total_height` the height is drawn from the configured range.
    pub fn place_single_tree<S: MapSurface + ?Sized>(
        &mut self,
        data: &mut SceneData,
        surface: &mut S,
        point: LngLat,
        total_height: Option<f64>,
    ) -> Result<TreeId> {
        let id = data.allocate_tree_id();
        let (trunk, canopy) = self.build_tree(&id, point, total_height)?;
        data.add_tree(trunk, canopy);

        self.commit(data, surface)?;
        debug!("Placed {} at {}", id, point);
        Ok(id)
    }

    fn plan_area(
        &self,
        data: &SceneData,
        area: &PlacementArea,
        count: usize,
        min_spacing: f64,
    ) -> Result<AreaPlan> {
        let polygon = area.to_polygon(&self.geometry)?;
        let bounds = self
            .geometry
            .bbox_of_polygon(&polygon)
            .ok_or(GeometryError::DegenerateRing { vertices: 0 })?;

        let area_m2 = self.geometry.polygon_area(&polygon);
        let max_possible = max_possible_trees(area_m2, min_spacing);
        let target = count.min(max_possible);
        if target < count {
            warn!(
                "Requested {} trees but only {} fit in {:.1} m² at {} m spacing",
                count, max_possible, area_m2, min_spacing
            );
        }

        let max_attempts = count
            .saturating_mul(self.config.attempts_per_tree)
            .min(max_possible.saturating_mul(self.config.attempts_per_capacity));

        // Existing trees near the area keep their spacing too
        let reference_lat = bounds.center().lat;
        let margin = bounds_margin(min_spacing, reference_lat);
        let neighborhood = GeoBounds::new(
            bounds.min_lng - margin.0,
            bounds.min_lat - margin.1,
            bounds.max_lng + margin.0,
            bounds.max_lat + margin.1,
        );
        let existing = data
            .tree_trunk_data()
            .iter()
            .filter_map(|f| f.footprint().ok())
            .filter_map(|p| self.geometry.centroid(&p))
            .filter(|c| neighborhood.contains(*c));
        let grid = SpatialGrid::from_points(existing, min_spacing, reference_lat);

        debug!(
            "Area plan: {:.1} m², target {}, budget {} attempts, {} nearby trees",
            area_m2,
            target,
            max_attempts,
            grid.len()
        );

        Ok(AreaPlan {
            sampler: Sampler {
                polygon,
                bounds,
                grid,
                min_spacing,
                max_attempts,
                max_failures: self.config.max_consecutive_failures,
                attempts: 0,
                failures: 0,
            },
            requested: count,
            max_possible,
            target,
        })
    }

    /// Generate up to `limit` trees from the plan's sampler
    fn fill(
        &mut self,
        data: &mut SceneData,
        plan: &mut AreaPlan,
        limit: usize,
    ) -> (Vec<TreeFeatures>, Option<StopReason>) {
        let mut trees = Vec::with_capacity(limit);
        while trees.len() < limit {
            let point = match plan.sampler.draw(&mut self.rng, &self.geometry) {
                Ok(p) => p,
                Err(stop) => return (trees, Some(stop)),
            };
            let id = data.allocate_tree_id();
            match self.build_tree(&id, point, None) {
                Ok(tree) => trees.push(tree),
                Err(e) => warn!("Skipping tree at {}: {}", point, e),
            }
        }
        (trees, None)
    }

    /// Fill an area with `count` trees at least `min_spacing` meters apart.
    ///
    /// Runs to completion and pushes one source update at the end.
    pub fn place_in_area<S: MapSurface + ?Sized>(
        &mut self,
        data: &mut SceneData,
        surface: &mut S,
        area: &PlacementArea,
        count: usize,
        min_spacing: f64,
    ) -> Result<PlacementReport> {
        let mut plan = self.plan_area(data, area, count, min_spacing)?;
        let target = plan.target;
        let (trees, stop) = self.fill(data, &mut plan, target);

        let placed = trees.len();
        data.add_trees(trees);
        self.commit(data, surface)?;

        let report = plan.report(placed, stop.unwrap_or(StopReason::Completed));
        self.finish(&report);
        Ok(report)
    }

    /// Batched variant of [`place_in_area`](Self::place_in_area).
    ///
    /// After every batch the new trees are committed, sources are pushed and
    /// control is yielded. Once `token` is no longer current the loop stops
    /// before generating another batch; committed trees stay.
    pub async fn place_in_area_batched<S: MapSurface + ?Sized>(
        &mut self,
        data: &mut SceneData,
        surface: &mut S,
        area: &PlacementArea,
        count: usize,
        min_spacing: f64,
        token: &OperationToken,
    ) -> Result<PlacementReport> {
        let mut plan = self.plan_area(data, area, count, min_spacing)?;
        let batch_size = self.config.batch_size.max(1);
        let mut placed = 0;
        let mut batch = 0;

        let stop = loop {
            if placed >= plan.target {
                break StopReason::Completed;
            }
            if !token.is_current() {
                info!(
                    "Placement {} superseded after {} trees",
                    token.generation(),
                    placed
                );
                break StopReason::Superseded;
            }

            let limit = batch_size.min(plan.target - placed);
            let (trees, stop) = self.fill(data, &mut plan, limit);
            placed += trees.len();
            batch += 1;
            data.add_trees(trees);
            self.commit(data, surface)?;
            debug!("Batch {}: {}/{} trees", batch, placed, plan.target);

            if let Some(stop) = stop {
                break stop;
            }
            tokio::task::yield_now().await;
        };

        let report = plan.report(placed, stop);
        self.finish(&report);
        Ok(report)
    }

    /// Place trees in an area, batching large requests.
    ///
    /// Starts a new operation on the engine's tracker, superseding any
    /// batched placement still in flight.
    pub async fn place_trees<S: MapSurface + ?Sized>(
        &mut self,
        data: &mut SceneData,
        surface: &mut S,
        area: &PlacementArea,
        count: usize,
        min_spacing: f64,
    ) -> Result<PlacementReport> {
        let token = self.operations.begin();
        if count >= self.config.batch_threshold {
            self.place_in_area_batched(data, surface, area, count, min_spacing, &token)
                .await
        } else {
            self.place_in_area(data, surface, area, count, min_spacing)
        }
    }

    fn finish(&self, report: &PlacementReport) {
        match report.stop {
            StopReason::Completed => info!(
                "Placed {} of {} trees ({} attempts)",
                report.placed, report.requested, report.attempts
            ),
            StopReason::AreaFull => warn!(
                "Area full after {} of {} trees ({} attempts)",
                report.placed, report.requested, report.attempts
            ),
            StopReason::AttemptLimit => warn!(
                "Attempt limit reached after {} of {} trees ({} attempts)",
                report.placed, report.requested, report.attempts
            ),
            StopReason::Superseded => {}
        }
        self.publish(TreeEvent::Placed {
            requested: report.requested,
            placed: report.placed,
        });
    }

    /// Remove the trees in `ids` and push the change
    pub(crate) fn remove_and_commit<S: MapSurface + ?Sized>(
        &self,
        data: &mut SceneData,
        surface: &mut S,
        ids: &std::collections::HashSet<TreeId>,
    ) -> Result<usize> {
        let removed = data.remove_trees(ids);
        if removed > 0 {
            self.commit(data, surface)?;
            self.publish(TreeEvent::Removed { count: removed });
        }
        Ok(removed)
    }
}

impl Default for TreePlacementEngine<GeoGeometry> {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

impl<G: GeometryLib> std::fmt::Debug for TreePlacementEngine<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreePlacementEngine")
            .field("config", &self.config)
            .field("generation", &self.operations.current())
            .finish()
    }
}

/// Spacing expressed in degrees (lng, lat) at `lat`
fn bounds_margin(min_spacing: f64, lat: f64) -> (f64, f64) {
    if !(min_spacing > 0.0) {
        return (0.0, 0.0);
    }
    let origin = LngLat::new(0.0, lat);
    let shifted = origin.offset_meters(min_spacing, min_spacing);
    (shifted.lng - origin.lng, shifted.lat - origin.lat)
}
