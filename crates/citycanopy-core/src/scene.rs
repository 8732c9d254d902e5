//! # Scene Data
//!
//! The data layer: the four feature collections (buildings, trunks,
//! canopies, roads) and the tree id allocator, owned by one value that is
//! passed explicitly to every engine operation.
//!
//! Collections are replaced wholesale on load/reset, mutated incrementally
//! by placement and deletion, and serialized wholesale on save.

use geojson::{Feature, FeatureCollection, JsonValue};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::{DataError, Result, SurfaceError};
use crate::feature::{FeatureExt, FeatureRole};
use crate::surface::{
    collection_of, MapSurface, BUILDING_SOURCE, CANOPY_SOURCE, ROAD_SOURCE, TRUNK_SOURCE,
};
use crate::types::{TreeId, TreeIdAllocator};

/// Counts reported after a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub buildings: usize,
    pub trunks: usize,
    pub canopies: usize,
    pub roads: usize,
    /// Entries of `features` that were not valid GeoJSON features
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct Partition {
    buildings: Vec<Feature>,
    trunks: Vec<Feature>,
    canopies: Vec<Feature>,
    roads: Vec<Feature>,
}

impl Partition {
    fn route(&mut self, feature: Feature) {
        match feature.role() {
            FeatureRole::Building => self.buildings.push(feature),
            FeatureRole::Trunk => self.trunks.push(feature),
            FeatureRole::Canopy => self.canopies.push(feature),
            FeatureRole::Road => self.roads.push(feature),
        }
    }
}

/// Owned scene state.
#[derive(Debug, Clone, Default)]
pub struct SceneData {
    buildings: Vec<Feature>,
    trunks: Vec<Feature>,
    canopies: Vec<Feature>,
    roads: Vec<Feature>,
    ids: TreeIdAllocator,
}

impl SceneData {
    /// Empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a GeoJSON FeatureCollection and replace every collection.
    ///
    /// Parsing completes before anything is replaced, so on error the scene
    /// is unchanged.
    pub fn load_geojson_str(&mut self, text: &str) -> std::result::Result<LoadSummary, DataError> {
        let root: JsonValue = serde_json::from_str(text).map_err(|e| DataError::InvalidJson {
            reason: e.to_string(),
        })?;

        let JsonValue::Object(mut object) = root else {
            return Err(DataError::NotAFeatureCollection {
                found: json_kind(&root).to_string(),
            });
        };

        if let Some(JsonValue::String(kind)) = object.get("type") {
            if kind != "FeatureCollection" {
                return Err(DataError::NotAFeatureCollection {
                    found: kind.clone(),
                });
            }
        }

        let Some(JsonValue::Array(entries)) = object.remove("features") else {
            return Err(DataError::MissingFeatures);
        };

        let mut partition = Partition::default();
        let mut skipped = 0;
        for (index, entry) in entries.into_iter().enumerate() {
            match Feature::from_json_value(entry) {
                Ok(feature) => partition.route(feature),
                Err(e) => {
                    warn!("Skipping feature {}: {}", index, e);
                    skipped += 1;
                }
            }
        }

        let summary = LoadSummary {
            buildings: partition.buildings.len(),
            trunks: partition.trunks.len(),
            canopies: partition.canopies.len(),
            roads: partition.roads.len(),
            skipped,
        };
        self.replace(partition);

        info!(
            "Loaded {} buildings, {} trunks, {} canopies, {} roads ({} skipped)",
            summary.buildings, summary.trunks, summary.canopies, summary.roads, summary.skipped
        );
        Ok(summary)
    }

    /// Replace collections from an already-parsed feature list
    pub fn load_features(&mut self, features: Vec<Feature>) -> LoadSummary {
        let mut partition = Partition::default();
        for feature in features {
            partition.route(feature);
        }
        let summary = LoadSummary {
            buildings: partition.buildings.len(),
            trunks: partition.trunks.len(),
            canopies: partition.canopies.len(),
            roads: partition.roads.len(),
            skipped: 0,
        };
        self.replace(partition);
        summary
    }

    fn replace(&mut self, partition: Partition) {
        self.buildings = partition.buildings;
        self.trunks = partition.trunks;
        self.canopies = partition.canopies;
        self.roads = partition.roads;

        self.ids.reset();
        for id in self
            .trunks
            .iter()
            .chain(self.canopies.iter())
            .filter_map(FeatureExt::tree_id)
        {
            self.ids.observe(&id);
        }
    }

    /// Every feature in one collection (buildings, trunks, canopies, roads)
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .buildings
            .iter()
            .chain(self.trunks.iter())
            .chain(self.canopies.iter())
            .chain(self.roads.iter())
            .cloned()
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Save format: pretty-printed GeoJSON
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_feature_collection())?)
    }

    /// Clear all collections and restart tree numbering
    pub fn reset(&mut self) {
        self.buildings.clear();
        self.trunks.clear();
        self.canopies.clear();
        self.roads.clear();
        self.ids.reset();
        debug!("Scene reset");
    }

    pub fn building_data(&self) -> &[Feature] {
        &self.buildings
    }

    pub fn tree_trunk_data(&self) -> &[Feature] {
        &self.trunks
    }

    pub fn tree_canopy_data(&self) -> &[Feature] {
        &self.canopies
    }

    pub fn road_data(&self) -> &[Feature] {
        &self.roads
    }

    /// Trees in the scene (one trunk per tree)
    pub fn tree_count(&self) -> usize {
        self.trunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
            && self.trunks.is_empty()
            && self.canopies.is_empty()
            && self.roads.is_empty()
    }

    /// Next unique tree id
    pub fn allocate_tree_id(&mut self) -> TreeId {
        self.ids.allocate()
    }

    /// Add one tree: a trunk and an optional canopy sharing an id
    pub fn add_tree(&mut self, trunk: Feature, canopy: Option<Feature>) {
        self.trunks.push(trunk);
        if let Some(canopy) = canopy {
            self.canopies.push(canopy);
        }
    }

    /// Add a batch of trees
    pub fn add_trees<I>(&mut self, trees: I)
    where
        I: IntoIterator<Item = (Feature, Option<Feature>)>,
    {
        for (trunk, canopy) in trees {
            self.add_tree(trunk, canopy);
        }
    }

    /// Ids of all trees (trunk order)
    pub fn tree_ids(&self) -> impl Iterator<Item = TreeId> + '_ {
        self.trunks.iter().filter_map(FeatureExt::tree_id)
    }

    /// Remove every trunk and canopy whose id is in `ids`.
    ///
    /// Each collection is filtered in a single pass. Returns the number of
    /// distinct trees removed.
    pub fn remove_trees(&mut self, ids: &HashSet<TreeId>) -> usize {
        if ids.is_empty() {
            return 0;
        }

        let mut removed: HashSet<TreeId> = HashSet::new();
        let mut keep = |f: &Feature| match f.tree_id() {
            Some(id) if ids.contains(&id) => {
                removed.insert(id);
                false
            }
            _ => true,
        };
        self.trunks.retain(&mut keep);
        self.canopies.retain(&mut keep);

        debug!("Removed {} trees", removed.len());
        removed.len()
    }

    /// Register all four sources on a fresh surface
    pub fn install_sources<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> std::result::Result<(), SurfaceError> {
        surface.add_source(BUILDING_SOURCE, collection_of(&self.buildings))?;
        surface.add_source(TRUNK_SOURCE, collection_of(&self.trunks))?;
        surface.add_source(CANOPY_SOURCE, collection_of(&self.canopies))?;
        surface.add_source(ROAD_SOURCE, collection_of(&self.roads))?;
        Ok(())
    }

    /// Push trunk and canopy collections to the surface
    pub fn sync_tree_sources<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> std::result::Result<(), SurfaceError> {
        surface.set_source_data(TRUNK_SOURCE, collection_of(&self.trunks))?;
        surface.set_source_data(CANOPY_SOURCE, collection_of(&self.canopies))?;
        Ok(())
    }

    /// Push every collection to the surface
    pub fn sync_all_sources<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> std::result::Result<(), SurfaceError> {
        surface.set_source_data(BUILDING_SOURCE, collection_of(&self.buildings))?;
        self.sync_tree_sources(surface)?;
        surface.set_source_data(ROAD_SOURCE, collection_of(&self.roads))?;
        Ok(())
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
