//! Trunk/canopy grouping by tree id.

use citycanopy_core::feature::FeatureExt;
use citycanopy_core::TreeId;
use geojson::Feature;
use std::collections::HashMap;
use tracing::warn;

/// A trunk and the canopy sharing its id, if any.
#[derive(Debug, Clone, Copy)]
pub struct TreePair<'a> {
    pub trunk: &'a Feature,
    pub canopy: Option<&'a Feature>,
}

/// Pair every trunk with its canopy, in trunk order.
///
/// Canopies without a matching trunk are dropped.
pub fn pair_trees<'a>(trunks: &'a [Feature], canopies: &'a [Feature]) -> Vec<TreePair<'a>> {
    let mut by_id: HashMap<TreeId, &'a Feature> = HashMap::with_capacity(canopies.len());
    for canopy in canopies {
        if let Some(id) = canopy.tree_id() {
            by_id.entry(id).or_insert(canopy);
        }
    }

    let pairs: Vec<TreePair<'a>> = trunks
        .iter()
        .map(|trunk| TreePair {
            trunk,
            canopy: trunk.tree_id().and_then(|id| by_id.remove(&id)),
        })
        .collect();

    if !by_id.is_empty() {
        warn!("{} canopies have no matching trunk", by_id.len());
    }
    pairs
}
