//! Tree deletion by pick point, polygon or brush.
//!
//! Trunk and canopy are removed together through their shared id.

use citycanopy_core::feature::FeatureExt;
use citycanopy_core::surface::{CANOPY_LAYER, TRUNK_LAYER};
use citycanopy_core::{GeometryLib, MapSurface, Result, SceneData, ScreenPoint, TreeId};
use geo::Polygon;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::area::PlacementArea;
use crate::engine::TreePlacementEngine;

impl<G: GeometryLib> TreePlacementEngine<G> {
    /// Delete the tree rendered under `point`.
    ///
    /// Only the first picked trunk or canopy counts. Returns the number of
    /// trees removed (0 or 1).
    pub fn delete_at_point<S: MapSurface + ?Sized>(
        &self,
        data: &mut SceneData,
        surface: &mut S,
        point: ScreenPoint,
    ) -> Result<usize> {
        let hits = surface.query_rendered_features(point, &[TRUNK_LAYER, CANOPY_LAYER]);
        let Some(id) = hits.first().and_then(FeatureExt::tree_id) else {
            debug!("No tree under ({}, {})", point.x, point.y);
            return Ok(0);
        };

        let ids = HashSet::from([id]);
        self.remove_and_commit(data, surface, &ids)
    }

    /// Ids of trees whose trunk centroid lies in `polygon`
    pub fn trees_in_polygon(&self, data: &SceneData, polygon: &Polygon<f64>) -> HashSet<TreeId> {
        let geometry = self.geometry();
        data.tree_trunk_data()
            .iter()
            .filter_map(|trunk| {
                let id = trunk.tree_id()?;
                let footprint = match trunk.footprint() {
                    Ok(p) => p,
                    Err(e) => {
                        debug!("Trunk {} has no usable footprint: {}", id, e);
                        return None;
                    }
                };
                let centroid = geometry.centroid(&footprint)?;
                geometry.point_in_polygon(centroid, polygon).then_some(id)
            })
            .collect()
    }

    /// Delete every tree whose trunk centroid lies inside `polygon`
    pub fn delete_in_polygon<S: MapSurface + ?Sized>(
        &self,
        data: &mut SceneData,
        surface: &mut S,
        polygon: &Polygon<f64>,
    ) -> Result<usize> {
        let ids = self.trees_in_polygon(data, polygon);
        let removed = self.remove_and_commit(data, surface, &ids)?;
        info!("Deleted {} trees in polygon", removed);
        Ok(removed)
    }

    /// Delete every tree inside a brush stroke or polygon
    pub fn delete_in_area<S: MapSurface + ?Sized>(
        &self,
        data: &mut SceneData,
        surface: &mut S,
        area: &PlacementArea,
    ) -> Result<usize> {
        let polygon = area.to_polygon(self.geometry())?;
        self.delete_in_polygon(data, surface, &polygon)
    }
}
