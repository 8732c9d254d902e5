//! # CityCanopy Placement
//!
//! Tree generation for the scene editor: single trees, spaced fills of
//! brush strokes and polygons, and deletion.
//!
//! ## Modules
//!
//! - [`grid`] - spatial hash for minimum-spacing checks
//! - [`sizing`] - tree heights and footprint sizes
//! - [`shape`] - circle, square and triangle footprints
//! - [`area`] - brush and polygon regions
//! - [`engine`] - the placement engine
//! - deletion lives on the engine (`delete_at_point`, `delete_in_polygon`,
//!   `delete_in_area`)

pub mod area;
mod delete;
pub mod engine;
pub mod grid;
pub mod shape;
pub mod sizing;

pub use area::PlacementArea;
pub use engine::{
    max_possible_trees, PlacementConfig, PlacementReport, StopReason, TreePlacementEngine,
};
pub use grid::SpatialGrid;
pub use shape::TreeShape;
pub use sizing::{TreeDimensions, TreeSizing};
