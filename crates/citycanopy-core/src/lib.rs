//! # CityCanopy Core
//!
//! Core types, the scene data layer and the interfaces to external
//! collaborators (map surface, geometry library, sun position) shared by the
//! placement, energy and export crates.

pub mod error;
pub mod event_bus;
pub mod feature;
pub mod geometry;
pub mod operation;
pub mod scene;
pub mod sun;
pub mod surface;
pub mod types;

pub use error::{DataError, Error, GeometryError, Result, SurfaceError};

pub use event_bus::{
    DataEvent, EnergyEvent, EventBus, EventCategory, EventFilter, ExportEvent, SceneEvent,
    SubscriptionId, TreeEvent,
};

pub use feature::{
    polygon_feature, polygon_to_geometry, road_feature, tree_part_feature, FeatureExt,
    FeatureRole, TreePart,
};
pub use geometry::{GeoGeometry, GeometryLib};
pub use operation::{OperationToken, OperationTracker};
pub use scene::{LoadSummary, SceneData};
pub use sun::{apply_sun_light, SunLight, SunPosition, SunPositionProvider};
pub use surface::{wait_for_style, InMemorySurface, MapSurface};
pub use types::{
    meters_per_degree_lng, GeoBounds, LngLat, ScreenPoint, TreeId, TreeIdAllocator,
    METERS_PER_DEGREE,
};

// Re-export the GeoJSON and geometry crates so downstream crates agree on versions
pub use geo;
pub use geojson;
