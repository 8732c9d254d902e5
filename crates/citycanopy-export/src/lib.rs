//! # CityCanopy Export
//!
//! STL mesh export of the scene's trees.
//!
//! Each tree becomes one named solid holding its trunk and canopy
//! extrusions. Coordinates are meters in a local frame centered on the
//! trunks' bounding box.

pub mod error;
pub mod exporter;
pub mod mesh;
pub mod pairing;
pub mod projection;
pub mod stl;

pub use error::{ExportError, Result};
pub use exporter::{chunk_path, solid_name, ExportConfig, ExportSummary, MeshExporter, StlChunk};
pub use mesh::{extrude_ring, Facet};
pub use pairing::{pair_trees, TreePair};
pub use projection::LocalProjection;
pub use stl::format_stl_float;
