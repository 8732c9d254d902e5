//! Error handling for CityCanopy
//!
//! Provides error types for all layers of the scene editor core:
//! - Data errors (loading/parsing feature collections)
//! - Geometry errors (degenerate or unsupported shapes)
//! - Surface errors (map source/layer/readiness problems)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Data layer error type
///
/// Raised while loading or saving feature collections. A data error always
/// means the scene was left untouched.
#[derive(Error, Debug, Clone)]
pub enum DataError {
    /// Input text is not valid JSON
    #[error("Invalid JSON: {reason}")]
    InvalidJson {
        /// Parser message.
        reason: String,
    },

    /// Input is valid JSON but not a GeoJSON FeatureCollection
    #[error("Not a FeatureCollection: {found}")]
    NotAFeatureCollection {
        /// What was found instead.
        found: String,
    },

    /// The `features` member is missing or not an array
    #[error("FeatureCollection is missing a 'features' array")]
    MissingFeatures,
}

/// Geometry error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Feature has no geometry at all
    #[error("Feature has no geometry")]
    MissingGeometry,

    /// Geometry kind is not a polygonal footprint
    #[error("Unsupported geometry type: {kind}")]
    UnsupportedGeometry {
        /// GeoJSON geometry type name.
        kind: String,
    },

    /// Ring has fewer than three distinct vertices
    #[error("Degenerate ring with {vertices} vertices")]
    DegenerateRing {
        /// Number of distinct vertices found.
        vertices: usize,
    },

    /// A coordinate or size is NaN or infinite
    #[error("Non-finite value for {what}")]
    NonFinite {
        /// Which quantity was non-finite.
        what: String,
    },
}

/// Map surface error type
///
/// Represents failures talking to the external rendering surface.
#[derive(Error, Debug, Clone)]
pub enum SurfaceError {
    /// Style never finished loading within the polling budget
    #[error("Map style not ready after {attempts} attempts")]
    StyleNotReady {
        /// Number of readiness checks performed.
        attempts: u32,
    },

    /// Source id is not registered on the surface
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The source id.
        id: String,
    },

    /// Source id is already registered
    #[error("Source already exists: {id}")]
    DuplicateSource {
        /// The source id.
        id: String,
    },
}

/// Main error type for CityCanopy
///
/// A unified error type that can represent any error from the core layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Data error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Surface error
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
