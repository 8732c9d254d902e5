//! # CityCanopy
//!
//! Scene editor core for 3D city maps:
//! - Procedural tree placement with minimum spacing (single, brush, polygon)
//! - Building coloring by a numeric property with density-aware color stops
//! - STL export of trunk and canopy extrusions
//!
//! ## Architecture
//!
//! CityCanopy is organized as a workspace with multiple crates:
//!
//! 1. **citycanopy-core** - Scene data, map surface and geometry interfaces, events
//! 2. **citycanopy-placement** - Spatial grid and tree placement engine
//! 3. **citycanopy-energy** - Energy statistics, color stops and legend
//! 4. **citycanopy-export** - STL mesh export
//! 5. **citycanopy-settings** - Configuration files
//! 6. **citycanopy** - [`EditorSession`] and the command line tool

pub mod cli;
pub mod session;

pub use session::EditorSession;

pub use citycanopy_core::{
    Error, EventBus, EventFilter, InMemorySurface, LngLat, MapSurface, Result, SceneData,
    SceneEvent, ScreenPoint, TreeId,
};
pub use citycanopy_energy::{EnergyColorModel, EnergyColoring, Palette};
pub use citycanopy_export::{ExportSummary, MeshExporter};
pub use citycanopy_placement::{PlacementArea, PlacementReport, TreePlacementEngine, TreeShape};
pub use citycanopy_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr
/// - RUST_LOG environment variable support
///
/// `verbose` lowers the default level from INFO to DEBUG.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
