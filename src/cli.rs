//! Command line interface.

use anyhow::{bail, Context, Result};
use citycanopy_core::{
    EventCategory, EventFilter, ExportEvent, GeoGeometry, GeometryLib, LngLat, SceneEvent,
    TreeEvent,
};
use citycanopy_energy::{format_legend_value, Palette};
use citycanopy_placement::{PlacementArea, StopReason, TreeShape};
use citycanopy_settings::Config;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::session::EditorSession;

#[derive(Debug, Parser)]
#[command(
    name = "citycanopy",
    version,
    about = "Tree placement, energy coloring and STL export for city scenes"
)]
pub struct Cli {
    /// Configuration file (JSON or TOML)
    #[arg(long, global = true, env = "CITYCANOPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize a scene file
    Info {
        file: PathBuf,
    },
    /// Fill an area with trees and save the scene
    Plant(PlantArgs),
    /// Show energy statistics, color stops and legend
    Stats {
        file: PathBuf,
        /// Building property to analyze
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        palette: Option<Palette>,
    },
    /// Export the scene's trees as STL
    ExportStl {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Binary STL in a single file
        #[arg(long)]
        binary: bool,
    },
}

#[derive(Debug, Args)]
pub struct PlantArgs {
    pub file: PathBuf,

    /// Polygon vertices as "lng,lat;lng,lat;..."
    #[arg(long, conflicts_with_all = ["center", "radius"])]
    pub polygon: Option<String>,

    /// Brush center as "lng,lat"
    #[arg(long, requires = "radius")]
    pub center: Option<String>,

    /// Brush radius in meters
    #[arg(long)]
    pub radius: Option<f64>,

    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Minimum spacing in meters
    #[arg(long)]
    pub spacing: Option<f64>,

    #[arg(long)]
    pub shape: Option<TreeShape>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file (defaults to overwriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parse "lng,lat"
pub fn parse_lnglat(text: &str) -> Result<LngLat> {
    let (lng, lat) = text
        .split_once(',')
        .with_context(|| format!("Expected 'lng,lat', got '{}'", text))?;
    let lng: f64 = lng.trim().parse().with_context(|| format!("Bad longitude '{}'", lng))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("Bad latitude '{}'", lat))?;
    let point = LngLat::new(lng, lat);
    if !point.is_finite() {
        bail!("Coordinates must be finite: '{}'", text);
    }
    Ok(point)
}

/// Parse "lng,lat;lng,lat;..." into vertices
pub fn parse_vertices(text: &str) -> Result<Vec<LngLat>> {
    text.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_lnglat)
        .collect()
}

impl PlantArgs {
    /// Area selected by `--polygon` or `--center`/`--radius`
    pub fn area(&self, shape: TreeShape) -> Result<PlacementArea> {
        match (&self.polygon, &self.center, self.radius) {
            (Some(polygon), _, _) => {
                let vertices = parse_vertices(polygon)?;
                let polygon = GeoGeometry::new().make_polygon(&vertices)?;
                Ok(PlacementArea::from(polygon))
            }
            (None, Some(center), Some(radius)) => {
                if !(radius > 0.0) {
                    bail!("Brush radius must be positive, got {}", radius);
                }
                Ok(PlacementArea::brush(parse_lnglat(center)?, radius, shape))
            }
            _ => bail!("Give either --polygon or --center with --radius"),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path).context("Failed to load configuration")
}

async fn open_session(config: Config, file: &Path, seed: Option<u64>) -> Result<EditorSession> {
    let mut session = EditorSession::headless(config);
    if let Some(seed) = seed {
        session = session.with_seed(seed);
    }
    session.wait_for_map().await?;
    session.load_file(file)?;
    Ok(session)
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Info { file } => {
            let session = open_session(config, &file, None).await?;
            let data = session.data();
            println!("{}", file.display());
            println!("  buildings: {}", data.building_data().len());
            println!("  trees:     {}", data.tree_count());
            println!("  canopies:  {}", data.tree_canopy_data().len());
            println!("  roads:     {}", data.road_data().len());
            let columns = session.energy_columns();
            if !columns.is_empty() {
                println!("  numeric building columns: {}", columns.join(", "));
            }
        }
        Command::Plant(args) => {
            if let Some(shape) = args.shape {
                config.placement.shape = shape;
            }
            let area = args.area(config.placement.shape)?;
            let mut session = open_session(config, &args.file, args.seed).await?;

            let progress = session.events().subscribe(
                EventFilter::Categories(vec![EventCategory::Trees]),
                |event| {
                    if let SceneEvent::Trees(TreeEvent::CountChanged { trees }) = event {
                        info!("{} trees in scene", trees);
                    }
                },
            );
            let report = session.place_in_area(&area, args.count, args.spacing).await;
            session.events().unsubscribe(progress);
            let report = report?;
            println!(
                "Placed {} of {} trees (capacity {}, {} attempts)",
                report.placed, report.requested, report.max_possible, report.attempts
            );
            match report.stop {
                StopReason::AreaFull => warn!("Area is full"),
                StopReason::AttemptLimit => warn!("Gave up before reaching the target"),
                _ => {}
            }

            let output = args.output.as_deref().unwrap_or(&args.file);
            session.save_file(output)?;
        }
        Command::Stats {
            file,
            column,
            palette,
        } => {
            if let Some(column) = column {
                config.energy.column = column;
            }
            if let Some(palette) = palette {
                config.energy.palette = palette;
            }
            let mut session = open_session(config, &file, None).await?;
            let coloring = session.recolor()?;

            let stats = &coloring.stats;
            if stats.has_data {
                println!(
                    "{}: {} values in [{}, {}]",
                    stats.column, stats.count, stats.min, stats.max
                );
            } else {
                println!("{}: no numeric values, using default range", stats.column);
            }
            println!(
                "dense range: [{}, {}]{}",
                coloring.dense.start,
                coloring.dense.end,
                if coloring.dense.uniform { " (uniform)" } else { "" }
            );
            println!("stops:");
            for stop in &coloring.stops {
                println!("  {:>14}  {}", format_legend_value(stop.value), stop.color);
            }
            println!("legend:");
            for entry in &coloring.legend {
                println!("  {}  {}", entry.color, entry.label);
            }
        }
        Command::ExportStl {
            file,
            output,
            binary,
        } => {
            let session = open_session(config, &file, None).await?;
            if binary {
                let triangles = session.export_binary_stl(&output)?;
                println!("Wrote {} triangles to {}", triangles, output.display());
            } else {
                let mut progress = session.events().receiver();
                let summary = session.export_stl(&output).await?;
                while let Ok(event) = progress.try_recv() {
                    if let SceneEvent::Export(ExportEvent::ChunkWritten { index, total, path }) =
                        event
                    {
                        println!("  part {}/{}: {}", index, total, path.display());
                    }
                }
                println!(
                    "Exported {} trees to {} file(s){}",
                    summary.trees,
                    summary.files.len(),
                    if summary.streamed { " (streamed)" } else { "" }
                );
            }
        }
    }

    Ok(())
}
