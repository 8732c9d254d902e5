//! # Mesh Exporter
//!
//! Writes trunk/canopy pairs as one ASCII STL solid per tree, projected into
//! a local metric frame shared by every tree of the export.
//!
//! Output strategy by tree count:
//! - up to `chunk_threshold`: one file, built in memory
//! - above it: `<stem>_part<k>.stl` files of `chunk_size` trees each
//! - above `streaming_threshold`: each file is written incrementally,
//!   yielding every `stream_batch_size` trees
//!
//! An in-memory build that would exceed `max_buffer_bytes` falls back to
//! the incremental writer.

use citycanopy_core::feature::FeatureExt;
use citycanopy_core::{EventBus, ExportEvent, SceneEvent};
use geojson::Feature;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ExportError, Result};
use crate::mesh::{distinct_ring, extrude_ring, Facet};
use crate::pairing::{pair_trees, TreePair};
use crate::projection::LocalProjection;
use crate::stl::{to_stl_triangle, write_solid, FACET_BYTES, SOLID_OVERHEAD_BYTES};

/// Export tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Tree counts above this are split into several files
    pub chunk_threshold: usize,
    /// Trees per chunk file
    pub chunk_size: usize,
    /// Tree counts above this are written incrementally
    pub streaming_threshold: usize,
    /// Trees written between yields when streaming
    pub stream_batch_size: usize,
    /// Largest in-memory mesh text (bytes)
    pub max_buffer_bytes: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: 50_000,
            chunk_size: 25_000,
            streaming_threshold: 200_000,
            stream_batch_size: 1_000,
            max_buffer_bytes: 512 * 1024 * 1024,
        }
    }
}

/// One chunk of an in-memory export.
#[derive(Debug, Clone, PartialEq)]
pub struct StlChunk {
    /// 1-based chunk number
    pub index: usize,
    /// Solid number of the chunk's first tree
    pub start_index: usize,
    pub trees: usize,
    pub content: String,
}

/// Result of writing an export to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub trees: usize,
    pub files: Vec<PathBuf>,
    /// At least one file was written incrementally
    pub streamed: bool,
}

/// Name of the k-th chunk file next to `path` (`<stem>_part<k>.stl`)
pub fn chunk_path(path: &Path, k: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trees".to_string());
    path.with_file_name(format!("{}_part{}.stl", stem, k))
}

#[derive(Debug, Default)]
pub struct MeshExporter {
    config: ExportConfig,
    events: Option<Arc<EventBus>>,
}

impl MeshExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            events: None,
        }
    }

    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn publish(&self, event: ExportEvent) {
        if let Some(bus) = &self.events {
            bus.publish(SceneEvent::Export(event));
        }
    }

    /// Pairs and shared projection, or `NoTrees`
    fn prepare<'a>(
        &self,
        trunks: &'a [Feature],
        canopies: &'a [Feature],
    ) -> Result<(Vec<TreePair<'a>>, LocalProjection)> {
        let projection = LocalProjection::from_trunks(trunks).ok_or(ExportError::NoTrees)?;
        Ok((pair_trees(trunks, canopies), projection))
    }

    /// Triangles of one tree (trunk then canopy)
    pub fn tree_facets(pair: &TreePair<'_>, projection: &LocalProjection) -> Vec<Facet> {
        let mut facets = part_facets(pair.trunk, projection);
        if let Some(canopy) = pair.canopy {
            facets.extend(part_facets(canopy, projection));
        }
        facets
    }

    /// Upper bound of the ASCII size of `pairs`
    pub fn estimate_bytes(pairs: &[TreePair<'_>]) -> usize {
        pairs
            .iter()
            .map(|pair| {
                let facets: usize = std::iter::once(pair.trunk)
                    .chain(pair.canopy)
                    .map(part_facet_count)
                    .sum();
                facets * FACET_BYTES + SOLID_OVERHEAD_BYTES
            })
            .sum()
    }

    fn render_pairs(
        &self,
        pairs: &[TreePair<'_>],
        projection: &LocalProjection,
        start_index: usize,
    ) -> Result<String> {
        let estimated = Self::estimate_bytes(pairs);
        if estimated > self.config.max_buffer_bytes {
            return Err(ExportError::BufferTooLarge {
                estimated,
                limit: self.config.max_buffer_bytes,
            });
        }

        let mut out = String::with_capacity(estimated);
        for (offset, pair) in pairs.iter().enumerate() {
            let facets = Self::tree_facets(pair, projection);
            write_solid(&mut out, &solid_name(start_index + offset), &facets)?;
        }
        Ok(out)
    }

    /// ASCII STL of every tree, solids numbered from `start_index`
    pub fn export_trees(
        &self,
        trunks: &[Feature],
        canopies: &[Feature],
        start_index: usize,
    ) -> Result<String> {
        let (pairs, projection) = self.prepare(trunks, canopies)?;
        self.render_pairs(&pairs, &projection, start_index)
    }

    /// In-memory export split into chunks above `chunk_threshold`.
    ///
    /// Every chunk uses the same projection and numbers its solids from its
    /// own offset.
    pub fn export_chunks(&self, trunks: &[Feature], canopies: &[Feature]) -> Result<Vec<StlChunk>> {
        let (pairs, projection) = self.prepare(trunks, canopies)?;
        let chunk_size = if pairs.len() > self.config.chunk_threshold {
            self.config.chunk_size.max(1)
        } else {
            pairs.len().max(1)
        };

        pairs
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| {
                let start_index = i * chunk_size;
                Ok(StlChunk {
                    index: i + 1,
                    start_index,
                    trees: chunk.len(),
                    content: self.render_pairs(chunk, &projection, start_index)?,
                })
            })
            .collect()
    }

    fn write_pairs<W: Write>(
        writer: &mut W,
        pairs: &[TreePair<'_>],
        projection: &LocalProjection,
        start_index: usize,
    ) -> Result<()> {
        let mut solid = String::new();
        for (offset, pair) in pairs.iter().enumerate() {
            solid.clear();
            let facets = Self::tree_facets(pair, projection);
            write_solid(&mut solid, &solid_name(start_index + offset), &facets)?;
            writer.write_all(solid.as_bytes())?;
        }
        Ok(())
    }

    /// Write every tree to `writer` one solid at a time
    pub fn write_trees<W: Write>(
        &self,
        writer: &mut W,
        trunks: &[Feature],
        canopies: &[Feature],
        start_index: usize,
    ) -> Result<usize> {
        let (pairs, projection) = self.prepare(trunks, canopies)?;
        Self::write_pairs(writer, &pairs, &projection, start_index)?;
        writer.flush()?;
        Ok(pairs.len())
    }

    async fn stream_pairs<W: Write>(
        &self,
        writer: &mut W,
        pairs: &[TreePair<'_>],
        projection: &LocalProjection,
        start_index: usize,
    ) -> Result<()> {
        let batch = self.config.stream_batch_size.max(1);
        for (i, chunk) in pairs.chunks(batch).enumerate() {
            Self::write_pairs(writer, chunk, projection, start_index + i * batch)?;
            tokio::task::yield_now().await;
        }
        writer.flush()?;
        Ok(())
    }

    /// Incremental export that yields every `stream_batch_size` trees
    pub async fn export_streaming<W: Write>(
        &self,
        writer: &mut W,
        trunks: &[Feature],
        canopies: &[Feature],
        start_index: usize,
    ) -> Result<usize> {
        let (pairs, projection) = self.prepare(trunks, canopies)?;
        self.stream_pairs(writer, &pairs, &projection, start_index)
            .await?;
        Ok(pairs.len())
    }

    /// Write one file, in memory when possible; returns whether it streamed
    async fn write_file(
        &self,
        path: &Path,
        pairs: &[TreePair<'_>],
        projection: &LocalProjection,
        start_index: usize,
        stream: bool,
    ) -> Result<bool> {
        if !stream {
            match self.render_pairs(pairs, projection, start_index) {
                Ok(content) => {
                    std::fs::write(path, content)?;
                    return Ok(false);
                }
                Err(e) if e.is_buffer_limit() => {
                    warn!("{}; streaming {} instead", e, path.display());
                }
                Err(e) => return Err(e),
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.stream_pairs(&mut writer, pairs, projection, start_index)
            .await?;
        Ok(true)
    }

    /// Export to `path`, chunking and streaming as the tree count requires
    pub async fn export_to_path(
        &self,
        path: &Path,
        trunks: &[Feature],
        canopies: &[Feature],
    ) -> Result<ExportSummary> {
        let (pairs, projection) = self.prepare(trunks, canopies)?;
        let total = pairs.len();
        let stream = total > self.config.streaming_threshold;

        let mut summary = ExportSummary {
            trees: total,
            files: Vec::new(),
            streamed: false,
        };

        if total <= self.config.chunk_threshold {
            summary.streamed = self
                .write_file(path, &pairs, &projection, 0, stream)
                .await?;
            summary.files.push(path.to_path_buf());
        } else {
            let chunk_size = self.config.chunk_size.max(1);
            let chunks = total.div_ceil(chunk_size);
            info!(
                "Splitting {} trees into {} files of up to {}",
                total, chunks, chunk_size
            );

            for (i, chunk) in pairs.chunks(chunk_size).enumerate() {
                let file = chunk_path(path, i + 1);
                let streamed = self
                    .write_file(&file, chunk, &projection, i * chunk_size, stream)
                    .await?;
                summary.streamed |= streamed;
                debug!("Wrote chunk {}/{} to {}", i + 1, chunks, file.display());
                self.publish(ExportEvent::ChunkWritten {
                    index: i + 1,
                    total: chunks,
                    path: file.clone(),
                });
                summary.files.push(file);
            }
        }

        info!(
            "Exported {} trees to {} file(s)",
            summary.trees,
            summary.files.len()
        );
        self.publish(ExportEvent::Finished {
            trees: summary.trees,
            files: summary.files.clone(),
        });
        Ok(summary)
    }

    /// Binary STL of every tree; returns the triangle count
    pub fn export_binary<W: Write>(
        &self,
        writer: &mut W,
        trunks: &[Feature],
        canopies: &[Feature],
    ) -> Result<usize> {
        let (pairs, projection) = self.prepare(trunks, canopies)?;
        let triangles: Vec<stl_io::Triangle> = pairs
            .iter()
            .flat_map(|pair| Self::tree_facets(pair, &projection))
            .map(|facet| to_stl_triangle(&facet))
            .collect();
        stl_io::write_stl(writer, triangles.iter())?;
        Ok(triangles.len())
    }
}

/// Solid name for the n-th tree
pub fn solid_name(n: usize) -> String {
    format!("tree_{}", n)
}

/// Projected exterior ring of a trunk or canopy, or `None` with a diagnostic
fn projected_ring(feature: &Feature, projection: &LocalProjection) -> Option<Vec<(f64, f64)>> {
    match feature.footprint() {
        Ok(polygon) => Some(
            polygon
                .exterior()
                .0
                .iter()
                .map(|c| projection.project((*c).into()))
                .collect(),
        ),
        Err(e) => {
            warn!("Skipping tree part without usable footprint: {}", e);
            None
        }
    }
}

fn part_facets(feature: &Feature, projection: &LocalProjection) -> Vec<Facet> {
    projected_ring(feature, projection)
        .map(|ring| extrude_ring(&ring, feature.base(), feature.height()))
        .unwrap_or_default()
}

fn part_facet_count(feature: &Feature) -> usize {
    let Ok(polygon) = feature.footprint() else {
        return 0;
    };
    let ring: Vec<(f64, f64)> = polygon.exterior().0.iter().map(|c| (c.x, c.y)).collect();
    let n = distinct_ring(&ring).len();
    if n < 3 {
        0
    } else {
        4 * n - 4
    }
}
