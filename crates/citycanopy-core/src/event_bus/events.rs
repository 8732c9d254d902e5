//! Event type definitions for the scene event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root event enum for all scene events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Tree placement and deletion
    Trees(TreeEvent),
    /// Whole-scene data changes
    Data(DataEvent),
    /// Building recoloring
    Energy(EnergyEvent),
    /// Mesh export progress
    Export(ExportEvent),
}

impl SceneEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            SceneEvent::Trees(_) => EventCategory::Trees,
            SceneEvent::Data(_) => EventCategory::Data,
            SceneEvent::Energy(_) => EventCategory::Energy,
            SceneEvent::Export(_) => EventCategory::Export,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            SceneEvent::Trees(e) => e.description(),
            SceneEvent::Data(e) => e.description(),
            SceneEvent::Energy(e) => e.description(),
            SceneEvent::Export(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Trees,
    Data,
    Energy,
    Export,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Trees => write!(f, "Trees"),
            EventCategory::Data => write!(f, "Data"),
            EventCategory::Energy => write!(f, "Energy"),
            EventCategory::Export => write!(f, "Export"),
        }
    }
}

/// Tree-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeEvent {
    /// Tree counter changed (drives the UI counter)
    CountChanged {
        /// Trees currently in the scene.
        trees: usize,
    },
    /// A placement operation finished
    Placed {
        /// Trees requested by the user.
        requested: usize,
        /// Trees actually placed.
        placed: usize,
    },
    /// A deletion removed trees
    Removed {
        /// Trees removed.
        count: usize,
    },
}

impl TreeEvent {
    pub fn description(&self) -> String {
        match self {
            TreeEvent::CountChanged { trees } => format!("Tree count: {}", trees),
            TreeEvent::Placed { requested, placed } => {
                format!("Placed {} of {} trees", placed, requested)
            }
            TreeEvent::Removed { count } => format!("Removed {} trees", count),
        }
    }
}

/// Scene data events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataEvent {
    /// A file was loaded and the collections replaced
    Loaded {
        buildings: usize,
        trees: usize,
        roads: usize,
    },
    /// All collections were cleared
    Reset,
}

impl DataEvent {
    pub fn description(&self) -> String {
        match self {
            DataEvent::Loaded {
                buildings,
                trees,
                roads,
            } => format!(
                "Loaded {} buildings, {} trees, {} roads",
                buildings, trees, roads
            ),
            DataEvent::Reset => "Scene reset".to_string(),
        }
    }
}

/// Energy coloring events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnergyEvent {
    /// Building colors were recomputed
    Recolored {
        /// Numeric column driving the colors.
        column: String,
        /// Whether any valid values were found.
        has_data: bool,
    },
}

impl EnergyEvent {
    pub fn description(&self) -> String {
        match self {
            EnergyEvent::Recolored { column, has_data } => {
                format!("Recolored by '{}' (data: {})", column, has_data)
            }
        }
    }
}

/// Mesh export events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportEvent {
    /// A chunk file was written
    ChunkWritten {
        /// 1-based chunk number.
        index: usize,
        /// Total number of chunks.
        total: usize,
        path: PathBuf,
    },
    /// Export completed
    Finished {
        /// Trees written.
        trees: usize,
        /// Files produced.
        files: Vec<PathBuf>,
    },
}

impl ExportEvent {
    pub fn description(&self) -> String {
        match self {
            ExportEvent::ChunkWritten { index, total, path } => {
                format!("Wrote chunk {}/{} to {}", index, total, path.display())
            }
            ExportEvent::Finished { trees, files } => {
                format!("Exported {} trees to {} file(s)", trees, files.len())
            }
        }
    }
}
