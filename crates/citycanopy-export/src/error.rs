//! Export error types

use thiserror::Error;

/// Mesh export error type
#[derive(Error, Debug)]
pub enum ExportError {
    /// There are no trunks to export
    #[error("No trees to export")]
    NoTrees,

    /// In-memory output would exceed the configured buffer limit
    #[error("Mesh of ~{estimated} bytes exceeds the {limit} byte buffer limit")]
    BufferTooLarge {
        /// Estimated output size in bytes.
        estimated: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Formatting into the output buffer failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Writing the output failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Core error
    #[error(transparent)]
    Core(#[from] citycanopy_core::Error),
}

impl ExportError {
    /// The in-memory path should fall back to streaming
    pub fn is_buffer_limit(&self) -> bool {
        matches!(self, ExportError::BufferTooLarge { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
