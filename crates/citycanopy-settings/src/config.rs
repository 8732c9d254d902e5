//! Configuration for CityCanopy
//!
//! Configuration is organized into sections:
//! - Placement (heights, sizing, spacing, batching)
//! - Energy coloring (column, palette)
//! - Export (chunking, streaming, buffer limit)
//! - Map (style readiness polling)
//!
//! Files are JSON or TOML, chosen by extension.

use citycanopy_energy::EnergyConfig;
use citycanopy_export::ExportConfig;
use citycanopy_placement::PlacementConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

/// Map surface readiness polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Delay between style readiness checks
    pub style_poll_interval_ms: u64,
    /// Checks before giving up
    pub style_max_attempts: u32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            style_poll_interval_ms: 100,
            style_max_attempts: 100,
        }
    }
}

impl MapSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.style_poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
            _ => Err(SettingsError::UnsupportedFormat(format!(
                "{} (expected .json or .toml)",
                path.display()
            ))),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub placement: PlacementConfig,
    pub energy: EnergyConfig,
    pub export: ExportConfig,
    pub map: MapSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/citycanopy/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("citycanopy").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("No configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Load(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path`, or the default location if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(default) if default.exists() => Self::load_from_file(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::Save(format!("{}: {}", path.display(), e)))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let p = &self.placement;
        if !(p.min_height.is_finite() && p.max_height.is_finite()) || p.min_height <= 0.0 {
            return Err(SettingsError::invalid(
                "placement.min_height",
                "heights must be finite and > 0",
            ));
        }
        if p.min_height > p.max_height {
            return Err(SettingsError::invalid(
                "placement.max_height",
                format!("{} is below min_height {}", p.max_height, p.min_height),
            ));
        }
        if !(p.default_spacing > 0.0) || !p.default_spacing.is_finite() {
            return Err(SettingsError::invalid(
                "placement.default_spacing",
                "must be > 0",
            ));
        }
        for (key, value) in [
            ("placement.attempts_per_tree", p.attempts_per_tree),
            ("placement.attempts_per_capacity", p.attempts_per_capacity),
            (
                "placement.max_consecutive_failures",
                p.max_consecutive_failures,
            ),
            ("placement.batch_threshold", p.batch_threshold),
            ("placement.batch_size", p.batch_size),
            ("export.chunk_threshold", self.export.chunk_threshold),
            ("export.chunk_size", self.export.chunk_size),
            ("export.stream_batch_size", self.export.stream_batch_size),
            ("export.max_buffer_bytes", self.export.max_buffer_bytes),
        ] {
            if value == 0 {
                return Err(SettingsError::invalid(key, "must be > 0"));
            }
        }

        if self.energy.column.trim().is_empty() {
            return Err(SettingsError::invalid("energy.column", "must not be empty"));
        }

        if self.map.style_poll_interval_ms == 0 || self.map.style_max_attempts == 0 {
            return Err(SettingsError::invalid(
                "map",
                "poll interval and max attempts must be > 0",
            ));
        }

        Ok(())
    }
}
