//! CityCanopy Settings Crate
//!
//! Handles application configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, MapSettings};
pub use error::{SettingsError, SettingsResult};
