//! Damage Map Core Library
//!
//! Shared utilities for the viewer:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Application constants

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{create_dir_all, write_file};

/// Application name used for XDG paths
pub const APP_NAME: &str = "damage-map";

/// Default location of the governorate boundary feature collection
pub const DEFAULT_BOUNDARIES_SOURCE: &str = "data/gaza_governorates.geojson";

/// Default location of the damage point feature collection
pub const DEFAULT_DAMAGE_POINTS_SOURCE: &str = "data/damage_points.geojson";

/// Default basemap tile template
pub const DEFAULT_TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";

/// Default basemap attribution
pub const DEFAULT_TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";
