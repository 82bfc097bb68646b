//! SurfsUp Core Library
//!
//! Shared utilities for the climate API service:
//! - Configuration loading (XDG-compliant)
//! - File system checks
//! - Common defaults

mod config;
pub mod fs;

pub use config::{find_config_file, get_xdg_data_dir, load_config, ConfigSource};
pub use fs::{is_readable_file, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "surfsup";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default dataset file name, looked up under `./Resources` and the XDG data dir
pub const DEFAULT_DATASET_FILE: &str = "hawaii.sqlite";

/// Default size of the read-only dataset connection pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
