mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DefaultsConfig, LogConfig, TimerConfig};
pub use database::{CircuitStore, RunRecord, Stats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Resolves the data directory without touching the filesystem.
///
/// `CIRCUITS_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/circuits[-dev]/`, with the `-dev` suffix when
/// `CIRCUITS_ENV=dev`.
pub fn data_dir_path() -> PathBuf {
    match std::env::var_os("CIRCUITS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CIRCUITS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("circuits-dev")
            } else {
                base_dir.join("circuits")
            }
        }
    }
}

/// Returns the data directory, creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
