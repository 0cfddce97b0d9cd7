//! Configuration module for jobscout
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::info;

/// Global settings instance
static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Initialize global settings
pub fn init(settings: Settings) -> Result<&'static Settings> {
    settings.validate()?;
    SETTINGS
        .set(settings)
        .map_err(|_| anyhow::anyhow!("Settings already initialized"))?;
    get().ok_or_else(|| anyhow::anyhow!("Settings not initialized"))
}

/// Get a reference to the global settings
pub fn get() -> Option<&'static Settings> {
    SETTINGS.get()
}

/// Load settings from an explicit path, the environment, or the default locations
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(path)?;
        settings.merge_env();
        return Ok(settings);
    }

    if let Ok(path) = std::env::var("JOBSCOUT_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("jobscout/settings.yml"));
    }

    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
