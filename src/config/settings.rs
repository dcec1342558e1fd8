use anyhow::Result;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "TrashLens";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured classifier base URL.
pub const BASE_URL_ENV: &str = "TRASHLENS_BASE_URL";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "trashlens", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

fn config_file_path(override_dir: Option<&Path>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir.join(CONFIG_FILE)),
        None => get_config_directory()
            .map(|dir| dir.join(CONFIG_FILE))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the application configuration, creating a default file when none
/// exists. A corrupt file logs a warning and falls back to defaults instead
/// of crashing the app. `override_dir` lets tests run against a tempdir.
pub fn load_config(override_dir: Option<&Path>) -> Result<AppConfig> {
    let config_path = config_file_path(override_dir)?;

    let mut config = if config_path.exists() {
        let config_content = fs::read_to_string(&config_path)?;
        match serde_json::from_str::<AppConfig>(&config_content) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", config_path);
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config file at {:?}: {}. Falling back to default config.",
                    config_path,
                    e
                );
                AppConfig::default()
            }
        }
    } else {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = AppConfig::default();
        save_config(&default_config, override_dir)?;
        default_config
    };

    // The environment wins over the file so a backend on a non-default
    // address can be targeted without editing the config.
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        if !base_url.trim().is_empty() {
            tracing::info!("Using classifier base URL from {}: {}", BASE_URL_ENV, base_url);
            config.base_url = base_url;
        }
    }

    Ok(config)
}

/// Saves the provided configuration to the config file.
pub fn save_config(config: &AppConfig, override_dir: Option<&Path>) -> Result<()> {
    let config_path = config_file_path(override_dir)?;

    if let Some(dir) = config_path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            tracing::info!("Created config directory: {:?}", dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}
