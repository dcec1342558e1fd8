pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default classifier endpoint, matching the backend's local dev setup.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the classifier service. Overridable via the
    /// `TRASHLENS_BASE_URL` environment variable at startup.
    pub base_url: String,
    /// Directory the image picker opens in, remembered across sessions.
    pub last_image_directory: Option<PathBuf>,
    pub window_size: (f64, f64),
    pub window_position: (f64, f64),
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            last_image_directory: None,
            window_size: (1000.0, 760.0),
            window_position: (100.0, 100.0),
        }
    }
}
