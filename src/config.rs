//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend base URL, institution display fields, and
//! the last used admin username.
//!
//! Configuration is stored at `~/.config/cardtrack/config.json`. The
//! `CARDTRACK_API_URL` environment variable (or `.env` entry) overrides
//! the configured base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "cardtrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Fallback base URL for a locally running backend
const DEFAULT_API_URL: &str = "http://localhost:4000";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub college_name: Option<String>,
    pub college_address: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the backend base URL: env var wins, then the config file,
    /// then the local default. Trailing slashes are stripped so endpoint
    /// paths can be appended directly.
    pub fn api_url(&self) -> String {
        let url = std::env::var("CARDTRACK_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Per-app data directory: session file, label spool, report downloads.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
