//! Application configuration management.
//!
//! Configuration is stored at `~/.config/qurancache/config.json`. Every
//! field is optional; missing fields take their defaults. The API base URL
//! can also be set with `QURANCACHE_API_URL` (or a `.env` file).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use qurancache_core::api::client::DEFAULT_BASE_URL;
use qurancache_core::loader::{DEFAULT_EDITION, DEFAULT_LAST_READ_VERSE};
use qurancache_core::state::DEFAULT_VERSE_CACHE_CAPACITY;
use qurancache_core::LoaderOptions;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "qurancache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "QURANCACHE_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub edition: String,
    pub last_read_verse: u32,
    pub verse_cache_capacity: usize,
    /// No timeout unless set; the HTTP client's defaults apply.
    pub request_timeout_secs: Option<u64>,
    /// Shown under the greeting.
    pub reader_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            edition: DEFAULT_EDITION.to_string(),
            last_read_verse: DEFAULT_LAST_READ_VERSE,
            verse_cache_capacity: DEFAULT_VERSE_CACHE_CAPACITY,
            request_timeout_secs: None,
            reader_name: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::parse(&contents)?
        } else {
            Self::default()
        };
        config.apply_api_url_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config file")
    }

    fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            edition: self.edition.clone(),
            last_read_verse: self.last_read_verse,
        }
    }
}
