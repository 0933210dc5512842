use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Library;

/// Cache record name for the chapter list and last-read marker.
const LIBRARY: &str = "library";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    /// Write through a temp file and rename, so a record is either fully
    /// replaced or left as it was.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let tmp_path = self.cache_dir.join(format!("{}.json.tmp", name));

        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace cache file: {}", name))?;

        debug!(cache = name, "Cache written");
        Ok(())
    }

    // ===== Library =====

    pub fn load_library(&self) -> Result<Option<CachedData<Library>>> {
        self.load(LIBRARY)
    }

    pub fn save_library(&self, library: &Library) -> Result<()> {
        self.save(LIBRARY, library)
    }

    // ===== Cache Age Information =====

    /// Age of the library record for the status bar, `None` when never cached.
    pub fn library_age(&self) -> Option<String> {
        match self.load_library() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                warn!(cache = LIBRARY, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
