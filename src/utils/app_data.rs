use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "querylog";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "QUERYLOG_CONFIG";

/// User defaults, stored as JSON in the app data directory.
/// Command-line flags take precedence over every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Use binary search to find the start of the requested time range
    #[serde(default = "default_fast_seek")]
    pub fast_seek: bool,

    /// Tolerated timestamp disorder, in seconds
    #[serde(default = "default_jitter_seconds")]
    pub jitter_seconds: u64,

    /// Number of queries printed by `top` when not given
    #[serde(default = "default_top")]
    pub top: usize,

    /// Print percent-decoded queries instead of raw ones
    #[serde(default)]
    pub decode_queries: bool,
}

fn default_fast_seek() -> bool {
    true
}

fn default_jitter_seconds() -> u64 {
    // Logs are flushed in ~5 minute chunks
    900
}

fn default_top() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fast_seek: default_fast_seek(),
            jitter_seconds: default_jitter_seconds(),
            top: default_top(),
            decode_queries: false,
        }
    }
}

impl AppConfig {
    /// Load config from `$QUERYLOG_CONFIG` or the app data directory,
    /// or return defaults if there is none
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(path, content)
            .context("Failed to write config file")?;
        Ok(())
    }
}

/// Get the path to the config file, if a location can be determined
pub fn get_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    get_app_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the application data directory (not created)
pub fn get_app_data_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    base.map(|b| b.join(APP_NAME))
}
