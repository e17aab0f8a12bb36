//! Configuration file I/O operations

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.lingvo-time/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lingvo-time")
    }

    /// Get the global config file path (~/.lingvo-time/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Project-local config path (`<dir>/.lingvo-time/config.toml`)
    pub fn local_config_path(dir: &Path) -> PathBuf {
        dir.join(".lingvo-time").join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the configuration to use.
    ///
    /// Order: explicit path, then `<work_dir>/.lingvo-time/config.toml`,
    /// then the global config. Falls back to defaults when none exists.
    pub fn resolve(explicit: Option<&Path>, work_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = Self::local_config_path(work_dir);
        if local.exists() {
            debug!("[lingvo:config] Using {}", local.display());
            return Self::from_file(&local);
        }

        let global = Self::global_config_path();
        if global.exists() {
            debug!("[lingvo:config] Using {}", global.display());
            return Self::from_file(&global);
        }

        debug!("[lingvo:config] No config file found, using defaults");
        Ok(Self::default())
    }

    /// Database path from settings, or `~/.lingvo-time/games.db`
    pub fn db_path(&self) -> PathBuf {
        self.settings
            .db_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("games.db"))
    }
}

/// Write `content` to `path` through a temp file so readers never see a partial file
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let temp_path = path.with_extension("toml.tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .with_context(|| "Failed to write config content")?;

    temp_file
        .sync_all()
        .with_context(|| "Failed to sync config file")?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename config file: {}", path.display()))?;

    Ok(())
}
