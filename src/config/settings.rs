//! Engine settings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ramme_core::{
    DEFAULT_SECTION_COLUMNS, DEFAULT_SIMULATION_INTERVAL, DEFAULT_SIMULATION_VARIANCE,
    DEFAULT_STALE_THRESHOLD_MS, DEFAULT_STORAGE_PREFIX,
};
use ramme_types::FireMode;

/// Current settings format version
pub const SETTINGS_VERSION: u32 = 1;

/// Engine-wide settings, independent of any one manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Version of the settings format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Age after which a signal is reported stale
    #[serde(default = "default_stale_threshold_ms")]
    pub stale_threshold_ms: u64,
    /// Simulator tick interval
    #[serde(default = "default_simulation_interval_ms")]
    pub simulation_interval_ms: u64,
    /// Maximum simulator step per tick
    #[serde(default = "default_simulation_variance")]
    pub simulation_variance: f64,
    /// Storage key prefix for seeded collections
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,
    /// Grid columns for sections without a declared layout
    #[serde(default = "default_columns")]
    pub default_columns: u32,
    /// Whether workflows fire once per crossing or on every evaluation
    #[serde(default)]
    pub workflow_fire_mode: FireMode,
    /// Directory for the file-backed data lake (None = platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_stale_threshold_ms() -> u64 {
    DEFAULT_STALE_THRESHOLD_MS
}

fn default_simulation_interval_ms() -> u64 {
    DEFAULT_SIMULATION_INTERVAL.as_millis() as u64
}

fn default_simulation_variance() -> f64 {
    DEFAULT_SIMULATION_VARIANCE
}

fn default_storage_prefix() -> String {
    DEFAULT_STORAGE_PREFIX.to_string()
}

fn default_columns() -> u32 {
    DEFAULT_SECTION_COLUMNS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            stale_threshold_ms: default_stale_threshold_ms(),
            simulation_interval_ms: default_simulation_interval_ms(),
            simulation_variance: default_simulation_variance(),
            storage_prefix: default_storage_prefix(),
            default_columns: default_columns(),
            workflow_fire_mode: FireMode::default(),
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from the platform config directory.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Save settings to the platform config directory
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Load settings from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("io", "ramme", "ramme-dash")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Directory backing the file storage
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("lake")),
        }
    }

    pub fn simulation_interval(&self) -> Duration {
        Duration::from_millis(self.simulation_interval_ms)
    }
}
