//! Engine configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Auto-save cadence and retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,

    /// Minimum time between two auto saves, in milliseconds.
    pub interval_ms: u64,

    /// How often the auto-save timer checks the interval, in milliseconds.
    pub tick_ms: u64,

    /// Auto saves kept before the oldest are evicted. Manual and checkpoint
    /// saves are never counted against this cap.
    pub max_auto_saves: usize,

    /// Whether narrative key events create checkpoint saves.
    pub save_on_key_events: bool,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 60_000,
            tick_ms: 10_000,
            max_auto_saves: 5,
            save_on_key_events: true,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding save records. Defaults to
    /// `~/.construct-layer/saves` when unset.
    pub save_dir: Option<PathBuf>,

    pub auto_save: AutoSaveConfig,

    /// How long a system notification stays on screen, in milliseconds.
    pub notification_duration_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            auto_save: AutoSaveConfig::default(),
            notification_duration_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The effective save directory.
    ///
    /// Falls back to `~/.construct-layer/saves`, or a relative directory when
    /// no home directory can be determined.
    pub fn save_dir(&self) -> PathBuf {
        if let Some(dir) = &self.save_dir {
            return dir.clone();
        }

        dirs::home_dir()
            .map(|home| home.join(".construct-layer").join("saves"))
            .unwrap_or_else(|| PathBuf::from(".construct-layer/saves"))
    }
}
