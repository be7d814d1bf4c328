//! Hoard settings with persistence
//!
//! Settings are saved to `~/.config/hoard/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use hoard_items::ItemConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// All settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub items: ItemConfig,
    pub catalog: CatalogSettings,
}

/// Where the settings came from. Reported once logging is up.
#[derive(Debug)]
pub enum SettingsSource {
    File(PathBuf),
    Missing,
    NoConfigDir,
    Invalid(PathBuf, anyhow::Error),
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hoard"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or fall back to defaults.
    ///
    /// Runs before the subscriber is installed, so nothing is logged here.
    pub fn load() -> (Self, SettingsSource) {
        let Some(path) = Self::settings_path() else {
            return (Self::default(), SettingsSource::NoConfigDir);
        };
        if !path.exists() {
            return (Self::default(), SettingsSource::Missing);
        }
        match Self::read(&path) {
            Ok(settings) => (settings, SettingsSource::File(path)),
            Err(e) => (Self::default(), SettingsSource::Invalid(path, e)),
        }
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let settings: Self = toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        settings.items.validate().context("invalid [items] section")?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Print the module path of each event
    pub show_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// JSON catalog file. The built-in demo catalog is used when unset.
    pub path: Option<PathBuf>,
}
