//! Application settings management
//!
//! Machine-level configuration (directories, logging, capture device) lives
//! in a TOML file. User preferences (quality, speed, backup toggle) are a
//! different animal: they belong to the key-value store, see
//! [`crate::storage::AppSettings`].

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Audio capture settings
    #[serde(default)]
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for audio blobs and the key-value store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Preferred capture device (empty = default)
    #[serde(default)]
    pub device: String,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "vnotes", "vnotes")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/vnotes"))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            device: String::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(settings)
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "vnotes", "vnotes")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding recorded audio blobs
    pub fn audio_dir(&self) -> PathBuf {
        self.general.data_dir.join("audio")
    }

    /// Directory backing the key-value store
    pub fn kv_dir(&self) -> PathBuf {
        self.general.data_dir.join("kv")
    }

    /// Private document area for backup files
    pub fn documents_dir(&self) -> PathBuf {
        self.general.data_dir.join("documents")
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.general.data_dir)?;
        std::fs::create_dir_all(self.audio_dir())?;
        std::fs::create_dir_all(self.kv_dir())?;
        std::fs::create_dir_all(self.documents_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_dirs_live_under_data_dir() {
        let mut settings = Settings::default();
        settings.general.data_dir = PathBuf::from("/data/vnotes");

        assert_eq!(settings.audio_dir(), PathBuf::from("/data/vnotes/audio"));
        assert_eq!(settings.kv_dir(), PathBuf::from("/data/vnotes/kv"));
        assert_eq!(
            settings.documents_dir(),
            PathBuf::from("/data/vnotes/documents")
        );
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.general.log_level, "info");
        assert!(settings.audio.device.is_empty());
    }
}
