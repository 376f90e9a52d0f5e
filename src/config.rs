//! Configuration module for runtime sensor filtering
//!
//! Reads/writes sensor configuration from ~/.config/nest-protect-sensors/sensors.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sensor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sensor keys that are not exposed (all others are)
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nest-protect-sensors").join("sensors.toml"))
    }

    /// Load the user's config; every sensor stays enabled if there is none
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("No config directory on this platform, exposing all sensors");
                Self::default()
            }
        }
    }

    /// Load config from `path`. Missing or unreadable files give the default.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No sensor config at {}, exposing all sensors", path.display());
                return Self::default();
            }
            Err(e) => {
                tracing::error!("Cannot read sensor config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        toml::from_str::<Self>(&contents)
            .inspect(|config| {
                tracing::info!(
                    "Sensor config {}: {} key(s) disabled",
                    path.display(),
                    config.disabled.len()
                )
            })
            .unwrap_or_else(|e| {
                tracing::error!("Ignoring invalid sensor config {}: {}", path.display(), e);
                Self::default()
            })
    }

    /// Save config to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("No config directory on this platform"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Wrote sensor config to {}", path.display());
        Ok(())
    }

    /// Check if a sensor key is enabled
    pub fn is_enabled(&self, key: &str) -> bool {
        !self.disabled.iter().any(|k| k == key)
    }

    /// Enable a sensor (remove from disabled list)
    pub fn enable(&mut self, key: &str) {
        self.disabled.retain(|k| k != key);
    }

    /// Disable a sensor (add to disabled list)
    pub fn disable(&mut self, key: &str) {
        if self.is_enabled(key) {
            self.disabled.push(key.to_string());
        }
    }
}
