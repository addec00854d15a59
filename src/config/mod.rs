// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Configuration module

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory; holds the database unless `database.path` is set
    pub data_dir: PathBuf,

    /// Default log filter (`error`, `warn`, `info`, `debug`, `trace` or an
    /// env-filter directive); `--debug` / `--trace` override it
    pub log_level: String,

    /// Seed demo sensors into an empty store
    pub demo_mode: bool,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
            demo_mode: false,
            camera: CameraConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            // Create parent directories
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Move to a different data directory. Drops any explicit database
    /// path so the database follows the directory.
    pub fn set_data_dir(&mut self, data_dir: PathBuf) {
        self.database.path = None;
        self.data_dir = data_dir;
    }

    /// Where the database lives: `database.path` if set, otherwise inside
    /// `data_dir`
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DatabaseConfig::FILE_NAME))
    }

    /// Log filter to install, with command-line flags taking precedence
    pub fn log_filter(&self, debug: bool, trace: bool) -> &str {
        if trace {
            "trace"
        } else if debug {
            "debug"
        } else {
            &self.log_level
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("catguard"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Minimum classifier confidence (percent) to report a cat
    pub confidence_threshold: f32,

    /// Seconds between frames in watch mode
    pub scan_interval_secs: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 50.0,
            scan_interval_secs: 5,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit database path, overriding `data_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// File name used inside the data directory
    pub const FILE_NAME: &'static str = "catguard.db";
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.camera.confidence_threshold, 50.0);

        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(reloaded.camera.scan_interval_secs, created.camera.scan_interval_secs);
        assert_eq!(reloaded.database_path(), created.database_path());
        assert_eq!(reloaded.database_path(), PathBuf::from("./data/catguard.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "demo_mode = true\n[camera]\nconfidence_threshold = 80.0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.demo_mode);
        assert_eq!(config.camera.confidence_threshold, 80.0);
        assert_eq!(config.camera.scan_interval_secs, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "camera = 12").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_set_data_dir_moves_database() {
        let mut config = Config::default();
        config.database.path = Some(PathBuf::from("/tmp/elsewhere.db"));
        config.set_data_dir(PathBuf::from("/var/lib/catguard"));
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/catguard/catguard.db"));
    }

    #[test]
    fn test_data_dir_from_file_places_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/var/lib/catguard\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/catguard"));
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/catguard/catguard.db"));
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/var/lib/catguard\"\n[database]\npath = \"/srv/alarm.db\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/srv/alarm.db"));
    }

    #[test]
    fn test_saved_defaults_do_not_pin_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("catguard.db"));
    }

    #[test]
    fn test_log_filter_from_file_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_filter(false, false), "warn");
        assert_eq!(config.log_filter(true, false), "debug");
        assert_eq!(config.log_filter(true, true), "trace");
    }
}
