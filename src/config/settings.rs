//! User configuration settings
//!
//! Layered configuration: environment variables → config file → defaults

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the generation service
    pub service_base_url: String,

    /// Path of the full-generation endpoint, joined onto the base URL
    pub generate_path: String,

    /// Path of the prompt-refinement endpoint, joined onto the base URL
    pub refine_path: String,

    /// Request timeout in seconds for generation calls. This also bounds
    /// how long the session can stay pending.
    pub request_timeout_secs: u64,

    /// UI refresh rate in FPS
    pub ui_refresh_fps: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Log file path (if set, logs to file instead of the default TUI log)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_base_url: "http://localhost:3001".to_string(),
            generate_path: "/api/generate".to_string(),
            refine_path: "/api/refine-prompt".to_string(),
            request_timeout_secs: 60,
            ui_refresh_fps: 30,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        Self::load_layered(&config_path)
    }

    /// Load configuration layering a specific file path
    pub fn load_layered(config_path: &PathBuf) -> Result<Self> {
        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer config file if it exists
            .merge(Toml::file(config_path))
            // Layer environment variables (MM_SERVICE_BASE_URL, etc.)
            .merge(Env::prefixed("MM_"))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path (used for the default log file)
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the log file path for TUI mode
    pub fn tui_log_file(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.log_file {
            Ok(path.clone())
        } else {
            Ok(Self::data_dir()?.join("mindmapper.log"))
        }
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        let dirs = Self::project_dirs()?;

        std::fs::create_dir_all(dirs.config_dir()).map_err(|_e| {
            Error::Config(ConfigError::DirectoryCreationFailed(
                dirs.config_dir().to_path_buf(),
            ))
        })?;

        std::fs::create_dir_all(dirs.data_dir()).map_err(|_e| {
            Error::Config(ConfigError::DirectoryCreationFailed(
                dirs.data_dir().to_path_buf(),
            ))
        })?;

        // Seed a default config file if none exists so users can discover it
        let config_path = Self::config_file_path()?;
        if !config_path.exists() {
            let _ = Config::default().save();
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_e| {
                Error::Config(ConfigError::DirectoryCreationFailed(parent.to_path_buf()))
            })?;
        }

        let toml =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        std::fs::write(&config_path, toml)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.service_base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "service_base_url".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.ui_refresh_fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ui_refresh_fps".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "mindmapper", "mindmapper").ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_base_url, "http://localhost:3001");
        assert_eq!(config.generate_path, "/api/generate");
        assert_eq!(config.refine_path, "/api/refine-prompt");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.ui_refresh_fps, 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("service_base_url"));
        assert!(toml.contains("localhost:3001"));
    }

    #[test]
    fn test_config_file_layering() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "service_base_url = \"http://maps.example.com\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::load_layered(&path).unwrap();
        assert_eq!(config.service_base_url, "http://maps.example.com");
        assert_eq!(config.request_timeout_secs, 5);
        // Untouched keys keep their defaults
        assert_eq!(config.generate_path, "/api/generate");
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 0\n").unwrap();

        let result = Config::load_layered(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_timeout_duration() {
        let config = Config {
            request_timeout_secs: 5,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
