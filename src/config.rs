//! Configuration management for the `storefinder` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::StoreFinderError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `storefinder` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreFinderConfig {
    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Isochrone provider configuration
    #[serde(default)]
    pub reachability: ReachabilityConfig,
    /// Location repository configuration
    #[serde(default)]
    pub repository: RepositoryConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// User agent sent with geocoding requests (required by Nominatim's
    /// usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Isochrone provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityConfig {
    /// Routing provider API key
    pub api_key: Option<String>,
    /// Base URL of the isochrone service
    #[serde(default = "default_reachability_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Location repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Postgres connection URL; when absent the CSV file is used instead
    pub database_url: Option<String>,
    /// CSV export of the locations table
    #[serde(default = "default_locations_file")]
    pub locations_file: String,
    /// Snapshot cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Snapshot cache directory
    #[serde(default = "default_cache_location")]
    pub cache_location: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_reachability_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_user_agent() -> String {
    "storefinder/0.1.0".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_locations_file() -> String {
    "locations.csv".to_string()
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_cache_location() -> String {
    "~/.cache/storefinder".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_reachability_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            locations_file: default_locations_file(),
            cache_ttl_seconds: default_cache_ttl(),
            cache_location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl StoreFinderConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with STOREFINDER_ prefix
        builder = builder.add_source(
            Environment::with_prefix("STOREFINDER")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: StoreFinderConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("storefinder").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.reachability.api_key {
            if api_key.is_empty() {
                return Err(StoreFinderError::config(
                    "Routing API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(StoreFinderError::config(
                    "Routing API key appears to be invalid (too short). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Geocoding", self.geocoding.timeout_seconds),
            ("Reachability", self.reachability.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(StoreFinderError::config(format!(
                    "{name} timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        for (name, retries) in [
            ("Geocoding", self.geocoding.max_retries),
            ("Reachability", self.reachability.max_retries),
        ] {
            if retries > 10 {
                return Err(StoreFinderError::config(format!(
                    "{name} max retries cannot exceed 10"
                ))
                .into());
            }
        }

        if self.repository.cache_ttl_seconds > 604_800 {
            return Err(
                StoreFinderError::config("Snapshot cache TTL cannot exceed 1 week").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(StoreFinderError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Reachability", &self.reachability.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(StoreFinderError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreFinderConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.reachability.base_url, "https://api.openrouteservice.org");
        assert_eq!(config.geocoding.timeout_seconds, 30);
        assert_eq!(config.repository.cache_ttl_seconds, 600);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8080);
        assert!(config.reachability.api_key.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = StoreFinderConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = StoreFinderConfig::default();
        config.reachability.api_key = Some("short".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = StoreFinderConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = StoreFinderConfig::default();
        config.reachability.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("between 1 and 300")
        );
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = StoreFinderConfig::default();
        config.geocoding.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_generation() {
        let path = StoreFinderConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("storefinder"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
