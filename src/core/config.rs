// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Configuration loaded from TOML with per-section defaults

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
    pub media: MediaConfig,
    pub cors: CorsConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Which storage backend serves the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendType {
    /// Process-local maps, nothing survives a restart
    #[default]
    Memory,
    /// MongoDB document store
    #[serde(alias = "mongo")]
    MongoDB,
}

impl std::str::FromStr for StorageBackendType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongodb" | "mongo" => Ok(Self::MongoDB),
            other => Err(ConfigError::InvalidValue {
                field: "storage.backend".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
    pub mongodb_uri: Option<String>,
    pub database: String,
    pub connect_timeout_secs: u64,
}

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BookingConfig {
    /// Reject status updates that skip the booking lifecycle
    pub enforce_transitions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub folder: String,
    pub max_upload_mb: u64,
}

impl MediaConfig {
    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty list allows any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Memory,
            mongodb_uri: None,
            database: "vendorhive".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "vendorhive-development-secret".to_string(),
            token_ttl_hours: 24 * 7,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            folder: "vendorhive".to_string(),
            max_upload_mb: 10,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            booking: BookingConfig::default(),
            media: MediaConfig::default(),
            cors: CorsConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("Configuration file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::TomlParseError(e.to_string()))
    }

    /// Check cross-field requirements that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackendType::MongoDB && self.storage.mongodb_uri.is_none() {
            return Err(ConfigError::MissingField {
                field: "storage.mongodb_uri".to_string(),
            });
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "auth.jwt_secret".to_string(),
            });
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.auth.token_ttl_hours) {
            return Err(ConfigError::InvalidValue {
                field: "auth.token_ttl_hours".to_string(),
                value: self.auth.token_ttl_hours.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            bind_address = "127.0.0.1"
            port = 8088

            [booking]
            enforce_transitions = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8088);
        assert!(config.booking.enforce_transitions);
        assert_eq!(config.storage.backend, StorageBackendType::Memory);
        assert_eq!(config.media.folder, "vendorhive");
    }

    #[test]
    fn test_mongodb_backend_requires_uri() {
        let mut config = Config::default();
        config.storage.backend = StorageBackendType::MongoDB;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField {
                field: "storage.mongodb_uri".to_string()
            })
        );

        config.storage.mongodb_uri = Some("mongodb://localhost:27017".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_ttl_must_be_within_a_year() {
        let mut config = Config::default();
        for hours in [0, -5, MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            config.auth.token_ttl_hours = hours;
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidValue { .. })),
                "{} hours accepted",
                hours
            );
        }

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!("mongo".parse::<StorageBackendType>().unwrap(), StorageBackendType::MongoDB);
        assert_eq!("Memory".parse::<StorageBackendType>().unwrap(), StorageBackendType::Memory);
        assert!("postgres".parse::<StorageBackendType>().is_err());
    }
}
