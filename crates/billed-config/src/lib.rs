//! Configuration management for billed
//!
//! This module handles loading, validation, and management of
//! billed configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::{ConfigError, ConfigErrorCode, ConfigErrorDetails, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Which store implementation backs the application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store seeded with fixture bills
    Memory,
    /// Remote REST API
    Remote,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Memory
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "remote" => Ok(StoreBackend::Remote),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Remote => write!(f, "remote"),
        }
    }
}

/// Store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the remote API (required for the remote backend)
    #[serde(default)]
    pub api_url: Option<String>,
    /// Bearer token sent to the remote API
    #[serde(default)]
    pub api_token: Option<String>,
    /// Prefix of the receipt URLs handed out by the memory store
    #[serde(default = "default_file_base_url")]
    pub file_base_url: String,
    /// Seed the memory store with sample bills
    #[serde(default = "default_true")]
    pub seed_fixtures: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            api_url: None,
            api_token: None,
            file_base_url: default_file_base_url(),
            seed_fixtures: true,
        }
    }
}

fn default_file_base_url() -> String {
    "https://localhost:3456/images".to_string()
}

fn default_true() -> bool {
    true
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    #[serde(alias = "employee")]
    Employee,
    #[serde(alias = "admin")]
    Admin,
}

impl Default for UserType {
    fn default() -> Self {
        UserType::Employee
    }
}

impl std::str::FromStr for UserType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(UserType::Employee),
            "admin" => Ok(UserType::Admin),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Employee => write!(f, "Employee"),
            UserType::Admin => write!(f, "Admin"),
        }
    }
}

/// Default user, used when a request carries no `user` cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default)]
    pub user_type: UserType,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            user_type: UserType::Employee,
        }
    }
}

fn default_email() -> String {
    "employee@test.tld".to_string()
}

/// Receipt upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted request body, in bytes; bounds receipt uploads
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_file_size() -> usize {
    5 * 1024 * 1024
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Default session
    #[serde(default)]
    pub session: SessionConfig,
    /// Upload settings
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.store.backend == StoreBackend::Remote
            && self.store.api_url.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            return Err(ConfigError::MissingField {
                field: "store.api_url".to_string(),
            });
        }

        if self.upload.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload.max_file_size".to_string(),
                reason: "Upload limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
