//! Error types for billed-config

use thiserror::Error;

/// Stable code of a configuration error, shown in the startup report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    MissingField,
    InvalidValue,
    Unreadable,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::InvalidYaml => "INVALID_YAML",
            ConfigErrorCode::MissingField => "MISSING_FIELD",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
            ConfigErrorCode::Unreadable => "UNREADABLE",
        };
        f.write_str(code)
    }
}

/// Startup report of a configuration error
#[derive(Debug, Clone)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Dotted path of the offending key, e.g. `store.api_url`
    pub field: Option<String>,
    pub suggestions: Vec<String>,
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::MissingField { .. } => ConfigErrorCode::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
        }
    }

    /// Report printed by the binary before it exits
    pub fn to_details(&self) -> ConfigErrorDetails {
        let (field, suggestions) = match self {
            ConfigError::FileNotFound { .. } => (
                None,
                vec!["Pass --config with the path of your config.yaml.".to_string()],
            ),
            ConfigError::InvalidYaml { .. } => (
                None,
                vec!["Compare the file with the sample config.yaml shipped with Billed.".to_string()],
            ),
            ConfigError::MissingField { field } => (Some(field.clone()), suggest_for(field)),
            ConfigError::InvalidValue { field, reason } => (Some(field.clone()), vec![reason.clone()]),
            ConfigError::Unreadable { .. } => (
                None,
                vec!["Check that the file is readable by the user running Billed.".to_string()],
            ),
        };

        ConfigErrorDetails {
            code: self.code(),
            message: self.to_string(),
            field,
            suggestions,
        }
    }
}

fn suggest_for(field: &str) -> Vec<String> {
    match field {
        "store.api_url" => vec![
            "Set store.api_url to the bills API base URL.".to_string(),
            "Or use store.backend: memory to run without the API.".to_string(),
        ],
        other => vec![format!("Add '{}' to your config file.", other)],
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
