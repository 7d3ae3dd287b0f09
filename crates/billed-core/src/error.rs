//! Error types for billed-core
//!
//! Every failure a page handler can meet is a `CoreError`. None of them is
//! fatal: handlers turn them into inline messages or a page-level error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// File extension outside png/jpg/jpeg
    UnsupportedFileType,
    /// Store rejected the receipt upload
    UploadFailure,
    /// Store rejected the bill listing
    FetchError,
    /// Store rejected the bill creation
    SubmitFailure,
    /// Form submitted before a receipt was uploaded
    MissingReceipt,
    /// Form field failed validation
    ValidationError,
    /// Value could not be parsed
    InvalidFormat,
    /// Handler not provided by this page
    NotSupported,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::UnsupportedFileType => write!(f, "UNSUPPORTED_FILE_TYPE"),
            ErrorCode::UploadFailure => write!(f, "UPLOAD_FAILURE"),
            ErrorCode::FetchError => write!(f, "FETCH_ERROR"),
            ErrorCode::SubmitFailure => write!(f, "SUBMIT_FAILURE"),
            ErrorCode::MissingReceipt => write!(f, "MISSING_RECEIPT"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::NotSupported => write!(f, "NOT_SUPPORTED"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, " (field: {})", field)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, " - {}", self.suggestions.join("; "))?;
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected user mistake, recovered inline
    Info,
    /// Operation failed but the page stays usable
    Warning,
    /// Operation failed, page shows an error state
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for billed-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Le type de fichier attendu est JPG, JPEG et PNG. Le {} n'est pas pris en charge.", describe_extension(.extension))]
    UnsupportedFileType { extension: Option<String> },

    #[error("Le téléchargement du justificatif a échoué : {message}")]
    Upload { message: String },

    /// Listing failure; the store's message is shown as is
    #[error("{message}")]
    Fetch { message: String },

    #[error("La note de frais n'a pas pu être envoyée : {message}")]
    Submit { message: String },

    #[error("Veuillez joindre un justificatif au format JPG, JPEG ou PNG.")]
    MissingReceipt,

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Operation not supported: {operation}")]
    NotSupported { operation: String },
}

fn describe_extension(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => ext.to_uppercase(),
        None => "fichier sans extension".to_string(),
    }
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::UnsupportedFileType { .. } => ErrorCode::UnsupportedFileType,
            CoreError::Upload { .. } => ErrorCode::UploadFailure,
            CoreError::Fetch { .. } => ErrorCode::FetchError,
            CoreError::Submit { .. } => ErrorCode::SubmitFailure,
            CoreError::MissingReceipt => ErrorCode::MissingReceipt,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::NotSupported { .. } => ErrorCode::NotSupported,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::UnsupportedFileType { .. } => ErrorSeverity::Info,
            CoreError::MissingReceipt => ErrorSeverity::Info,
            CoreError::Validation { .. } => ErrorSeverity::Info,
            CoreError::Upload { .. } => ErrorSeverity::Warning,
            CoreError::Submit { .. } => ErrorSeverity::Warning,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Warning,
            CoreError::NotSupported { .. } => ErrorSeverity::Warning,
            CoreError::Fetch { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::UnsupportedFileType { .. } => {
                details = details
                    .with_field("file".to_string())
                    .with_suggestion("Choose a .jpg, .jpeg or .png receipt.".to_string());
            }
            CoreError::Upload { .. } => {
                details = details
                    .with_field("file".to_string())
                    .with_suggestion("Select the file again to retry the upload.".to_string());
            }
            CoreError::Fetch { .. } => {
                details = details.with_suggestion(
                    "Navigate away and back to the bills page to reload.".to_string()
                );
            }
            CoreError::Submit { .. } => {
                details = details.with_suggestion(
                    "The form was kept; submit it again to retry.".to_string()
                );
            }
            CoreError::MissingReceipt => {
                details = details.with_field("file".to_string());
            }
            CoreError::Validation { field, .. } => {
                details = details.with_field(field.clone());
            }
            CoreError::InvalidFormat { .. } | CoreError::NotSupported { .. } => {}
        }

        details
    }

    /// Field of the new bill form this error belongs to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::UnsupportedFileType { .. } | CoreError::Upload { .. } | CoreError::MissingReceipt => {
                Some("file")
            }
            CoreError::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Email of the current user
    pub user: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            user: None,
        }
    }

    pub fn with_user(mut self, email: &str) -> Self {
        self.user = Some(email.to_string());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let details = error.to_details();
        match error.severity() {
            ErrorSeverity::Info => log::info!(
                target: "billed::error",
                "{} - Operation: {} - User: {:?}",
                details, context.operation, context.user
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "billed::error",
                "{} - Operation: {} - User: {:?}",
                details, context.operation, context.user
            ),
            ErrorSeverity::Error => log::error!(
                target: "billed::error",
                "{} - Operation: {} - User: {:?}",
                details, context.operation, context.user
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "billed::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::UnsupportedFileType.to_string(), "UNSUPPORTED_FILE_TYPE");
        assert_eq!(ErrorCode::FetchError.to_string(), "FETCH_ERROR");
    }

    #[test]
    fn test_unsupported_file_type_message() {
        let error = CoreError::UnsupportedFileType {
            extension: Some("pdf".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Le type de fichier attendu est JPG, JPEG et PNG. Le PDF n'est pas pris en charge."
        );
        assert_eq!(error.field(), Some("file"));
        assert_eq!(error.severity(), ErrorSeverity::Info);

        let error = CoreError::UnsupportedFileType { extension: None };
        assert!(error.to_string().contains("fichier sans extension"));
    }

    #[test]
    fn test_fetch_error_is_verbatim() {
        let error = CoreError::Fetch {
            message: "Erreur 404".to_string(),
        };
        assert_eq!(error.to_string(), "Erreur 404");
        assert_eq!(error.code(), ErrorCode::FetchError);
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_details() {
        let error = CoreError::Validation {
            field: "amount".to_string(),
            message: "Le montant doit être un nombre entier.".to_string(),
        };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::ValidationError);
        assert_eq!(details.field.as_deref(), Some("amount"));
        assert!(details.to_string().starts_with("[VALIDATION_ERROR]"));

        let details = CoreError::Submit { message: "Erreur 500".to_string() }.to_details();
        assert_eq!(details.suggestions.len(), 1);
        assert!(details.message.contains("Erreur 500"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("get_bills").with_user("a@a");
        assert_eq!(context.operation, "get_bills");
        assert_eq!(context.user.as_deref(), Some("a@a"));
    }
}
