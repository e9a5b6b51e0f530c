//! Error types module
//!
//! All failures surfaced by the upload service are unified under [`AppError`].
//! Each variant describes itself through [`ErrorMetadata`]: a machine-readable
//! code, whether retrying can help, the log level, and the message shown in the
//! upload form's error area.

use crate::format::format_size_limit;
use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rejected submissions
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "CAPACITY_EXCEEDED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the same action can be retried)
    fn is_recoverable(&self) -> bool;

    /// Message shown in the form's error area
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Capacity exceeded: at most {max} images allowed")]
    CapacityExceeded { max: usize },

    #[error("File is not an image: {name}")]
    NotAnImage { name: String },

    #[error("File too large: {name} (max: {max_bytes} bytes)")]
    FileTooLarge { name: String, max_bytes: usize },

    #[error("Upload failed: {message}")]
    UploadFailed { message: String },

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Image upload is disabled")]
    Disabled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid image URL: {0}")]
    InvalidImageUrl(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NotAnImage { name, .. } => AppError::NotAnImage { name },
            ValidationError::FileTooLarge { name, max, .. } => {
                AppError::FileTooLarge { name, max_bytes: max }
            }
        }
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::CapacityExceeded { .. } => ("CAPACITY_EXCEEDED", false, LogLevel::Debug),
        AppError::NotAnImage { .. } => ("NOT_AN_IMAGE", false, LogLevel::Debug),
        AppError::FileTooLarge { .. } => ("FILE_TOO_LARGE", false, LogLevel::Debug),
        AppError::UploadFailed { .. } => ("UPLOAD_FAILED", true, LogLevel::Error),
        AppError::DeleteFailed(_) => ("DELETE_FAILED", true, LogLevel::Error),
        AppError::UploadInProgress => ("UPLOAD_IN_PROGRESS", true, LogLevel::Warn),
        AppError::Disabled => ("UPLOAD_DISABLED", false, LogLevel::Debug),
        AppError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        AppError::InvalidImageUrl(_) => ("INVALID_IMAGE_URL", false, LogLevel::Warn),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::CapacityExceeded { max } => format!("Maximal {} Bilder erlaubt", max),
            AppError::NotAnImage { name } => format!("{} ist kein Bild", name),
            AppError::FileTooLarge { name, max_bytes } => {
                format!("{} ist zu groß (max {})", name, format_size_limit(*max_bytes))
            }
            AppError::UploadFailed { message } => format!("Fehler beim Hochladen: {}", message),
            AppError::DeleteFailed(_) => "Fehler beim Löschen des Bildes".to_string(),
            AppError::UploadInProgress => "Upload läuft bereits".to_string(),
            AppError::Disabled => "Bild-Upload ist deaktiviert".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::InvalidImageUrl(_) => "Ungültige Bild-URL".to_string(),
        }
    }
}
