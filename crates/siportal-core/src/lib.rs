//! Siportal Core Library
//!
//! This crate provides the domain models, error types, configuration, and image
//! validation shared by the storage backends, the upload service, and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use format::format_size_limit;
pub use models::{ImageFile, UploadedImage};
pub use storage_types::StorageBackend;
pub use validation::{ImageValidator, ValidationError};
