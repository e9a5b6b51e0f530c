//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object-store backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::keys;
use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// The underlying message, without the prefix naming the failed operation.
    pub fn detail(&self) -> String {
        match self {
            StorageError::UploadFailed(msg)
            | StorageError::AlreadyExists(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::NotFound(msg)
            | StorageError::InvalidKey(msg)
            | StorageError::BackendError(msg)
            | StorageError::ConfigError(msg) => msg.clone(),
            StorageError::IoError(e) => e.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Options for a single upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Cache-Control max-age in seconds, sent along with the object
    pub cache_control: String,
    /// Replace an existing object under the same key. When false an existing
    /// key fails with [`StorageError::AlreadyExists`].
    pub upsert: bool,
    pub content_type: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            cache_control: siportal_core::constants::DEFAULT_CACHE_CONTROL.to_string(),
            upsert: false,
            content_type: None,
        }
    }
}

/// Storage abstraction trait
///
/// Each backend is bound to one bucket. Keys are paths inside that bucket;
/// see the crate root documentation for the layout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key` and return the stored path.
    async fn upload(&self, key: &str, data: Bytes, options: &UploadOptions)
        -> StorageResult<String>;

    /// Delete objects by path. Paths that do not exist are ignored.
    async fn remove(&self, paths: &[String]) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Public URL prefix: every public URL is this prefix followed by the path.
    fn public_url_prefix(&self) -> String;

    /// Bucket this backend writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Publicly reachable URL of a stored path
    fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.public_url_prefix(), path)
    }

    /// Recover the object path from a public URL produced by [`Storage::public_url`].
    fn object_key_from_url(&self, url: &str) -> StorageResult<String> {
        keys::key_from_public_url(url, &self.public_url_prefix())
    }
}
