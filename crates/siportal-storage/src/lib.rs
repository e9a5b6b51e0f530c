//! Siportal Storage Library
//!
//! This crate provides the object-store abstraction used by the image uploader
//! and its implementations for S3 (plus any other `object_store` backend, such
//! as the in-memory store) and the local filesystem.
//!
//! # Object key format
//!
//! Keys are owner-scoped: `{owner_id}/{timestamp_ms}-{suffix}.{ext}`. Every
//! backend keeps objects inside one bucket and exposes them at
//! `{public base}/{bucket}/{key}`, so the key of any public URL can be recovered
//! by stripping that prefix. Key generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_object_key, object_key_with};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use siportal_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult, UploadOptions};
