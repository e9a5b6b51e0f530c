//! Siportal Services Layer
//!
//! Business services on top of the storage crate. The image uploader owns the
//! batch upload workflow (validate → upload → compensate on failure) and the
//! single-image removal used by the image form.

pub mod upload;

pub use siportal_storage::{create_storage, LocalStorage, S3Storage, Storage, StorageBackend};
pub use upload::{ImageUploader, ImagesChangeHandler, UploadOutcome, UploaderSettings};
