//! Batch image upload with compensating cleanup

mod compensation;
mod service;
mod types;

pub use compensation::Compensation;
pub use service::ImageUploader;
pub use types::{ImagesChangeHandler, UploadOutcome, UploaderSettings};
