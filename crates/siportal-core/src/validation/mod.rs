//! Validation modules

pub mod image;

pub use image::{content_type_for_extension, is_image_content_type, ImageValidator, ValidationError};
