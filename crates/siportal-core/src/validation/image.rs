use std::sync::LazyLock;

use regex::Regex;

use crate::constants::MAX_IMAGE_SIZE_BYTES;
use crate::models::ImageFile;

static IMAGE_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^image/[a-z0-9.+-]+$").expect("image content type pattern is valid")
});

/// Validation errors for a single selected file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Not an image: {name} (content type: {content_type})")]
    NotAnImage { name: String, content_type: String },

    #[error("File too large: {name} is {size} bytes (max: {max} bytes)")]
    FileTooLarge { name: String, size: usize, max: usize },
}

/// Whether a MIME type names an image (`image/*`).
pub fn is_image_content_type(content_type: &str) -> bool {
    IMAGE_CONTENT_TYPE.is_match(content_type.trim())
}

/// Map a file extension to the image content type browsers report for it.
///
/// Returns `None` for anything that is not a known image extension.
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(content_type)
}

/// Image file validator
///
/// Checks run in order type, then size; the first violation is returned.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    max_file_size: usize,
}

impl ImageValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate content type
    pub fn validate_content_type(&self, file: &ImageFile) -> Result<(), ValidationError> {
        if !is_image_content_type(&file.content_type) {
            return Err(ValidationError::NotAnImage {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
            });
        }
        Ok(())
    }

    /// Validate file size
    pub fn validate_file_size(&self, file: &ImageFile) -> Result<(), ValidationError> {
        if file.size() > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                name: file.name.clone(),
                size: file.size(),
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    pub fn validate(&self, file: &ImageFile) -> Result<(), ValidationError> {
        self.validate_content_type(file)?;
        self.validate_file_size(file)?;
        Ok(())
    }

    /// Validate a whole selection in order, stopping at the first invalid file.
    pub fn validate_batch(&self, files: &[ImageFile]) -> Result<(), ValidationError> {
        files.iter().try_for_each(|file| self.validate(file))
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new(MAX_IMAGE_SIZE_BYTES)
    }
}
