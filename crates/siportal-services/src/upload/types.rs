use serde::Serialize;
use siportal_core::constants::{DEFAULT_CACHE_CONTROL, DEFAULT_MAX_IMAGES, MAX_IMAGE_SIZE_BYTES};
use siportal_core::{AppError, Config, UploadedImage};

/// Receives the replacement image list after a successful upload or removal.
///
/// The uploader never mutates the caller's list; it only proposes a new one
/// through this callback, so the caller stays the single writer.
pub trait ImagesChangeHandler: Send + Sync {
    fn on_images_change(&self, images: Vec<String>);
}

impl<F> ImagesChangeHandler for F
where
    F: Fn(Vec<String>) + Send + Sync,
{
    fn on_images_change(&self, images: Vec<String>) {
        self(images)
    }
}

/// Per-instance uploader settings
#[derive(Debug, Clone)]
pub struct UploaderSettings {
    owner_id: String,
    pub max_images: usize,
    pub max_file_size: usize,
    pub cache_control: String,
    pub disabled: bool,
}

impl UploaderSettings {
    /// Settings with the default limits. `owner_id` must not be blank.
    pub fn new(owner_id: impl Into<String>) -> Result<Self, AppError> {
        let owner_id = owner_id.into();
        let trimmed = owner_id.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("owner id must not be empty".to_string()));
        }
        if trimmed.contains('/') || trimmed.contains("..") {
            return Err(AppError::InvalidInput(format!(
                "owner id contains invalid characters: {}",
                owner_id
            )));
        }

        Ok(Self {
            owner_id: trimmed.to_string(),
            max_images: DEFAULT_MAX_IMAGES,
            max_file_size: MAX_IMAGE_SIZE_BYTES,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            disabled: false,
        })
    }

    /// Settings with limits taken from the application configuration.
    pub fn from_config(owner_id: impl Into<String>, config: &Config) -> Result<Self, AppError> {
        let mut settings = Self::new(owner_id)?;
        settings.max_images = config.max_images;
        settings.max_file_size = config.max_image_size_bytes;
        settings.cache_control = config.upload_cache_control.clone();
        Ok(settings)
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Result of a successful batch upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Objects created by this batch, in selection order
    pub uploaded: Vec<UploadedImage>,
    /// The list handed to the change handler
    pub images: Vec<String>,
}
