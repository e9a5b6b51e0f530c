//! Image uploader
//!
//! Drives one image form: appends a batch of selected files to the caller's
//! image list, or removes a single image from it. A batch is all-or-nothing
//! from the caller's point of view; objects created before a failure are
//! deleted again before the error is reported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use siportal_core::{AppError, ErrorMetadata, ImageFile, ImageValidator, LogLevel, UploadedImage};
use siportal_storage::{generate_object_key, Storage, StorageResult, UploadOptions};

use super::compensation::Compensation;
use super::types::{ImagesChangeHandler, UploadOutcome, UploaderSettings};

/// Holds the uploading flag for the duration of one operation.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Batch image uploader bound to one owner and one storage bucket
pub struct ImageUploader {
    storage: Arc<dyn Storage>,
    settings: UploaderSettings,
    validator: ImageValidator,
    uploading: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl ImageUploader {
    pub fn new(storage: Arc<dyn Storage>, settings: UploaderSettings) -> Self {
        let validator = ImageValidator::new(settings.max_file_size);
        Self {
            storage,
            settings,
            validator,
            uploading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &UploaderSettings {
        &self.settings
    }

    /// Whether a batch upload or removal is in flight; the form's controls
    /// should be disabled while this is true.
    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    /// User-facing message of the most recent failure, if the last operation failed.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// How many more images fit next to `current_len` existing ones.
    pub fn remaining_capacity(&self, current_len: usize) -> usize {
        self.settings.max_images.saturating_sub(current_len)
    }

    /// Upload a selection of files and append their URLs to `current`.
    ///
    /// `files` is consumed: once the call returns the selection is gone, so the
    /// same file can be picked again for the next call. On success
    /// `on_change` is called exactly once with `current` followed by the new
    /// URLs in selection order. On failure it is never called and every object
    /// this call created has been deleted (best effort).
    #[tracing::instrument(
        skip(self, current, files, on_change),
        fields(
            owner_id = %self.settings.owner_id(),
            current = current.len(),
            batch_size = files.len(),
            operation = "upload_images"
        )
    )]
    pub async fn select_and_upload(
        &self,
        current: &[String],
        files: Vec<ImageFile>,
        on_change: &dyn ImagesChangeHandler,
    ) -> Result<UploadOutcome, AppError> {
        self.set_error(None);

        if self.settings.disabled {
            return Err(self.fail(AppError::Disabled));
        }

        if files.is_empty() {
            return Ok(UploadOutcome {
                uploaded: Vec::new(),
                images: current.to_vec(),
            });
        }

        if current.len() + files.len() > self.settings.max_images {
            return Err(self.fail(AppError::CapacityExceeded {
                max: self.settings.max_images,
            }));
        }

        let _busy = match BusyGuard::acquire(&self.uploading) {
            Some(guard) => guard,
            None => return Err(self.fail(AppError::UploadInProgress)),
        };

        // Nothing is uploaded unless the whole selection is valid
        if let Err(e) = self.validator.validate_batch(&files) {
            return Err(self.fail(e.into()));
        }

        let mut compensation = Compensation::new();
        let mut uploaded = Vec::with_capacity(files.len());

        for file in files {
            match self.upload_one(file).await {
                Ok(image) => {
                    compensation.record(image.key.clone());
                    uploaded.push(image);
                }
                Err(e) => {
                    if compensation.is_empty() {
                        tracing::error!(error = %e, "Batch upload failed on its first image");
                    } else {
                        tracing::error!(
                            error = %e,
                            uploaded = compensation.len(),
                            "Batch upload failed, removing uploaded images"
                        );
                        let orphaned = compensation.run(self.storage.as_ref()).await;
                        if !orphaned.is_empty() {
                            tracing::warn!(
                                orphaned = ?orphaned,
                                "Some images of the failed batch could not be removed"
                            );
                        }
                    }
                    return Err(self.fail(AppError::UploadFailed {
                        message: e.detail(),
                    }));
                }
            }
        }

        let images: Vec<String> = current
            .iter()
            .cloned()
            .chain(uploaded.iter().map(|image| image.url.clone()))
            .collect();

        tracing::info!(
            uploaded = uploaded.len(),
            total = images.len(),
            "Image batch uploaded"
        );

        on_change.on_images_change(images.clone());

        Ok(UploadOutcome { uploaded, images })
    }

    /// Delete the image at `index` and drop it from `current`.
    ///
    /// The remote object is deleted first; the list only changes after the
    /// deletion is confirmed. Returns the new list.
    #[tracing::instrument(
        skip(self, current, on_change),
        fields(owner_id = %self.settings.owner_id(), operation = "remove_image")
    )]
    pub async fn remove_image(
        &self,
        current: &[String],
        index: usize,
        on_change: &dyn ImagesChangeHandler,
    ) -> Result<Vec<String>, AppError> {
        self.set_error(None);

        if self.settings.disabled {
            return Err(self.fail(AppError::Disabled));
        }

        let _busy = match BusyGuard::acquire(&self.uploading) {
            Some(guard) => guard,
            None => return Err(self.fail(AppError::UploadInProgress)),
        };

        let url = match current.get(index) {
            Some(url) => url,
            None => {
                return Err(self.fail(AppError::InvalidInput(format!(
                    "Kein Bild an Position {}",
                    index
                ))))
            }
        };

        let key = match self.storage.object_key_from_url(url) {
            Ok(key) => key,
            Err(e) => return Err(self.fail(AppError::InvalidImageUrl(e.to_string()))),
        };

        let owner_prefix = format!("{}/", self.settings.owner_id());
        if !key.starts_with(&owner_prefix) {
            return Err(self.fail(AppError::InvalidImageUrl(format!(
                "image {} does not belong to owner",
                key
            ))));
        }

        if let Err(e) = self.storage.remove(std::slice::from_ref(&key)).await {
            return Err(self.fail(AppError::DeleteFailed(e.to_string())));
        }

        let images: Vec<String> = current
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, url)| url.clone())
            .collect();

        tracing::info!(key = %key, remaining = images.len(), "Image removed");

        on_change.on_images_change(images.clone());

        Ok(images)
    }

    async fn upload_one(&self, file: ImageFile) -> StorageResult<UploadedImage> {
        let key = generate_object_key(self.settings.owner_id(), &file.extension());
        let options = UploadOptions {
            cache_control: self.settings.cache_control.clone(),
            upsert: false,
            content_type: Some(file.content_type.clone()),
        };

        tracing::debug!(
            key = %key,
            original_filename = %file.name,
            size_bytes = file.size(),
            "Uploading image"
        );

        let path = self.storage.upload(&key, file.data, &options).await?;
        let url = self.storage.public_url(&path);

        Ok(UploadedImage { key: path, url })
    }

    fn set_error(&self, message: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = message;
    }

    /// Log the error at its level and show its message in the error area.
    fn fail(&self, err: AppError) -> AppError {
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "Image operation rejected"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "Image operation rejected"),
            LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "Image operation failed"),
        }
        self.set_error(Some(err.client_message()));
        err
    }
}
