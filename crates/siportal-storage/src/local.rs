use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult, UploadOptions};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}` and are served from
/// `{base_url}/{bucket}/{key}`.
#[derive(Clone)]
pub struct LocalStorage {
    bucket_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/siportal/storage")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/storage")
    /// * `bucket` - Bucket directory below `base_path`
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
    ) -> StorageResult<Self> {
        validate_key(&bucket)?;
        let bucket_path = base_path.into().join(&bucket);

        fs::create_dir_all(&bucket_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                bucket_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            bucket_path,
            base_url,
            bucket,
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.bucket_path.join(storage_key);
        if path.strip_prefix(&self.bucket_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// Remove a file whose contents could not be written. Its key never reaches
/// the caller, so nobody else would delete it.
async fn discard_on_error(path: &Path, written: std::io::Result<()>) -> StorageResult<()> {
    let Err(e) = written else {
        return Ok(());
    };

    if let Err(remove_err) = fs::remove_file(path).await {
        if remove_err.kind() != ErrorKind::NotFound {
            tracing::warn!(
                error = %remove_err,
                path = %path.display(),
                "Failed to remove partially written file"
            );
        }
    }

    Err(StorageError::UploadFailed(format!(
        "Failed to write file {}: {}",
        path.display(),
        e
    )))
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut open = fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = open.open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(key.to_string()),
            _ => StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                path.display(),
                e
            )),
        })?;

        let written: std::io::Result<()> = async {
            file.write_all(&data).await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        discard_on_error(&path, written).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            cache_control = %options.cache_control,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(key.to_string())
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<()> {
        for storage_key in paths {
            let path = self.key_to_path(storage_key)?;
            let start = std::time::Instant::now();

            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::DeleteFailed(format!(
                        "Failed to delete file {}: {}",
                        path.display(),
                        e
                    )))
                }
            }

            tracing::info!(
                path = %path.display(),
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local storage delete successful"
            );
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let path = self.key_to_path(path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url_prefix(&self) -> String {
        format!("{}/{}/", self.base_url.trim_end_matches('/'), self.bucket)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
