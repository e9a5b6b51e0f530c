#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use siportal_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(
                config.s3_bucket().to_string(),
                region,
                config.s3_endpoint.clone(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-s3")]
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; uploaded images are lost on exit");
            let storage =
                S3Storage::in_memory(config.storage_bucket.clone(), &config.public_base_url);
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 | StorageBackend::Memory => Err(StorageError::ConfigError(
            "Object store backends not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_storage_path.clone(),
                config.local_storage_base_url.clone(),
                config.storage_bucket.clone(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local", feature = "storage-s3"))]
mod tests {
    use super::*;

    fn config(vars: Vec<(&'static str, String)>) -> Config {
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_creates_local_backend_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(vec![(
            "LOCAL_STORAGE_PATH",
            dir.path().to_string_lossy().to_string(),
        )]);

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert_eq!(storage.bucket(), "images");
        assert!(dir.path().join("images").is_dir());
    }

    #[tokio::test]
    async fn test_creates_memory_backend() {
        let config = config(vec![
            ("STORAGE_BACKEND", "memory".to_string()),
            ("PUBLIC_BASE_URL", "https://cdn.test".to_string()),
        ]);

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
        assert_eq!(storage.public_url("k.png"), "https://cdn.test/images/k.png");
    }

    #[tokio::test]
    async fn test_s3_requires_region() {
        let config = config(vec![("STORAGE_BACKEND", "s3".to_string())]);
        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
