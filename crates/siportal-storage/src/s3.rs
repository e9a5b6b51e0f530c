use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult, UploadOptions};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutMode, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;

/// Object-store backed storage
///
/// Production uses Amazon S3 or an S3-compatible provider; the same code runs
/// against any `object_store` implementation, e.g. [`InMemory`] for the
/// `memory` backend.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn object_store::ObjectStore>,
    bucket: String,
    url_prefix: String,
    backend: StorageBackend,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        // Path-style URLs for S3-compatible providers, virtual-hosted style for AWS
        let url_prefix = match endpoint_url {
            Some(endpoint) => format!("{}/{}/", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com/", bucket, region),
        };

        Ok(S3Storage {
            store: Arc::new(store),
            bucket,
            url_prefix,
            backend: StorageBackend::S3,
        })
    }

    /// In-process store, public URLs rooted at `public_base_url`.
    pub fn in_memory(bucket: String, public_base_url: &str) -> Self {
        Self::with_store(
            Arc::new(InMemory::new()),
            bucket,
            public_base_url,
            StorageBackend::Memory,
        )
    }

    /// Wrap an existing object store.
    pub fn with_store(
        store: Arc<dyn object_store::ObjectStore>,
        bucket: String,
        public_base_url: &str,
        backend: StorageBackend,
    ) -> Self {
        let url_prefix = format!("{}/{}/", public_base_url.trim_end_matches('/'), bucket);
        S3Storage {
            store,
            bucket,
            url_prefix,
            backend,
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let size = data.len() as u64;
        let location = Path::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::CacheControl,
            format!("max-age={}", options.cache_control).into(),
        );
        if let Some(ref content_type) = options.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }

        let put_options = PutOptions {
            mode: if options.upsert {
                PutMode::Overwrite
            } else {
                PutMode::Create
            },
            attributes,
            ..PutOptions::default()
        };

        let start = std::time::Instant::now();

        // put_opts is the only call that carries the put mode and attributes
        let result: ObjectResult<_> = object_store::ObjectStore::put_opts(
            self.store.as_ref(),
            &location,
            PutPayload::from(data),
            put_options,
        )
        .await;

        result.map_err(|e| match e {
            ObjectStoreError::AlreadyExists { .. } => StorageError::AlreadyExists(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object store upload failed"
                );
                StorageError::UploadFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store upload successful"
        );

        Ok(key.to_string())
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<()> {
        for storage_key in paths {
            validate_key(storage_key)?;
            let start = std::time::Instant::now();
            let location = Path::from(storage_key.clone());

            let result: ObjectResult<_> = self.store.delete(&location).await;

            match result {
                Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %storage_key,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Object store delete failed"
                    );
                    return Err(StorageError::DeleteFailed(e.to_string()));
                }
            }

            tracing::info!(
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object store delete successful"
            );
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        validate_key(path)?;
        let location = Path::from(path.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url_prefix(&self) -> String {
        self.url_prefix.clone()
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
