//! Configuration module
//!
//! Storage and upload settings are read from the environment (with `.env`
//! support). Every upload limit has a default so a bare checkout runs against
//! the local filesystem backend.

use std::env;

use crate::constants::{
    DEFAULT_CACHE_CONTROL, DEFAULT_IMAGE_BUCKET, DEFAULT_MAX_IMAGES, MAX_IMAGE_SIZE_BYTES,
};
use crate::storage_types::StorageBackend;

const DEFAULT_LOCAL_STORAGE_PATH: &str = "./storage";
const DEFAULT_LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/storage";
const DEFAULT_PUBLIC_BASE_URL: &str = "memory://public";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub storage_bucket: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub public_base_url: String,
    // Upload behavior
    pub max_images: usize,
    pub max_image_size_bytes: usize,
    pub upload_cache_control: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let max_images = match lookup("MAX_IMAGES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("MAX_IMAGES must be a valid number"))?,
            None => DEFAULT_MAX_IMAGES,
        };

        let max_image_size_bytes = match lookup("MAX_IMAGE_SIZE_MB") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be a valid number"))?
                .checked_mul(1024 * 1024)
                .ok_or_else(|| anyhow::anyhow!("MAX_IMAGE_SIZE_MB is too large"))?,
            None => MAX_IMAGE_SIZE_BYTES,
        };

        let config = Config {
            environment,
            storage_backend,
            storage_bucket: lookup("STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_IMAGE_BUCKET.to_string()),
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORAGE_BASE_URL.to_string()),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            max_images,
            max_image_size_bytes,
            upload_cache_control: lookup("UPLOAD_CACHE_CONTROL")
                .unwrap_or_else(|| DEFAULT_CACHE_CONTROL.to_string()),
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Bucket used by the S3 backend: `S3_BUCKET` when set, else `STORAGE_BUCKET`.
    pub fn s3_bucket(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or(&self.storage_bucket)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_images == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGES must be greater than 0"));
        }

        if self.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be greater than 0"));
        }

        if self.storage_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET must not be empty"));
        }

        if self.storage_backend == StorageBackend::S3 && self.s3_region.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_REGION or AWS_REGION to be set"
            ));
        }

        if self.is_production() && self.storage_backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=memory is not allowed in production"
            ));
        }

        Ok(())
    }
}
