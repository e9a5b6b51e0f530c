//! Test helpers: an in-memory storage that records calls and injects faults.
//!
//! Run with: `cargo test -p siportal-services --test image_upload_test`

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use siportal_core::ImageFile;
use siportal_services::{ImagesChangeHandler, S3Storage, Storage, StorageBackend};
use siportal_storage::{StorageError, StorageResult, UploadOptions};
use tokio::sync::Notify;

pub const PUBLIC_BASE: &str = "https://cdn.siportal.test/storage/v1/object/public";

/// Storage double backed by the real in-memory object store.
pub struct TestStorage {
    inner: S3Storage,
    upload_calls: AtomicUsize,
    fail_upload_at: Option<usize>,
    fail_removes: AtomicBool,
    uploads: Mutex<Vec<String>>,
    removes: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
    entered: Arc<Notify>,
}

impl TestStorage {
    pub fn new() -> Self {
        Self {
            inner: S3Storage::in_memory("images".to_string(), PUBLIC_BASE),
            upload_calls: AtomicUsize::new(0),
            fail_upload_at: None,
            fail_removes: AtomicBool::new(false),
            uploads: Mutex::new(Vec::new()),
            removes: Mutex::new(Vec::new()),
            gate: None,
            entered: Arc::new(Notify::new()),
        }
    }

    /// Fail the `n`-th upload call (1-based).
    pub fn failing_upload_at(mut self, n: usize) -> Self {
        self.fail_upload_at = Some(n);
        self
    }

    /// Make every remove call fail.
    pub fn failing_removes(self) -> Self {
        self.fail_removes.store(true, Ordering::SeqCst);
        self
    }

    /// Block every upload until `gate` is notified. `entered()` fires when an
    /// upload starts waiting.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn entered(&self) -> Arc<Notify> {
        self.entered.clone()
    }

    pub fn set_failing_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn removes(&self) -> Vec<String> {
        self.removes.lock().unwrap().clone()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.exists(key).await.unwrap()
    }

    /// Put an object directly, bypassing the recorder.
    pub async fn seed(&self, key: &str) -> String {
        let path = self
            .inner
            .upload(key, Bytes::from_static(b"seed"), &UploadOptions::default())
            .await
            .unwrap();
        self.inner.public_url(&path)
    }
}

#[async_trait]
impl Storage for TestStorage {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        let call = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.uploads.lock().unwrap().push(key.to_string());

        if let Some(ref gate) = self.gate {
            self.entered.notify_one();
            gate.notified().await;
        }

        if self.fail_upload_at == Some(call) {
            return Err(StorageError::UploadFailed("connection reset".to_string()));
        }
        self.inner.upload(key, data, options).await
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<()> {
        self.removes.lock().unwrap().extend(paths.iter().cloned());
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("permission denied".to_string()));
        }
        self.inner.remove(paths).await
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        self.inner.exists(path).await
    }

    fn public_url_prefix(&self) -> String {
        self.inner.public_url_prefix()
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Change handler that records every list it receives.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImagesChangeHandler for RecordingHandler {
    fn on_images_change(&self, images: Vec<String>) {
        self.calls.lock().unwrap().push(images);
    }
}

/// Minimal PNG header padded to `size` bytes.
pub fn png(name: &str, size: usize) -> ImageFile {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(size.max(data.len()), 0);
    ImageFile::new(name, "image/png", data)
}

pub fn pdf(name: &str) -> ImageFile {
    ImageFile::new(name, "application/pdf", b"%PDF-1.7".to_vec())
}

pub const MIB: usize = 1024 * 1024;
