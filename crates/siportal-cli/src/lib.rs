//! Helpers for the `siportal` binary: the JSON file that stands in for the
//! record owning an image list, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use serde::Serialize;
use siportal_services::ImagesChangeHandler;

/// Read an image list. A missing file is an empty list.
pub fn load_images(path: &Path) -> anyhow::Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Invalid image list in {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write an image list as pretty JSON.
pub fn save_images(path: &Path, images: &[String]) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(images).context("Serialize image list")?;
    std::fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Change handler that persists every proposed list to a JSON file.
///
/// Write failures are kept and reported by [`JsonListWriter::finish`], since
/// the handler callback itself cannot fail.
pub struct JsonListWriter {
    path: PathBuf,
    error: Mutex<Option<anyhow::Error>>,
}

impl JsonListWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            error: Mutex::new(None),
        }
    }

    pub fn finish(self) -> anyhow::Result<()> {
        match self
            .error
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
        {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ImagesChangeHandler for JsonListWriter {
    fn on_images_change(&self, images: Vec<String>) {
        if let Err(e) = save_images(&self.path, &images) {
            tracing::error!(error = %e, path = %self.path.display(), "Failed to persist image list");
            *self
                .error
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(e);
        }
    }
}

/// Print `value` as pretty JSON, then report any failed list write.
///
/// The result goes out first: when the list file cannot be written the
/// uploaded objects already exist, and their URLs must still reach the user.
pub fn print_then_finish(
    value: &impl Serialize,
    writer: JsonListWriter,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Serialize response")?;
    writeln!(out, "{}", json).context("Write response")?;
    writer.finish()
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
