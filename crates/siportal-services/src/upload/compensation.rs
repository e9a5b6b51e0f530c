use siportal_storage::Storage;

/// Objects created by an in-flight batch, deleted again if the batch fails.
///
/// Each recorded path is removed on its own; one failed deletion does not stop
/// the next. Failures are logged and leave an orphaned object behind.
#[derive(Debug, Default)]
pub struct Compensation {
    paths: Vec<String>,
}

impl Compensation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<String>) {
        self.paths.push(path.into());
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every recorded object. Returns the paths that could not be removed.
    pub async fn run(self, storage: &dyn Storage) -> Vec<String> {
        let mut orphaned = Vec::new();

        for path in self.paths {
            match storage.remove(std::slice::from_ref(&path)).await {
                Ok(()) => {
                    tracing::debug!(key = %path, "Removed object from failed batch");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        key = %path,
                        "Failed to cleanup uploaded image after batch failure"
                    );
                    orphaned.push(path);
                }
            }
        }

        orphaned
    }
}
