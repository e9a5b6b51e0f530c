use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use crate::validation::content_type_for_extension;

/// A file picked in one selection, not yet uploaded.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, deriving its content type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which the validator
    /// later rejects as not being an image.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(content_type_for_extension)
            .unwrap_or("application/octet-stream");

        Ok(Self::new(name, content_type, data))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Extension used for the stored object's key.
    ///
    /// Taken from the original name when present, otherwise from the subtype of
    /// an `image/*` content type, otherwise `bin`.
    pub fn extension(&self) -> String {
        let from_name = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
        if let Some(ext) = from_name {
            return ext.to_lowercase();
        }

        self.content_type
            .strip_prefix("image/")
            .map(|subtype| subtype.split('+').next().unwrap_or(subtype))
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// An image stored in the object store during an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub key: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_name() {
        let file = ImageFile::new("Baustelle.JPG", "image/jpeg", vec![1, 2]);
        assert_eq!(file.extension(), "jpg");
        assert_eq!(file.size(), 2);
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        let file = ImageFile::new("clipboard", "image/svg+xml", Vec::new());
        assert_eq!(file.extension(), "svg");
        let file = ImageFile::new("blob", "application/octet-stream", Vec::new());
        assert_eq!(file.extension(), "bin");
    }

    #[tokio::test]
    async fn from_path_detects_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helm.png");
        tokio::fs::write(&path, b"png bytes").await.unwrap();

        let file = ImageFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "helm.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.data.as_ref(), b"png bytes");

        let other = dir.path().join("notes.txt");
        tokio::fs::write(&other, b"text").await.unwrap();
        let file = ImageFile::from_path(&other).await.unwrap();
        assert_eq!(file.content_type, "application/octet-stream");
    }
}
