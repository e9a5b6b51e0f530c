//! Object key generation and parsing shared by all backends.
//!
//! Key format: `{owner_id}/{timestamp_ms}-{suffix}.{ext}`.

use rand::distr::Alphanumeric;
use rand::Rng;
use siportal_core::constants::OBJECT_KEY_SUFFIX_LEN;

use crate::traits::{StorageError, StorageResult};

/// Generate a fresh object key for an owner.
///
/// The millisecond timestamp plus a random suffix keeps keys unique; uploads
/// are additionally made with no-overwrite semantics so a collision fails
/// instead of replacing another object.
pub fn generate_object_key(owner_id: &str, extension: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(OBJECT_KEY_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    object_key_with(
        owner_id,
        chrono::Utc::now().timestamp_millis(),
        &suffix,
        extension,
    )
}

/// Deterministic key construction from its parts.
pub fn object_key_with(owner_id: &str, timestamp_ms: i64, suffix: &str, extension: &str) -> String {
    format!(
        "{}/{}-{}.{}",
        owner_id.trim_matches('/'),
        timestamp_ms,
        suffix,
        extension.trim_start_matches('.')
    )
}

/// Reject keys that are empty or could escape the bucket.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Extract the object key from a public URL by stripping the backend's prefix.
///
/// Query strings and fragments (cache busters) are ignored.
pub fn key_from_public_url(url: &str, prefix: &str) -> StorageResult<String> {
    let without_query = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url);
    let key = without_query
        .strip_prefix(prefix)
        .ok_or_else(|| StorageError::InvalidKey(format!("URL is not served by this storage: {}", url)))?;
    validate_key(key)?;
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(
            object_key_with("user-1", 1_700_000_000_000, "abc123", "png"),
            "user-1/1700000000000-abc123.png"
        );
        assert_eq!(object_key_with("/u/", 1, "s", ".jpg"), "u/1-s.jpg");
    }

    #[test]
    fn generated_keys_are_unique_and_scoped() {
        let a = generate_object_key("owner", "png");
        let b = generate_object_key("owner", "png");
        assert_ne!(a, b);
        assert!(a.starts_with("owner/"));
        assert!(a.ends_with(".png"));
        let suffix = a.rsplit('-').next().unwrap().trim_end_matches(".png");
        assert_eq!(suffix.len(), OBJECT_KEY_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn key_from_url_strips_prefix() {
        let prefix = "https://cdn.example.com/storage/images/";
        let key = key_from_public_url(
            "https://cdn.example.com/storage/images/u1/1-abc.png?v=2",
            prefix,
        )
        .unwrap();
        assert_eq!(key, "u1/1-abc.png");
    }

    #[test]
    fn key_from_foreign_url_is_rejected() {
        let prefix = "https://cdn.example.com/storage/images/";
        assert!(key_from_public_url("https://elsewhere.org/u1/a.png", prefix).is_err());
        assert!(key_from_public_url(prefix, prefix).is_err());
        assert!(key_from_public_url("https://cdn.example.com/storage/images/../x", prefix).is_err());
    }
}
