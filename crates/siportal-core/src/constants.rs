//! Upload limits and defaults shared across crates.

/// Maximum number of images a single record may carry.
pub const DEFAULT_MAX_IMAGES: usize = 5;

/// Maximum accepted size of one image (5 MiB).
pub const MAX_IMAGE_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Cache-Control max-age (seconds) sent with every uploaded object.
pub const DEFAULT_CACHE_CONTROL: &str = "3600";

/// Bucket that holds user images.
pub const DEFAULT_IMAGE_BUCKET: &str = "images";

/// Length of the random suffix in generated object keys.
pub const OBJECT_KEY_SUFFIX_LEN: usize = 10;
