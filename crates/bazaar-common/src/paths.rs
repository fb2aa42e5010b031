//! Path rules for uploaded and served images.
//!
//! Uploads and lookups are restricted to JPEG suffixes. Stored blobs are
//! always written with the [`BLOB_EXTENSION`] suffix, and the sentinel
//! [`DEFAULT_IMAGE`] lives next to them in the blob directory.

use std::path::Path;

/// Image file extensions accepted on upload and on lookup.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Extension given to every content-addressed blob.
pub const BLOB_EXTENSION: &str = "jpg";

/// Filename of the immutable fallback image.
pub const DEFAULT_IMAGE: &str = "default.jpg";

/// Check if a path has an accepted image extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use bazaar_common::paths::is_accepted_image;
///
/// assert!(is_accepted_image(Path::new("bike.jpg")));
/// assert!(is_accepted_image(Path::new("/tmp/BIKE.JPEG")));
/// assert!(!is_accepted_image(Path::new("bike.png")));
/// ```
pub fn is_accepted_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
