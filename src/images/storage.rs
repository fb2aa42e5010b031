//! Content-addressed image storage on the local filesystem.
//!
//! Every blob is named `<sha256-hex>.jpg` after its bytes, so identical
//! uploads land on the same file and are written once. Lookups take an
//! untrusted filename and are confined to the blob directory.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use bazaar_common::paths::{is_accepted_image, BLOB_EXTENSION, DEFAULT_IMAGE};
use bazaar_common::{Error, Result};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

/// Longest single path component most filesystems accept.
const MAX_FILENAME_LEN: usize = 255;

/// Fallback image installed when the blob directory has none.
const EMBEDDED_DEFAULT_IMAGE: &[u8] = include_bytes!("../../assets/default.jpg");

/// Filesystem manager for content-addressed image blobs.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open the blob directory, creating it if needed, and install the
    /// built-in default image if `default.jpg` is missing.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_default(root, EMBEDDED_DEFAULT_IMAGE)
    }

    /// Open the blob directory and install `default_image` as `default.jpg`
    /// if that file is missing. An existing sentinel is never overwritten.
    pub fn open_with_default(root: impl AsRef<Path>, default_image: &[u8]) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)
            .map_err(|e| io_context(e, "Failed to create image directory", root))?;

        let root = root
            .canonicalize()
            .map_err(|e| io_context(e, "Failed to canonicalize image directory", root))?;

        let store = Self { root };
        if store.write_new(DEFAULT_IMAGE, default_image)? {
            tracing::info!(path = %store.default_path().display(), "installed default image");
        }
        Ok(store)
    }

    /// The canonical blob directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the `default.jpg` sentinel.
    pub fn default_path(&self) -> PathBuf {
        self.root.join(DEFAULT_IMAGE)
    }

    /// Store image bytes and return their content-addressed filename.
    ///
    /// If a blob with the same digest already exists it is left untouched.
    pub fn store(&self, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::invalid_request("image data is empty"));
        }

        let filename = blob_filename(data);
        if self.write_new(&filename, data)? {
            tracing::debug!(filename = %filename, bytes = data.len(), "stored image");
        } else {
            tracing::debug!(filename = %filename, "image already stored");
        }
        Ok(filename)
    }

    /// Resolve a client-supplied filename to a path inside the blob directory.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidRequest` - anything but a single plain name of at most
    ///   255 bytes without NUL, a suffix other than `.jpg`/`.jpeg`, or a file
    ///   whose canonical path leaves the blob directory
    /// * `Error::NotFound` - a well-formed name with no file behind it
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty() {
            return Err(Error::invalid_request("filename is required"));
        }

        if filename.len() > MAX_FILENAME_LEN || filename.contains('\0') {
            return Err(Error::invalid_request(format!(
                "invalid image filename: {}",
                filename.escape_debug()
            )));
        }

        // Blobs live directly in the root, so exactly one plain name is allowed
        let relative = Path::new(filename);
        let mut components = relative.components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(name)), None) if name == filename
        ) {
            tracing::warn!(filename, "rejected image path with unsafe components");
            return Err(Error::invalid_request(format!(
                "invalid image path: {}",
                filename
            )));
        }

        if !is_accepted_image(relative) {
            return Err(Error::invalid_request(format!(
                "image path does not end with .jpg or .jpeg: {}",
                filename
            )));
        }

        let path = self.root.join(relative);
        let canonical = match path.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found(format!("image {}", filename)));
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                return Err(Error::invalid_request(format!(
                    "invalid image filename: {}",
                    filename
                )));
            }
            Err(e) => return Err(Error::Storage(e)),
        };

        // Symlinks inside the directory may still point elsewhere
        if !canonical.starts_with(&self.root) || canonical == self.root {
            tracing::warn!(filename, "rejected image path escaping the image directory");
            return Err(Error::invalid_request(format!(
                "invalid image path: {}",
                filename
            )));
        }

        Ok(canonical)
    }

    /// Resolve a filename, substituting the default image when it is missing.
    ///
    /// Invalid names are still rejected.
    pub fn resolve_or_default(&self, filename: &str) -> Result<PathBuf> {
        match self.resolve(filename) {
            Err(Error::NotFound(_)) => {
                tracing::debug!(filename, "image not found, serving default");
                Ok(self.default_path())
            }
            other => other,
        }
    }

    /// Write `data` to `filename` unless it already exists.
    ///
    /// Data goes to a temporary file first and is renamed into place without
    /// clobbering, so readers never see a partial blob. Returns whether this
    /// call created the file.
    fn write_new(&self, filename: &str, data: &[u8]) -> Result<bool> {
        let path = self.root.join(filename);
        if path.exists() {
            return Ok(false);
        }

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            // A concurrent writer with identical content got there first
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(io_context(e.error, "Failed to write image file", &path)),
        }
    }
}

/// Attach a message and path to an I/O error, keeping its kind.
fn io_context(err: io::Error, msg: &str, path: &Path) -> Error {
    Error::Storage(io::Error::new(
        err.kind(),
        format!("{} {}: {}", msg, path.display(), err),
    ))
}

/// Content-addressed filename for image bytes: hex SHA-256 plus `.jpg`.
pub fn blob_filename(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    format!("{}.{}", hex::encode(digest), BLOB_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_count(store: &ImageStore) -> usize {
        std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != DEFAULT_IMAGE)
            .count()
    }

    #[test]
    fn test_blob_filename_shape() {
        let name = blob_filename(b"test data");
        assert_eq!(name.len(), 64 + ".jpg".len());
        assert!(name.ends_with(".jpg"));
        assert!(name[..64].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_blob_filename_known_digest() {
        assert_eq!(
            blob_filename(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.jpg"
        );
    }

    #[test]
    fn test_blob_filename_differs_by_content() {
        assert_ne!(blob_filename(b"data1"), blob_filename(b"data2"));
    }

    #[test]
    fn test_open_installs_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("images")).unwrap();

        let default = std::fs::read(store.default_path()).unwrap();
        assert_eq!(default, EMBEDDED_DEFAULT_IMAGE);
        assert!(default.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_open_keeps_existing_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_IMAGE), b"custom default").unwrap();

        let store = ImageStore::open_with_default(dir.path(), b"replacement").unwrap();
        assert_eq!(std::fs::read(store.default_path()).unwrap(), b"custom default");
    }

    #[test]
    fn test_store_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let first = store.store(b"same bytes").unwrap();
        let second = store.store(b"same bytes").unwrap();
        assert_eq!(first, second);
        assert_eq!(blob_count(&store), 1);
        assert_eq!(std::fs::read(store.root().join(&first)).unwrap(), b"same bytes");
    }

    #[test]
    fn test_store_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let err = store.store(b"").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        store.store(b"one").unwrap();
        store.store(b"two").unwrap();
        store.store(b"one").unwrap();
        assert_eq!(blob_count(&store), 2);
    }

    #[test]
    fn test_resolve_stored_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let name = store.store(b"photo").unwrap();
        let path = store.resolve(&name).unwrap();
        assert_eq!(path, store.root().join(&name));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("secret.jpg"), b"secret").unwrap();

        for name in [
            "../secret.jpg",
            "../../etc/passwd",
            "a/../../secret.jpg",
            "./default.jpg",
            "/etc/passwd.jpg",
            "..",
        ] {
            let err = store.resolve(name).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{}", name);
        }
    }

    #[test]
    fn test_resolve_rejects_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();
        std::fs::write(store.root().join("notes.txt"), b"text").unwrap();

        for name in ["notes.txt", "image.png", "jpg", ""] {
            let err = store.resolve(name).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{}", name);
        }
    }

    #[test]
    fn test_resolve_rejects_malformed_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();
        let blob = store.store(b"photo").unwrap();

        for name in [
            format!("{}/x.jpg", blob),
            format!("{}/", blob),
            "a\0b.jpg".to_string(),
            format!("{}.jpg", "a".repeat(300)),
            "nested/dir/photo.jpg".to_string(),
        ] {
            let err = store.resolve(&name).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{:?}", name);

            let err = store.resolve_or_default(&name).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{:?}", name);
        }
    }

    #[test]
    fn test_open_keeps_io_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("images");
        std::fs::write(&not_a_dir, b"plain file").unwrap();

        match ImageStore::open(&not_a_dir) {
            Err(Error::Storage(e)) => assert_eq!(e.kind(), io::ErrorKind::AlreadyExists),
            other => panic!("expected storage error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path().join("images")).unwrap();
        let outside = dir.path().join("outside.jpg");
        std::fs::write(&outside, b"outside").unwrap();
        std::os::unix::fs::symlink(&outside, store.root().join("link.jpg")).unwrap();

        let err = store.resolve("link.jpg").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let missing = blob_filename(b"never stored");
        let err = store.resolve(&missing).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_resolve_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let path = store.resolve_or_default("missing.jpeg").unwrap();
        assert_eq!(path, store.default_path());

        let err = store.resolve_or_default("../missing.jpg").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
