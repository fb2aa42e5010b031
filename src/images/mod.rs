//! Image blob storage module.
//!
//! Uploaded photos are stored under the SHA-256 digest of their bytes, which
//! deduplicates identical uploads. Lookups by client-supplied filename are
//! confined to the blob directory, with `default.jpg` as the fallback.

mod storage;

pub use storage::{blob_filename, ImageStore};
