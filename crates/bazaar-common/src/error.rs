//! Common error types used throughout bazaar.
//!
//! Every fallible operation of the catalog and the image store reports one of
//! these variants. Only category-name races are resolved internally; nothing
//! here is retried on the caller's behalf.

/// Common error type for bazaar.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing input, a traversal attempt, or a disallowed suffix.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested item or image does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A database operation failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A blob filesystem operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The schema could not be provisioned.
    #[error("Schema error: {0}")]
    Schema(String),
}

impl Error {
    /// Create a new InvalidRequest error.
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new Storage error from a message.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(std::io::Error::other(msg.into()))
    }

    /// Create a new Schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
