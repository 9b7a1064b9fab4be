//! Error types for the storage layer.

/// Errors a storage backend can surface.
///
/// Callers above the backend rarely propagate these; the store logs them
/// and falls back to absent-record semantics. They exist so backends can
/// say precisely what went wrong in those logs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying medium failed (filesystem, etc.).
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A key was rejected by the backend.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}
