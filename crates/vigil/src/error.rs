//! Unified error type for the Vigil crate.

use crate::AuthError;
use vigil_store::StoreError;

/// Top-level error that wraps the layer-specific errors.
///
/// Applications using the `vigil` crate deal with this single type; the
/// `#[from]` variants let `?` convert lower-layer errors automatically.
///
/// Note how little can actually fail from the caller's side: routine
/// session checks never error (the calculator is total and the store is
/// fail-safe), so this surfaces only handle misuse and direct use of the
/// lower layers.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// A storage-layer error (only from direct backend use; the session
    /// store itself swallows these).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An auth-provider error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A handle operation was attempted after the coordinator stopped.
    #[error("session coordinator is not running")]
    Closed,
}
