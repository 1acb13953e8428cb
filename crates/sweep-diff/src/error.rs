//! Error types for the diff crate.

use sweep_types::ObjectId;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A subtree referenced during the scan was not found in the store.
    #[error("tree not found: {0:?}")]
    TreeNotFound(ObjectId),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] sweep_store::StoreError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
