//! Error types for the commit graph.

use sweep_types::ObjectId;

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A referenced commit was not found in the graph.
    #[error("commit not found: {0:?}")]
    NodeNotFound(ObjectId),

    /// A parent reference points to a commit that does not exist.
    #[error("dangling parent reference: commit {node:?} references missing parent {parent:?}")]
    DanglingParent {
        /// The commit containing the bad reference.
        node: ObjectId,
        /// The missing parent.
        parent: ObjectId,
    },

    /// Attempted to add a commit with an ID that already exists.
    #[error("duplicate commit: {0:?}")]
    DuplicateNode(ObjectId),
}

/// Convenience alias for graph results.
pub type DagResult<T> = Result<T, DagError>;
