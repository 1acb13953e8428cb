//! Error types for the pruning engine.

use std::error::Error as StdError;

/// Errors reported by a [`GraphAccessor`](crate::GraphAccessor).
///
/// Backends map their native errors into these variants; anything without a
/// natural home goes into [`AccessError::Backend`].
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// A commit id could not be resolved in the repository.
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// A tree id could not be resolved in the repository.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// The named branch does not exist.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// HEAD does not point at a commit.
    #[error("HEAD cannot be resolved: {0}")]
    HeadUnresolved(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl AccessError {
    /// Wrap a backend error.
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        AccessError::Backend(Box::new(err))
    }
}

/// Convenience alias for accessor results.
pub type AccessResult<T> = Result<T, AccessError>;

/// Failures that abort a whole pruning run.
///
/// Anything scoped to a single branch is recovered inside the engine and
/// never surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The reference commit (HEAD) cannot be resolved.
    #[error("cannot resolve the reference commit: {0}")]
    HeadUnresolved(#[source] AccessError),

    /// The current branch cannot be determined.
    #[error("cannot determine the current branch: {0}")]
    CurrentBranch(#[source] AccessError),

    /// Local branches cannot be listed.
    #[error("cannot list local branches: {0}")]
    ListBranches(#[source] AccessError),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
