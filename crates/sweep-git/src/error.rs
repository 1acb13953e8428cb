//! Error types for the git backend.

use std::path::PathBuf;

use sweep_engine::AccessError;

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// No repository was found at or above the path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched.
        path: PathBuf,
    },

    /// Object not found in the repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The object id, or whatever was being looked up.
        oid: String,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The missing ref.
        refname: String,
    },

    /// The credential helper could not be run.
    #[error("credential helper {helper} failed: {message}")]
    CredentialHelper {
        /// Helper name as configured in `credential.helper`.
        helper: String,
        /// What went wrong.
        message: String,
    },

    /// Internal libgit2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message.
        message: String,
    },
}

impl GitError {
    /// Classify a libgit2 error, using `context` to name what was looked up.
    pub(crate) fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound if context.starts_with("refs/") => GitError::RefNotFound {
                refname: context.to_string(),
            },
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<GitError> for AccessError {
    fn from(err: GitError) -> Self {
        AccessError::backend(err)
    }
}

/// Convenience alias for git backend results.
pub type GitResult<T> = Result<T, GitError>;

/// Map a failed commit lookup into the accessor's taxonomy.
pub(crate) fn commit_error(err: git2::Error, id: git2::Oid) -> AccessError {
    match err.code() {
        git2::ErrorCode::NotFound => AccessError::CommitNotFound(id.to_string()),
        _ => GitError::from_git2(err, &id.to_string()).into(),
    }
}

/// Map a failed tree lookup into the accessor's taxonomy.
pub(crate) fn tree_error(err: git2::Error, id: git2::Oid) -> AccessError {
    match err.code() {
        git2::ErrorCode::NotFound => AccessError::TreeNotFound(id.to_string()),
        _ => GitError::from_git2(err, &id.to_string()).into(),
    }
}
