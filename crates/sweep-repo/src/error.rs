use thiserror::Error;

use sweep_engine::AccessError;
use sweep_types::ObjectId;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("commit not found: {0}")]
    CommitNotFound(ObjectId),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("ambiguous commit prefix {prefix}: {matches} commits match")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error("invalid path in snapshot: {0:?}")]
    InvalidPath(String),

    #[error("store error: {0}")]
    Store(#[from] sweep_store::StoreError),

    #[error("graph error: {0}")]
    Dag(#[from] sweep_dag::DagError),

    #[error("ref error: {0}")]
    Ref(#[from] sweep_refs::RefError),

    #[error("diff error: {0}")]
    Diff(#[from] sweep_diff::DiffError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AccessError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::CommitNotFound(id) => AccessError::CommitNotFound(id.to_hex()),
            RepoError::BranchNotFound(name) => AccessError::BranchNotFound(name),
            RepoError::Dag(sweep_dag::DagError::NodeNotFound(id)) => {
                AccessError::CommitNotFound(id.to_hex())
            }
            RepoError::Diff(sweep_diff::DiffError::TreeNotFound(id)) => {
                AccessError::TreeNotFound(id.to_hex())
            }
            other => AccessError::backend(other),
        }
    }
}
