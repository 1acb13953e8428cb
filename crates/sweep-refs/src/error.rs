use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefError {
    #[error("a branch named '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("'{name}' is not a valid branch name: {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("HEAD does not point anywhere")]
    HeadUnset,

    /// Deleting the branch HEAD points at would leave HEAD dangling.
    #[error("branch '{name}' is checked out")]
    DeleteCurrentBranch { name: String },

    #[error("ref store lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, RefError>;
