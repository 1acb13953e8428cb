//! The [`RefStore`] trait defining the reference storage interface.

use crate::error::Result;
use crate::types::{BranchRef, Head};

/// Storage backend for branches and HEAD.
///
/// Implementations must be thread-safe (`Send + Sync`). Branches are
/// addressed by their short name; the store owns the `refs/heads/`
/// namespace.
pub trait RefStore: Send + Sync {
    /// Read a branch by short name.
    ///
    /// Returns `Ok(None)` if the branch does not exist.
    fn read_branch(&self, name: &str) -> Result<Option<BranchRef>>;

    /// Create or move a branch.
    fn write_branch(&self, branch: &BranchRef) -> Result<()>;

    /// Delete a branch by short name.
    ///
    /// Returns `Ok(true)` if the branch existed and was deleted, `Ok(false)`
    /// if it did not exist. Deleting the branch HEAD points at is an error.
    fn delete_branch(&self, name: &str) -> Result<bool>;

    /// All branches, sorted by name.
    fn branches(&self) -> Result<Vec<BranchRef>>;

    /// Read the current HEAD state.
    ///
    /// Returns `Ok(None)` if HEAD has not been set.
    fn head(&self) -> Result<Option<Head>>;

    /// Point HEAD at a branch (symbolic ref).
    fn set_head(&self, branch: &str) -> Result<()>;

    /// Detach HEAD at a commit.
    fn set_head_detached(&self, target: sweep_types::ObjectId) -> Result<()>;

    /// Returns `true` if the branch exists.
    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.read_branch(name)?.is_some())
    }
}
