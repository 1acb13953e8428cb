//! The contract between the engine and a repository backend.
//!
//! The engine never touches a repository directly. Everything it knows about
//! commits, trees and branches comes through [`GraphAccessor`], and the only
//! write it ever issues is [`GraphAccessor::delete_branch`].

use sweep_dag::ParentLookup;

use crate::error::{AccessError, AccessResult};

/// Lazy sequence of changed paths between two trees.
///
/// Consumers may stop after the first element; backends must not compute
/// more of the diff than has been pulled.
pub type PathChanges<'a> = Box<dyn Iterator<Item = AccessResult<String>> + 'a>;

/// A local branch as listed by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalBranch<Id> {
    /// Short branch name (e.g. "feature/auth").
    pub name: String,
    /// Tip commit, or `None` when the ref cannot be resolved.
    pub tip: Option<Id>,
}

impl<Id> LocalBranch<Id> {
    /// Create a new branch listing entry.
    pub fn new(name: impl Into<String>, tip: Option<Id>) -> Self {
        Self {
            name: name.into(),
            tip,
        }
    }
}

/// Result of asking the backend to delete a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The branch ref was removed.
    Deleted,
    /// The backend's own safety check declined the delete.
    Refused,
}

/// Read access to a commit graph plus the single mutation the pruner needs.
///
/// Commit and tree ids share the backend's `Id` type. Parent lookups come
/// from the [`ParentLookup`] supertrait, and the graph queries below default
/// to the generic algorithms in `sweep_dag`. A backend with native ancestry
/// support should override them.
pub trait GraphAccessor: ParentLookup<Error = AccessError> {
    /// Resolve a branch name, full ref name, `HEAD` or commit id.
    ///
    /// Returns `Ok(None)` if nothing by that name exists.
    fn resolve(&self, name: &str) -> AccessResult<Option<Self::Id>>;

    /// Root tree of a commit.
    fn tree(&self, commit: &Self::Id) -> AccessResult<Self::Id>;

    /// Returns `true` if `candidate` is reachable from `reference`.
    fn is_ancestor(&self, candidate: &Self::Id, reference: &Self::Id) -> AccessResult<bool> {
        sweep_dag::is_ancestor(self, candidate, reference)
    }

    /// Best common ancestors of `a` and `b`, preferred one first. Empty for
    /// disjoint histories.
    fn merge_bases(&self, a: &Self::Id, b: &Self::Id) -> AccessResult<Vec<Self::Id>> {
        sweep_dag::merge_bases(self, a, b)
    }

    /// Commits reachable from `reference` but not from `base`, parents
    /// before children.
    fn candidate_range(
        &self,
        reference: &Self::Id,
        base: &Self::Id,
    ) -> AccessResult<Vec<Self::Id>> {
        sweep_dag::exclusive_range(self, reference, base)
    }

    /// Paths that differ between two trees, produced lazily.
    fn diff_trees<'a>(&'a self, old: &Self::Id, new: &Self::Id) -> AccessResult<PathChanges<'a>>;

    /// All local branches, in the backend's order.
    fn list_local_branches(&self) -> AccessResult<Vec<LocalBranch<Self::Id>>>;

    /// Name of the checked-out branch, or `None` when HEAD is detached.
    fn current_branch(&self) -> AccessResult<Option<String>>;

    /// The commit HEAD points at.
    fn head(&self) -> AccessResult<Self::Id>;

    /// Delete a local branch.
    ///
    /// Unless `force` is set, the backend refuses when the branch tip is not
    /// reachable from HEAD.
    fn delete_branch(&self, name: &str, force: bool) -> AccessResult<DeleteOutcome>;
}
