//! Squash- and rebase-merge detection.
//!
//! A branch merged by squashing leaves no ancestry edge behind, but the
//! squash commit (or the last of the rebased commits) reproduces the branch
//! tip's tree exactly. The detector looks for such a commit on the mainline
//! after the point where the branch forked.

use tracing::debug;

use crate::accessor::GraphAccessor;
use crate::error::AccessResult;
use crate::merge_base::MergeBaseLocator;

/// Mainline commits that could carry a branch's content: reachable from the
/// reference commit but not from the merge base, oldest first.
///
/// Only commit ids are held. Trees are looked up while iterating, one
/// candidate at a time, and [`CandidateRange::iter`] can be called again to
/// restart the walk.
pub struct CandidateRange<'a, A: GraphAccessor + ?Sized> {
    accessor: &'a A,
    commits: Vec<A::Id>,
}

impl<'a, A: GraphAccessor + ?Sized> CandidateRange<'a, A> {
    /// Commits in `reference` that are not in `base`.
    pub fn new(accessor: &'a A, reference: &A::Id, base: &A::Id) -> AccessResult<Self> {
        let commits = accessor.candidate_range(reference, base)?;
        Ok(Self { accessor, commits })
    }

    /// Number of candidate commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns `true` if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Candidate commit ids, oldest first.
    pub fn commits(&self) -> &[A::Id] {
        &self.commits
    }

    /// Walk the candidates, resolving each commit's tree on demand.
    pub fn iter<'s>(&'s self) -> impl Iterator<Item = AccessResult<(A::Id, A::Id)>> + 's {
        let accessor: &'s A = self.accessor;
        self.commits
            .iter()
            .map(move |commit| accessor.tree(commit).map(|tree| (*commit, tree)))
    }
}

/// Finds a mainline commit whose tree equals a branch tip's tree.
pub struct SquashMergeDetector<'a, A: ?Sized> {
    accessor: &'a A,
}

impl<'a, A: GraphAccessor + ?Sized> SquashMergeDetector<'a, A> {
    /// Create a detector over `accessor`.
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// The first commit after `merge-base(tip, reference)` on the way to
    /// `reference` whose tree matches `tip`'s tree.
    ///
    /// `Ok(None)` when no such commit exists, including when the two
    /// histories share no ancestor.
    pub fn find_match(&self, tip: &A::Id, reference: &A::Id) -> AccessResult<Option<A::Id>> {
        let Some(base) = MergeBaseLocator::new(self.accessor).locate(tip, reference)? else {
            return Ok(None);
        };

        let tip_tree = self.accessor.tree(tip)?;
        let range = CandidateRange::new(self.accessor, reference, &base)?;
        debug!(tip = %tip, base = %base, candidates = range.len(), "scanning for squash merge");

        for candidate in range.iter() {
            let (commit, tree) = candidate?;
            if self.trees_match(&tip_tree, &tree)? {
                debug!(tip = %tip, commit = %commit, "tree match");
                return Ok(Some(commit));
            }
        }

        Ok(None)
    }

    /// Returns `true` if `tip` is content-merged into `reference`.
    pub fn is_content_merged(&self, tip: &A::Id, reference: &A::Id) -> AccessResult<bool> {
        Ok(self.find_match(tip, reference)?.is_some())
    }

    /// Equal ids are equal trees; otherwise pull at most one change.
    fn trees_match(&self, a: &A::Id, b: &A::Id) -> AccessResult<bool> {
        if a == b {
            return Ok(true);
        }
        match self.accessor.diff_trees(a, b)?.next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(e)) => Err(e),
        }
    }
}
