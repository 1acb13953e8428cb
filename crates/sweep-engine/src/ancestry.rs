//! Ancestor-merge detection.

use tracing::debug;

use crate::accessor::GraphAccessor;
use crate::error::AccessResult;

/// Answers "is this commit already contained in that one?".
pub struct AncestryChecker<'a, A: ?Sized> {
    accessor: &'a A,
}

impl<'a, A: GraphAccessor + ?Sized> AncestryChecker<'a, A> {
    /// Create a checker over `accessor`.
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// Returns `true` if `candidate` is reachable from `reference` through
    /// zero or more parent edges, following every parent of merge commits.
    ///
    /// Fails only when a commit on the way cannot be resolved.
    pub fn is_merged(&self, candidate: &A::Id, reference: &A::Id) -> AccessResult<bool> {
        let merged = self.accessor.is_ancestor(candidate, reference)?;
        debug!(candidate = %candidate, reference = %reference, merged, "ancestry check");
        Ok(merged)
    }
}
