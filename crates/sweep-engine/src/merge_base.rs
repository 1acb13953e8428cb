//! Merge-base lookup.

use tracing::debug;

use crate::accessor::GraphAccessor;
use crate::error::AccessResult;

/// Finds the nearest common ancestor of two commits.
pub struct MergeBaseLocator<'a, A: ?Sized> {
    accessor: &'a A,
}

impl<'a, A: GraphAccessor + ?Sized> MergeBaseLocator<'a, A> {
    /// Create a locator over `accessor`.
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// The best common ancestor of `a` and `b`.
    ///
    /// `Ok(None)` means the histories are disjoint, which is an ordinary
    /// outcome. When several best ancestors exist (criss-cross merges) the
    /// first one reached walking from `a` is returned.
    pub fn locate(&self, a: &A::Id, b: &A::Id) -> AccessResult<Option<A::Id>> {
        let bases = self.accessor.merge_bases(a, b)?;
        match bases.as_slice() {
            [] => debug!(a = %a, b = %b, "no merge base; histories are disjoint"),
            [base] => debug!(a = %a, b = %b, base = %base, "merge base"),
            [base, ..] => debug!(
                a = %a,
                b = %b,
                base = %base,
                candidates = bases.len(),
                "several merge bases; using the first"
            ),
        }
        Ok(bases.first().copied())
    }
}
