//! Per-branch pruning policy.
//!
//! The policy is applied in a fixed order and the first rule that fires
//! decides:
//!
//! 1. the checked-out branch is kept,
//! 2. keep-listed branches are kept,
//! 3. a tip reachable from the reference commit is ancestor-merged,
//! 4. a tip whose tree reappears on the mainline is content-merged,
//! 5. anything else is kept as unmatched.
//!
//! Classification only reads. A branch whose evidence cannot be gathered is
//! kept as unmatched and the failure is logged; it never aborts the run.

use tracing::{debug, warn};

use crate::accessor::{GraphAccessor, LocalBranch};
use crate::ancestry::AncestryChecker;
use crate::config::PruneConfig;
use crate::error::AccessResult;
use crate::squash::SquashMergeDetector;
use crate::verdict::{Decision, KeepReason, PruneReason, Verdict};

/// Classifies branches against a reference commit.
pub struct PruneDecisionEngine<'a, A: ?Sized> {
    accessor: &'a A,
    config: &'a PruneConfig,
}

impl<'a, A: GraphAccessor + ?Sized> PruneDecisionEngine<'a, A> {
    /// Create an engine that exempts the branches `config` protects.
    pub fn new(accessor: &'a A, config: &'a PruneConfig) -> Self {
        Self { accessor, config }
    }

    /// Classify `branch` against `reference`.
    ///
    /// `current` is the checked-out branch name, `None` when HEAD is
    /// detached.
    pub fn decide(
        &self,
        branch: &LocalBranch<A::Id>,
        reference: &A::Id,
        current: Option<&str>,
    ) -> Decision<A::Id> {
        let name = branch.name.as_str();

        if current == Some(name) {
            return Decision::new(name, branch.tip, Verdict::Kept(KeepReason::Current));
        }
        if self.config.is_protected(name) {
            return Decision::new(name, branch.tip, Verdict::Kept(KeepReason::Protected));
        }

        let tip = match self.tip_of(branch) {
            Ok(Some(tip)) => tip,
            Ok(None) => {
                warn!(branch = %name, "cannot resolve branch tip; keeping it");
                let mut decision = Decision::new(name, None, Verdict::Kept(KeepReason::Unmatched));
                decision.error = Some("branch tip cannot be resolved".to_string());
                return decision;
            }
            Err(e) => {
                warn!(branch = %name, error = %e, "cannot resolve branch tip; keeping it");
                let mut decision = Decision::new(name, None, Verdict::Kept(KeepReason::Unmatched));
                decision.error = Some(e.to_string());
                return decision;
            }
        };

        match self.classify(&tip, reference) {
            Ok((verdict, matched)) => {
                let mut decision = Decision::new(name, Some(tip), verdict);
                decision.matched = matched;
                decision
            }
            Err(e) => {
                warn!(branch = %name, error = %e, "cannot classify branch; keeping it");
                let mut decision =
                    Decision::new(name, Some(tip), Verdict::Kept(KeepReason::Unmatched));
                decision.error = Some(e.to_string());
                decision
            }
        }
    }

    /// The listed tip, falling back to resolving the branch by name.
    fn tip_of(&self, branch: &LocalBranch<A::Id>) -> AccessResult<Option<A::Id>> {
        match branch.tip {
            Some(tip) => Ok(Some(tip)),
            None => {
                debug!(branch = %branch.name, "tip missing from listing; resolving by name");
                self.accessor.resolve(&branch.name)
            }
        }
    }

    fn classify(&self, tip: &A::Id, reference: &A::Id) -> AccessResult<(Verdict, Option<A::Id>)> {
        if AncestryChecker::new(self.accessor).is_merged(tip, reference)? {
            return Ok((Verdict::Pruned(PruneReason::AncestorMerged), None));
        }
        match SquashMergeDetector::new(self.accessor).find_match(tip, reference)? {
            Some(commit) => Ok((Verdict::Pruned(PruneReason::ContentMerged), Some(commit))),
            None => Ok((Verdict::Kept(KeepReason::Unmatched), None)),
        }
    }
}
