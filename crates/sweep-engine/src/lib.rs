//! Merged-branch classification and pruning.
//!
//! The engine decides, for every local branch, whether its work has already
//! landed on the checked-out branch (the *reference commit*), and deletes the
//! branches that have. Two kinds of merge are recognised:
//!
//! - **ancestor-merged**: the branch tip is reachable from the reference
//!   commit, typically through a merge commit;
//! - **content-merged**: the branch was squashed or rebased, so no ancestry
//!   edge exists, but some mainline commit after the fork point reproduces
//!   the tip's tree exactly.
//!
//! Anything else is kept. The engine is generic over [`GraphAccessor`] and
//! never talks to a repository any other way.
//!
//! # Key Types
//!
//! - [`Pruner`] -- runs classification then deletion, producing a [`PruneReport`]
//! - [`PruneDecisionEngine`] -- per-branch policy
//! - [`AncestryChecker`], [`MergeBaseLocator`], [`SquashMergeDetector`] -- the evidence
//! - [`PruneConfig`] -- keep-list, force and dry-run settings

pub mod accessor;
pub mod ancestry;
pub mod config;
pub mod decision;
pub mod error;
pub mod merge_base;
pub mod pruner;
pub mod squash;
pub mod verdict;

#[cfg(test)]
pub(crate) mod testing;

pub use accessor::{DeleteOutcome, GraphAccessor, LocalBranch, PathChanges};
pub use ancestry::AncestryChecker;
pub use config::{PruneConfig, DEFAULT_KEEP};
pub use decision::PruneDecisionEngine;
pub use error::{AccessError, AccessResult, EngineError, EngineResult};
pub use merge_base::MergeBaseLocator;
pub use pruner::{branch_count, BranchReport, Outcome, PruneReport, Pruner};
pub use squash::{CandidateRange, SquashMergeDetector};
pub use verdict::{Decision, KeepReason, PruneReason, Verdict};
