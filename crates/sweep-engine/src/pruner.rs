//! The pruning run: classify every branch, then delete the merged ones.

use std::fmt;

use tracing::{debug, info, warn};

use crate::accessor::{DeleteOutcome, GraphAccessor};
use crate::config::PruneConfig;
use crate::decision::PruneDecisionEngine;
use crate::error::{EngineError, EngineResult};
use crate::verdict::Decision;

/// What finally happened to a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The branch was deleted.
    Deleted,
    /// Dry run: the branch would have been deleted.
    WouldDelete,
    /// The verdict was `Kept`.
    Kept,
    /// The verdict was `Pruned` but the delete did not happen.
    Refused,
}

impl Outcome {
    /// Counts toward the deleted total.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Outcome::Deleted | Outcome::WouldDelete)
    }
}

/// A branch's decision and what was done about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchReport<Id> {
    /// Classification made in the first phase.
    pub decision: Decision<Id>,
    /// Action taken in the second phase.
    pub outcome: Outcome,
}

/// Summary of a pruning run, one entry per local branch in listing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PruneReport<Id> {
    /// Per-branch results.
    pub branches: Vec<BranchReport<Id>>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl<Id> PruneReport<Id> {
    /// Branches deleted (or that would be, in a dry run).
    pub fn deleted(&self) -> usize {
        self.branches.iter().filter(|b| b.outcome.is_deleted()).count()
    }

    /// Branches left in place, including refused deletions.
    pub fn kept(&self) -> usize {
        self.branches.len() - self.deleted()
    }

    /// Branches whose deletion was refused or failed.
    pub fn refused(&self) -> usize {
        self.branches
            .iter()
            .filter(|b| b.outcome == Outcome::Refused)
            .count()
    }

    /// Total number of local branches seen.
    pub fn total(&self) -> usize {
        self.branches.len()
    }

    /// Names of branches with the given outcome, in listing order.
    pub fn names_with(&self, outcome: Outcome) -> Vec<&str> {
        self.branches
            .iter()
            .filter(|b| b.outcome == outcome)
            .map(|b| b.decision.branch.as_str())
            .collect()
    }
}

/// "1 branch", "2 branches".
pub fn branch_count(n: usize) -> String {
    if n == 1 {
        "1 branch".to_string()
    } else {
        format!("{n} branches")
    }
}

impl<Id> fmt::Display for PruneReport<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        write!(
            f,
            "{verb} {}, kept {}",
            branch_count(self.deleted()),
            branch_count(self.kept())
        )
    }
}

/// Drives a full run against one repository.
pub struct Pruner<'a, A: ?Sized> {
    accessor: &'a A,
    config: &'a PruneConfig,
}

impl<'a, A: GraphAccessor + ?Sized> Pruner<'a, A> {
    /// Create a pruner with the given policy.
    pub fn new(accessor: &'a A, config: &'a PruneConfig) -> Self {
        Self { accessor, config }
    }

    /// Classify every local branch without touching anything.
    ///
    /// Fails only if the reference commit, the current branch or the branch
    /// list cannot be read.
    pub fn classify(&self) -> EngineResult<Vec<Decision<A::Id>>> {
        let reference = self.accessor.head().map_err(EngineError::HeadUnresolved)?;
        let current = self
            .accessor
            .current_branch()
            .map_err(EngineError::CurrentBranch)?;
        let branches = self
            .accessor
            .list_local_branches()
            .map_err(EngineError::ListBranches)?;

        debug!(
            reference = %reference,
            current = current.as_deref().unwrap_or("(detached)"),
            branches = branches.len(),
            "classifying branches"
        );

        let engine = PruneDecisionEngine::new(self.accessor, self.config);
        let decisions = branches
            .iter()
            .map(|branch| {
                let decision = engine.decide(branch, &reference, current.as_deref());
                info!(
                    branch = %decision.branch,
                    verdict = %decision.verdict,
                    reason = %decision.reason(),
                    "classified"
                );
                decision
            })
            .collect();

        Ok(decisions)
    }

    /// Classify every branch, then delete those judged merged.
    ///
    /// All reads happen before the first delete. Per-branch problems are
    /// logged and counted as kept; only the failures listed on
    /// [`classify`](Self::classify) abort the run.
    pub fn run(&self) -> EngineResult<PruneReport<A::Id>> {
        let decisions = self.classify()?;

        let branches = decisions
            .into_iter()
            .map(|decision| {
                let outcome = self.act(&decision);
                BranchReport { decision, outcome }
            })
            .collect();

        let report = PruneReport {
            branches,
            dry_run: self.config.dry_run,
        };
        if report.dry_run {
            info!(would_delete = report.deleted(), kept = report.kept(), "{report}");
        } else {
            info!(
                deleted = report.deleted(),
                kept = report.kept(),
                refused = report.refused(),
                "{report}"
            );
        }
        Ok(report)
    }

    fn act(&self, decision: &Decision<A::Id>) -> Outcome {
        if !decision.verdict.is_pruned() {
            return Outcome::Kept;
        }
        let name = decision.branch.as_str();

        if self.config.dry_run {
            info!(branch = %name, "would delete {name}");
            return Outcome::WouldDelete;
        }

        match self.accessor.delete_branch(name, self.config.force) {
            Ok(DeleteOutcome::Deleted) => {
                info!(branch = %name, verdict = %decision.verdict, "deleted {name}");
                Outcome::Deleted
            }
            Ok(DeleteOutcome::Refused) => {
                warn!(branch = %name, "failed to delete branch '{name}' since it has not been merged yet");
                Outcome::Refused
            }
            Err(e) => {
                warn!(branch = %name, error = %e, "failed to delete branch '{name}'");
                Outcome::Refused
            }
        }
    }
}
