//! Classification results.
//!
//! A [`Verdict`] is produced fresh for every branch on every run and never
//! persisted. A [`Decision`] pairs it with the branch it was made for.

use std::fmt;

/// Why a branch is being kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeepReason {
    /// The branch is checked out.
    Current,
    /// The branch is on the keep-list.
    Protected,
    /// No merge evidence was found, or the evidence could not be gathered.
    Unmatched,
}

/// Why a branch is considered merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PruneReason {
    /// The tip is reachable from the reference commit.
    AncestorMerged,
    /// A mainline commit reproduces the tip's tree exactly.
    ContentMerged,
}

/// The classification of a single branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The branch stays.
    Kept(KeepReason),
    /// The branch is merged and may be deleted.
    Pruned(PruneReason),
}

impl Verdict {
    /// Returns `true` for any `Pruned` verdict.
    pub fn is_pruned(&self) -> bool {
        matches!(self, Verdict::Pruned(_))
    }

    /// Returns `true` for any `Kept` verdict.
    pub fn is_kept(&self) -> bool {
        matches!(self, Verdict::Kept(_))
    }
}

impl fmt::Display for KeepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Protected => write!(f, "protected"),
            Self::Unmatched => write!(f, "unmatched"),
        }
    }
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AncestorMerged => write!(f, "ancestor-merged"),
            Self::ContentMerged => write!(f, "content-merged"),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kept(reason) => write!(f, "kept: {reason}"),
            Self::Pruned(reason) => write!(f, "pruned: {reason}"),
        }
    }
}

/// A verdict together with the branch it applies to and its evidence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision<Id> {
    /// Short branch name.
    pub branch: String,
    /// Tip commit, if it could be resolved.
    pub tip: Option<Id>,
    /// The classification.
    pub verdict: Verdict,
    /// For content-merged branches, the mainline commit whose tree matched.
    pub matched: Option<Id>,
    /// For branches kept because evidence could not be gathered, the error.
    pub error: Option<String>,
}

impl<Id> Decision<Id> {
    /// A decision with no supporting evidence attached.
    pub fn new(branch: impl Into<String>, tip: Option<Id>, verdict: Verdict) -> Self {
        Self {
            branch: branch.into(),
            tip,
            verdict,
            matched: None,
            error: None,
        }
    }
}

impl<Id: fmt::Display> Decision<Id> {
    /// Human-readable justification for the verdict.
    pub fn reason(&self) -> String {
        match (&self.verdict, &self.matched, &self.error) {
            (Verdict::Kept(KeepReason::Current), _, _) => "checked out".to_string(),
            (Verdict::Kept(KeepReason::Protected), _, _) => "on the keep-list".to_string(),
            (Verdict::Kept(KeepReason::Unmatched), _, Some(err)) => {
                format!("could not be classified: {err}")
            }
            (Verdict::Kept(KeepReason::Unmatched), _, None) => "not merged".to_string(),
            (Verdict::Pruned(PruneReason::AncestorMerged), _, _) => {
                "reachable from the reference commit".to_string()
            }
            (Verdict::Pruned(PruneReason::ContentMerged), Some(commit), _) => {
                format!("tree reproduced by {commit}")
            }
            (Verdict::Pruned(PruneReason::ContentMerged), None, _) => {
                "tree reproduced on the mainline".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_levels() {
        assert_eq!(Verdict::Kept(KeepReason::Current).to_string(), "kept: current");
        assert_eq!(
            Verdict::Pruned(PruneReason::ContentMerged).to_string(),
            "pruned: content-merged"
        );
    }

    #[test]
    fn predicates_partition_verdicts() {
        let all = [
            Verdict::Kept(KeepReason::Current),
            Verdict::Kept(KeepReason::Protected),
            Verdict::Kept(KeepReason::Unmatched),
            Verdict::Pruned(PruneReason::AncestorMerged),
            Verdict::Pruned(PruneReason::ContentMerged),
        ];
        for v in all {
            assert_ne!(v.is_kept(), v.is_pruned());
        }
    }

    #[test]
    fn reason_mentions_matching_commit() {
        let mut d = Decision::new("feature-y", Some(9u32), Verdict::Pruned(PruneReason::ContentMerged));
        d.matched = Some(7);
        assert_eq!(d.reason(), "tree reproduced by 7");
    }

    #[test]
    fn reason_mentions_classification_error() {
        let mut d = Decision::new("broken", None::<u32>, Verdict::Kept(KeepReason::Unmatched));
        d.error = Some("commit not found: 42".into());
        assert!(d.reason().contains("commit not found"));
    }
}
