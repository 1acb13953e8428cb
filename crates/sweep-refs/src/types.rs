//! Core reference types.

use serde::{Deserialize, Serialize};
use sweep_types::ObjectId;

/// Namespace under which branches live.
pub const BRANCH_PREFIX: &str = "refs/heads/";

/// A local branch: a mutable, named pointer to a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Short branch name (e.g. "main", "feature/auth").
    pub name: String,
    /// Commit at the tip of this branch.
    pub target: ObjectId,
}

impl BranchRef {
    /// Create a new branch ref.
    pub fn new(name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Returns the canonical name for this ref (e.g. "refs/heads/main").
    pub fn canonical_name(&self) -> String {
        format!("{BRANCH_PREFIX}{}", self.name)
    }
}

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Head {
    /// HEAD points to a branch by name.
    Symbolic(String),
    /// HEAD is detached, pointing directly at a commit.
    Detached(ObjectId),
}

impl Head {
    /// The current branch name, or `None` when detached.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Head::Symbolic(name) => Some(name),
            Head::Detached(_) => None,
        }
    }
}
