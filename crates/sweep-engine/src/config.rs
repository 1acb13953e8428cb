use serde::{Deserialize, Serialize};

/// Branch names that are never pruned unless told otherwise.
pub const DEFAULT_KEEP: &[&str] = &["main", "master"];

/// Policy knobs for a pruning run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Branch names exempt from pruning.
    pub keep: Vec<String>,
    /// Delete past the backend's "not merged into HEAD" safety check.
    pub force: bool,
    /// Classify and report without deleting anything.
    pub dry_run: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            keep: DEFAULT_KEEP.iter().map(|s| s.to_string()).collect(),
            force: true,
            dry_run: false,
        }
    }
}

impl PruneConfig {
    /// Returns `true` if `branch` is on the keep-list.
    pub fn is_protected(&self, branch: &str) -> bool {
        self.keep.iter().any(|k| k == branch)
    }
}
