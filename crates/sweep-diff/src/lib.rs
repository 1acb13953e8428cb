//! Tree diff engine for branch-sweep.
//!
//! Compares two stored trees by scanning their sorted entry lists side by
//! side, descending into subtrees only where their ids differ. Changes are
//! produced lazily so a caller that only needs to know *whether* two
//! snapshots differ can stop after the first change.
//!
//! # Key Types
//!
//! - [`ChangedPaths`] -- iterator over the changes between two trees
//! - [`TreeChange`] -- a single added/deleted/modified/mode-changed path

pub mod error;
pub mod tree_diff;

pub use error::{DiffError, DiffResult};
pub use tree_diff::{changed_paths, ChangedPaths, TreeChange};
