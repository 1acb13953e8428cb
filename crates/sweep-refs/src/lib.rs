//! Reference management for branch-sweep.
//!
//! Named references (branches and HEAD) point at commits and are the entry
//! points the pruner works from.
//!
//! - **Branches** are mutable pointers to commits, stored under
//!   `refs/heads/<name>`.
//! - **HEAD** is a symbolic ref that names the current branch, or a detached
//!   ref pointing directly at a commit.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- Core ref types: [`BranchRef`], [`Head`]
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Branch name validation
//! - [`memory`] -- In-memory [`InMemoryRefStore`]

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use memory::InMemoryRefStore;
pub use names::validate_branch_name;
pub use traits::RefStore;
pub use types::{BranchRef, Head, BRANCH_PREFIX};
