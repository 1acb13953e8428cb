//! Commit history graph for branch-sweep.
//!
//! Two layers live here. [`CommitGraph`] is an arena of commits keyed by
//! [`ObjectId`](sweep_types::ObjectId) with a forward (children) index, used
//! by the in-memory backend. The functions in [`traverse`] are generic over
//! [`ParentLookup`], so the same ancestry, merge-base and range algorithms
//! run against the arena or against any other backend that can list a
//! commit's parents.

pub mod error;
pub mod graph;
pub mod traverse;

pub use error::{DagError, DagResult};
pub use graph::{CommitGraph, CommitNode};
pub use traverse::{ancestors, exclusive_range, is_ancestor, merge_base, merge_bases, ParentLookup};
