//! In-memory repository for branch-sweep.
//!
//! [`MemoryRepository`] combines the content-addressed object store, the
//! commit arena and the ref store into a single [`GraphAccessor`]. It has a
//! small building API (write files, commit, branch, check out) so whole
//! histories can be assembled in a few lines and pruned without touching
//! disk.
//!
//! [`GraphAccessor`]: sweep_engine::GraphAccessor

pub mod error;
pub mod repository;

pub use error::{RepoError, RepoResult};
pub use repository::MemoryRepository;

// Re-export key types
pub use sweep_store::{EntryMode, TreeEntry};
pub use sweep_types::ObjectId;
