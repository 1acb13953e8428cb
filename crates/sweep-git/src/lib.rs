//! libgit2 backend for branch-sweep.
//!
//! [`GitRepository`] adapts an on-disk git repository to the engine's
//! [`GraphAccessor`](sweep_engine::GraphAccessor) contract. Commit and tree
//! ids are plain [`git2::Oid`]s; the engine itself never sees `git2`.
//!
//! The crate also carries the optional pre-prune fetch: [`fetch_remotes`]
//! refreshes every remote (pruning remote-tracking refs that went away)
//! using the transport settings in an explicit [`FetchContext`], and
//! [`CredentialHelper`] answers HTTPS credential requests through the
//! user's configured `git credential-<helper>`.

pub mod credentials;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::{CredentialHelper, CredentialKind, Credentials};
pub use diff::TreeChanges;
pub use error::{GitError, GitResult};
pub use fetch::{fetch_remotes, FetchContext, FetchSummary};
pub use repository::GitRepository;
