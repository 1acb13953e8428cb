//! Content-addressed object storage for branch-sweep.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Blobs, trees and commits are stored as immutable
//! objects identified by their BLAKE3 hash (domain-separated by object kind).
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- a root tree plus ordered parent commits
//!
//! Typed values implement [`Object`]; the store itself only sees
//! [`StoredObject`]s, a kind tag plus bytes.

pub mod error;
pub mod hasher;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, Object, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
