//! Foundation types for branch-sweep.
//!
//! Every other crate in the workspace depends on `sweep-types` for the
//! identifier used to name commits, trees and blobs in the in-memory backend.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`IdPrefix`] -- Validated abbreviated id, as typed on a command line
//! - [`TypeError`] -- Parse failures for identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{IdPrefix, ObjectId};
