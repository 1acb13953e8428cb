//! Kind-separated content hashing.
//!
//! An object's id is `BLAKE3(domain ":" data)`, where the domain names the
//! object kind. A blob and a tree with byte-identical payloads therefore
//! never collide, and changing the encoding means bumping the version in
//! the domain.

use sweep_types::ObjectId;

use crate::object::ObjectKind;

impl ObjectKind {
    /// Domain tag mixed into every hash of this kind.
    pub fn domain(self) -> &'static str {
        match self {
            ObjectKind::Blob => "sweep-blob-v1",
            ObjectKind::Tree => "sweep-tree-v1",
            ObjectKind::Commit => "sweep-commit-v1",
        }
    }

    /// Id of an object of this kind with payload `data`.
    pub fn hash(self, data: &[u8]) -> ObjectId {
        let digest = blake3::Hasher::new()
            .update(self.domain().as_bytes())
            .update(b":")
            .update(data)
            .finalize();
        ObjectId::from_hash(digest.into())
    }
}
