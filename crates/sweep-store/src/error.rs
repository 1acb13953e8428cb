use sweep_types::ObjectId;

use crate::object::ObjectKind;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The id is present but names a different kind of object.
    #[error("object {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("cannot encode or decode {kind}: {message}")]
    Encoding { kind: ObjectKind, message: String },

    /// Stored bytes no longer hash to the id they were stored under.
    #[error("object {0} is corrupt")]
    Corrupt(ObjectId),
}

pub type StoreResult<T> = Result<T, StoreError>;
