use sweep_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{Commit, Object, StoredObject, Tree};

/// Content-addressed object storage.
///
/// Writing is idempotent: an object's id is derived from its kind and bytes,
/// so writing the same object twice stores it once and returns the same id.
/// Stored objects never change.
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` if nothing is stored under `id`.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    fn write(&self, object: StoredObject) -> StoreResult<ObjectId>;

    fn contains(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Like [`read`](Self::read) but a missing object is an error.
    fn load(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    fn read_tree(&self, id: &ObjectId) -> StoreResult<Tree> {
        self.load(id)?.decode(id)
    }

    fn read_commit(&self, id: &ObjectId) -> StoreResult<Commit> {
        self.load(id)?.decode(id)
    }

    /// Encode and write a typed object.
    fn put<T: Object>(&self, object: &T) -> StoreResult<ObjectId>
    where
        Self: Sized,
    {
        self.write(StoredObject::encode(object)?)
    }
}
