use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use sweep_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Object store backed by a `HashMap`.
///
/// Reads re-hash the stored bytes and fail with [`StoreError::Corrupt`] on a
/// mismatch.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> RwLockReadGuard<'_, HashMap<ObjectId, StoredObject>> {
        self.objects.read().expect("object store lock poisoned")
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        match self.objects().get(id) {
            Some(object) if object.id() != *id => Err(StoreError::Corrupt(*id)),
            found => Ok(found.cloned()),
        }
    }

    fn write(&self, object: StoredObject) -> StoreResult<ObjectId> {
        let id = object.id();
        self.objects
            .write()
            .expect("object store lock poisoned")
            .entry(id)
            .or_insert(object);
        Ok(id)
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.objects().contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .finish()
    }
}
