use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sweep_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// What a stored payload decodes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        })
    }
}

/// A value the store can hold.
pub trait Object: Sized {
    const KIND: ObjectKind;

    fn encode(&self) -> StoreResult<Vec<u8>>;

    fn decode(data: &[u8]) -> StoreResult<Self>;
}

/// An encoded object as the store keeps it: a kind tag and opaque bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

impl StoredObject {
    pub fn encode<T: Object>(object: &T) -> StoreResult<Self> {
        Ok(Self {
            kind: T::KIND,
            data: object.encode()?,
        })
    }

    /// Decode as `T`. `id` is only used for error reporting.
    pub fn decode<T: Object>(&self, id: &ObjectId) -> StoreResult<T> {
        if self.kind != T::KIND {
            return Err(StoreError::WrongKind {
                id: *id,
                expected: T::KIND,
                actual: self.kind,
            });
        }
        T::decode(&self.data)
    }

    /// Content-derived id.
    pub fn id(&self) -> ObjectId {
        self.kind.hash(&self.data)
    }
}

fn to_json<T: Serialize>(kind: ObjectKind, value: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StoreError::Encoding {
        kind,
        message: e.to_string(),
    })
}

fn from_json<T: DeserializeOwned>(kind: ObjectKind, data: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(data).map_err(|e| StoreError::Encoding {
        kind,
        message: e.to_string(),
    })
}

/// File contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self(data.into())
    }
}

impl Object for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn encode(&self) -> StoreResult<Vec<u8>> {
        Ok(self.0.clone())
    }

    fn decode(data: &[u8]) -> StoreResult<Self> {
        Ok(Self(data.to_vec()))
    }
}

/// How a tree entry is checked out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    File,
    Executable,
    Symlink,
    Directory,
}

impl EntryMode {
    pub fn is_directory(self) -> bool {
        self == EntryMode::Directory
    }
}

/// One name in a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub mode: EntryMode,
    pub object_id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            mode,
            object_id,
        }
    }
}

/// A directory snapshot.
///
/// Entries are kept sorted by name, which makes the encoding (and so the
/// id) independent of insertion order and lets a diff merge two listings
/// in one pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        let idx = self
            .entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()?;
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Object for Tree {
    const KIND: ObjectKind = ObjectKind::Tree;

    fn encode(&self) -> StoreResult<Vec<u8>> {
        to_json(Self::KIND, self)
    }

    fn decode(data: &[u8]) -> StoreResult<Self> {
        from_json(Self::KIND, data)
    }
}

/// A snapshot with its history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: ObjectId,
    /// In order; the first parent is the line the commit was made on.
    pub parents: Vec<ObjectId>,
    pub message: String,
    /// Logical creation order. Keeps otherwise identical commits distinct.
    pub sequence: u64,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

impl Object for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn encode(&self) -> StoreResult<Vec<u8>> {
        to_json(Self::KIND, self)
    }

    fn decode(data: &[u8]) -> StoreResult<Self> {
        from_json(Self::KIND, data)
    }
}
