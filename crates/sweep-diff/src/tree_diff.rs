//! Tree-level diff: compare two trees and enumerate the paths that changed.
//!
//! Entries are compared by name in sorted order, detecting additions,
//! deletions, modifications, and mode changes. Subtrees are only read when
//! their ids differ, and only when the iterator is advanced far enough to
//! need them.

use std::cmp::Ordering;

use sweep_store::{EntryMode, ObjectStore, StoreError, TreeEntry};
use sweep_types::ObjectId;

use crate::error::{DiffError, DiffResult};

/// A single change between two trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeChange {
    /// A new entry was added.
    Added {
        path: String,
        new_id: ObjectId,
        mode: EntryMode,
    },
    /// An existing entry was deleted.
    Deleted {
        path: String,
        old_id: ObjectId,
        mode: EntryMode,
    },
    /// An entry's content changed (same path, different object ID).
    Modified {
        path: String,
        old_id: ObjectId,
        new_id: ObjectId,
        mode: EntryMode,
    },
    /// An entry's mode changed but content is the same.
    ModeChanged {
        path: String,
        id: ObjectId,
        old_mode: EntryMode,
        new_mode: EntryMode,
    },
}

impl TreeChange {
    /// The slash-separated path this change applies to.
    pub fn path(&self) -> &str {
        match self {
            TreeChange::Added { path, .. }
            | TreeChange::Deleted { path, .. }
            | TreeChange::Modified { path, .. }
            | TreeChange::ModeChanged { path, .. } => path,
        }
    }
}

/// Compare the trees `old` and `new`, yielding changed file paths lazily.
///
/// Directories are never reported themselves; a directory that appears or
/// disappears is reported as the files beneath it. Identical tree ids yield
/// nothing without touching the store.
pub fn changed_paths<'s>(
    store: &'s dyn ObjectStore,
    old: &ObjectId,
    new: &ObjectId,
) -> ChangedPaths<'s> {
    let stack = if old == new {
        Vec::new()
    } else {
        vec![Pending {
            prefix: String::new(),
            old: Some(*old),
            new: Some(*new),
        }]
    };
    ChangedPaths {
        store,
        stack,
        frames: Vec::new(),
        failed: false,
    }
}

/// Lazy iterator over the changes between two trees.
///
/// After the first error the iterator is fused and yields `None`.
pub struct ChangedPaths<'s> {
    store: &'s dyn ObjectStore,
    /// Subtree pairs discovered but not yet loaded.
    stack: Vec<Pending>,
    /// Loaded tree pairs being scanned, innermost last.
    frames: Vec<Frame>,
    failed: bool,
}

struct Pending {
    prefix: String,
    old: Option<ObjectId>,
    new: Option<ObjectId>,
}

struct Frame {
    prefix: String,
    old: Vec<TreeEntry>,
    new: Vec<TreeEntry>,
    i: usize,
    j: usize,
}

impl Frame {
    fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

impl ChangedPaths<'_> {
    fn load(&self, id: Option<ObjectId>) -> DiffResult<Vec<TreeEntry>> {
        match id {
            None => Ok(Vec::new()),
            Some(id) => match self.store.read_tree(&id) {
                Ok(tree) => Ok(tree.entries),
                Err(StoreError::NotFound(id)) => Err(DiffError::TreeNotFound(id)),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Advance the innermost frame by one entry, returning a change if the
    /// step produced one. Subtrees found along the way are queued.
    fn step(&mut self) -> Option<TreeChange> {
        let frame = self.frames.last_mut()?;

        let ordering = match (frame.old.get(frame.i), frame.new.get(frame.j)) {
            (None, None) => None,
            (Some(_), None) => Some(Ordering::Less),
            (None, Some(_)) => Some(Ordering::Greater),
            (Some(o), Some(n)) => Some(o.name.cmp(&n.name)),
        };
        let Some(ordering) = ordering else {
            self.frames.pop();
            return None;
        };

        match ordering {
            Ordering::Less => {
                let entry = frame.old[frame.i].clone();
                frame.i += 1;
                let path = frame.path(&entry.name);
                removed(&mut self.stack, path, entry)
            }
            Ordering::Greater => {
                let entry = frame.new[frame.j].clone();
                frame.j += 1;
                let path = frame.path(&entry.name);
                added(&mut self.stack, path, entry)
            }
            Ordering::Equal => {
                let old = frame.old[frame.i].clone();
                let new = frame.new[frame.j].clone();
                frame.i += 1;
                frame.j += 1;
                let path = frame.path(&new.name);

                if old.object_id == new.object_id && old.mode == new.mode {
                    return None;
                }
                match (old.mode.is_directory(), new.mode.is_directory()) {
                    (true, true) => {
                        self.stack.push(Pending {
                            prefix: path,
                            old: Some(old.object_id),
                            new: Some(new.object_id),
                        });
                        None
                    }
                    (false, false) if old.object_id == new.object_id => {
                        Some(TreeChange::ModeChanged {
                            path,
                            id: new.object_id,
                            old_mode: old.mode,
                            new_mode: new.mode,
                        })
                    }
                    (false, false) => Some(TreeChange::Modified {
                        path,
                        old_id: old.object_id,
                        new_id: new.object_id,
                        mode: new.mode,
                    }),
                    // A file replaced by a directory or the reverse.
                    (true, false) => {
                        self.stack.push(Pending {
                            prefix: path.clone(),
                            old: Some(old.object_id),
                            new: None,
                        });
                        Some(TreeChange::Added {
                            path,
                            new_id: new.object_id,
                            mode: new.mode,
                        })
                    }
                    (false, true) => {
                        self.stack.push(Pending {
                            prefix: path.clone(),
                            old: None,
                            new: Some(new.object_id),
                        });
                        Some(TreeChange::Deleted {
                            path,
                            old_id: old.object_id,
                            mode: old.mode,
                        })
                    }
                }
            }
        }
    }
}

fn removed(stack: &mut Vec<Pending>, path: String, entry: TreeEntry) -> Option<TreeChange> {
    if entry.mode.is_directory() {
        stack.push(Pending {
            prefix: path,
            old: Some(entry.object_id),
            new: None,
        });
        None
    } else {
        Some(TreeChange::Deleted {
            path,
            old_id: entry.object_id,
            mode: entry.mode,
        })
    }
}

fn added(stack: &mut Vec<Pending>, path: String, entry: TreeEntry) -> Option<TreeChange> {
    if entry.mode.is_directory() {
        stack.push(Pending {
            prefix: path,
            old: None,
            new: Some(entry.object_id),
        });
        None
    } else {
        Some(TreeChange::Added {
            path,
            new_id: entry.object_id,
            mode: entry.mode,
        })
    }
}

impl Iterator for ChangedPaths<'_> {
    type Item = DiffResult<TreeChange>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            // Queued subtrees are expanded before the parent scan resumes so
            // that paths come out depth-first.
            if let Some(Pending { prefix, old, new }) = self.stack.pop() {
                let loaded = self.load(old).and_then(|o| Ok((o, self.load(new)?)));
                match loaded {
                    Ok((old, new)) => self.frames.push(Frame {
                        prefix,
                        old,
                        new,
                        i: 0,
                        j: 0,
                    }),
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
                continue;
            }
            if self.frames.is_empty() {
                return None;
            }
            if let Some(change) = self.step() {
                return Some(Ok(change));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
