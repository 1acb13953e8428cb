//! Lazy tree comparison over libgit2 trees.
//!
//! libgit2's own tree-to-tree diff builds the complete delta list before
//! returning. The engine usually only asks whether two trees differ at all,
//! so this walk loads one directory level at a time and descends only into
//! subtrees whose ids differ.

use std::collections::{BTreeMap, VecDeque};

use git2::{ObjectType, Oid, Repository};

use sweep_engine::AccessResult;

use crate::error::tree_error;

#[derive(Clone, Copy)]
struct Entry {
    id: Oid,
    mode: i32,
    is_tree: bool,
}

/// Changed paths between two trees, produced level by level.
///
/// A directory that exists on only one side is reported as a single path.
/// After the first error the iterator is exhausted.
pub struct TreeChanges<'r> {
    repo: &'r Repository,
    /// Subtree pairs with differing ids, not yet loaded.
    pending: Vec<(String, Oid, Oid)>,
    /// Paths found but not yet yielded.
    ready: VecDeque<String>,
    failed: bool,
}

impl<'r> TreeChanges<'r> {
    /// Compare `old` against `new`. Equal ids yield nothing.
    pub fn new(repo: &'r Repository, old: Oid, new: Oid) -> Self {
        let pending = if old == new {
            Vec::new()
        } else {
            vec![(String::new(), old, new)]
        };
        Self {
            repo,
            pending,
            ready: VecDeque::new(),
            failed: false,
        }
    }

    /// Entries keyed by raw name bytes; names need not be UTF-8.
    fn entries(&self, tree: Oid) -> AccessResult<BTreeMap<Vec<u8>, Entry>> {
        let tree = self
            .repo
            .find_tree(tree)
            .map_err(|e| tree_error(e, tree))?;
        let entries = tree
            .iter()
            .map(|e| {
                let name = e.name_bytes().to_vec();
                let entry = Entry {
                    id: e.id(),
                    mode: e.filemode(),
                    is_tree: e.kind() == Some(ObjectType::Tree),
                };
                (name, entry)
            })
            .collect();
        Ok(entries)
    }

    fn expand(&mut self, prefix: &str, old: Oid, new: Oid) -> AccessResult<()> {
        let before = self.entries(old)?;
        let after = self.entries(new)?;
        let join = |name: &[u8]| {
            let name = String::from_utf8_lossy(name);
            if prefix.is_empty() {
                name.into_owned()
            } else {
                format!("{prefix}/{name}")
            }
        };

        for (name, a) in &before {
            match after.get(name) {
                Some(b) if a.id == b.id && a.mode == b.mode => {}
                Some(b) if a.is_tree && b.is_tree => {
                    self.pending.push((join(name), a.id, b.id));
                }
                _ => self.ready.push_back(join(name)),
            }
        }
        for name in after.keys().filter(|n| !before.contains_key(*n)) {
            self.ready.push_back(join(name));
        }
        Ok(())
    }
}

impl Iterator for TreeChanges<'_> {
    type Item = AccessResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(path) = self.ready.pop_front() {
                return Some(Ok(path));
            }
            let (prefix, old, new) = self.pending.pop()?;
            if let Err(e) = self.expand(&prefix, old, new) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}
