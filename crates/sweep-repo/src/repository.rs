use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use sweep_dag::{CommitGraph, CommitNode, ParentLookup};
use sweep_engine::{AccessError, AccessResult, DeleteOutcome, GraphAccessor, LocalBranch, PathChanges};
use sweep_refs::{BranchRef, Head, InMemoryRefStore, RefError, RefStore, BRANCH_PREFIX};
use sweep_store::{Blob, Commit, EntryMode, InMemoryObjectStore, ObjectStore, Tree, TreeEntry};
use sweep_types::{IdPrefix, ObjectId};

use crate::error::{RepoError, RepoResult};

/// A complete repository held in memory.
///
/// Objects live in an [`InMemoryObjectStore`], the commit graph in a
/// [`CommitGraph`] arena and branches in an [`InMemoryRefStore`]. Commits get
/// a logical timestamp from a counter, so building the same history twice
/// yields the same ids.
pub struct MemoryRepository {
    store: InMemoryObjectStore,
    refs: InMemoryRefStore,
    graph: RwLock<CommitGraph>,
    clock: AtomicU64,
}

impl MemoryRepository {
    /// Create an empty repository with HEAD on the unborn branch `main`.
    pub fn init() -> RepoResult<Self> {
        let repo = Self {
            store: InMemoryObjectStore::new(),
            refs: InMemoryRefStore::new(),
            graph: RwLock::new(CommitGraph::new()),
            clock: AtomicU64::new(1),
        };
        repo.refs.set_head("main")?;
        Ok(repo)
    }

    // ---- Object operations ----

    pub fn write_blob(&self, data: &[u8]) -> RepoResult<ObjectId> {
        Ok(self.store.put(&Blob::new(data))?)
    }

    pub fn write_tree(&self, entries: Vec<TreeEntry>) -> RepoResult<ObjectId> {
        Ok(self.store.put(&Tree::new(entries))?)
    }

    /// Write a snapshot from `(path, content)` pairs and return its root tree.
    ///
    /// Paths use `/` as separator; intermediate directories are created as
    /// subtrees.
    pub fn write_files(&self, files: &[(&str, &str)]) -> RepoResult<ObjectId> {
        let mut root = Dir::default();
        for (path, content) in files {
            let blob = self.write_blob(content.as_bytes())?;
            root.insert(path, path, blob)?;
        }
        self.write_dir(&root)
    }

    fn write_dir(&self, dir: &Dir) -> RepoResult<ObjectId> {
        let mut entries: Vec<TreeEntry> = dir
            .files
            .iter()
            .map(|(name, id)| TreeEntry::new(EntryMode::File, name.clone(), *id))
            .collect();
        for (name, sub) in &dir.dirs {
            let id = self.write_dir(sub)?;
            entries.push(TreeEntry::new(EntryMode::Directory, name.clone(), id));
        }
        self.write_tree(entries)
    }

    // ---- Commit operations ----

    /// Record a commit of `tree` on top of `parents` without moving any
    /// branch.
    pub fn commit(&self, tree: ObjectId, parents: &[ObjectId], message: &str) -> RepoResult<ObjectId> {
        self.store.read_tree(&tree)?;
        {
            let graph = self.graph()?;
            if let Some(missing) = parents.iter().find(|p| !graph.contains(p)) {
                return Err(RepoError::CommitNotFound(*missing));
            }
        }

        let commit = Commit {
            tree,
            parents: parents.to_vec(),
            message: message.to_string(),
            sequence: self.clock.fetch_add(1, Ordering::Relaxed),
        };
        let id = self.store.put(&commit)?;
        self.graph_mut()?
            .add_node(CommitNode::new(id, tree, commit.parents))?;

        debug!(commit = %id.short_hex(), message, "recorded commit");
        Ok(id)
    }

    /// Commit `tree` on `branch` and advance it.
    ///
    /// An unborn branch gets a root commit and is created.
    pub fn commit_on(&self, branch: &str, tree: ObjectId, message: &str) -> RepoResult<ObjectId> {
        let parents: Vec<ObjectId> = self.branch_tip(branch)?.into_iter().collect();
        let id = self.commit(tree, &parents, message)?;
        self.refs.write_branch(&BranchRef::new(branch, id))?;
        Ok(id)
    }

    /// Record a merge of `other` into `branch` with the resolved `tree`.
    pub fn merge(
        &self,
        branch: &str,
        other: ObjectId,
        tree: ObjectId,
        message: &str,
    ) -> RepoResult<ObjectId> {
        let tip = self
            .branch_tip(branch)?
            .ok_or_else(|| RepoError::BranchNotFound(branch.into()))?;
        let id = self.commit(tree, &[tip, other], message)?;
        self.refs.write_branch(&BranchRef::new(branch, id))?;
        Ok(id)
    }

    // ---- Branch operations ----

    pub fn create_branch(&self, name: &str, at: ObjectId) -> RepoResult<()> {
        if self.refs.branch_exists(name)? {
            return Err(RefError::AlreadyExists { name: name.into() }.into());
        }
        if !self.graph()?.contains(&at) {
            return Err(RepoError::CommitNotFound(at));
        }
        self.refs.write_branch(&BranchRef::new(name, at))?;
        Ok(())
    }

    pub fn switch_branch(&self, name: &str) -> RepoResult<()> {
        if !self.refs.branch_exists(name)? {
            return Err(RepoError::BranchNotFound(name.into()));
        }
        self.refs.set_head(name)?;
        Ok(())
    }

    /// Point HEAD straight at a commit.
    pub fn detach(&self, at: ObjectId) -> RepoResult<()> {
        if !self.graph()?.contains(&at) {
            return Err(RepoError::CommitNotFound(at));
        }
        self.refs.set_head_detached(at)?;
        Ok(())
    }

    pub fn branch_tip(&self, name: &str) -> RepoResult<Option<ObjectId>> {
        Ok(self.refs.read_branch(name)?.map(|b| b.target))
    }

    pub fn branch_names(&self) -> RepoResult<Vec<String>> {
        let branches = self.refs.branches()?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    pub fn commit_count(&self) -> RepoResult<usize> {
        Ok(self.graph()?.len())
    }

    // ---- Internals ----

    fn graph(&self) -> RepoResult<RwLockReadGuard<'_, CommitGraph>> {
        self.graph
            .read()
            .map_err(|e| RepoError::Internal(format!("lock poisoned: {e}")))
    }

    fn graph_mut(&self) -> RepoResult<RwLockWriteGuard<'_, CommitGraph>> {
        self.graph
            .write()
            .map_err(|e| RepoError::Internal(format!("lock poisoned: {e}")))
    }

    /// The commit HEAD points at; `None` on an unborn branch or unset HEAD.
    fn head_commit(&self) -> RepoResult<Option<ObjectId>> {
        match self.refs.head()? {
            Some(Head::Symbolic(name)) => self.branch_tip(&name),
            Some(Head::Detached(id)) => Ok(Some(id)),
            None => Ok(None),
        }
    }

    /// Resolve a full or abbreviated hex commit id.
    fn lookup_commit(&self, hex: &str) -> RepoResult<Option<ObjectId>> {
        let Ok(prefix) = IdPrefix::parse(hex) else {
            return Ok(None);
        };
        let matches = self.graph()?.find_by_prefix(&prefix);
        match matches.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(RepoError::AmbiguousPrefix {
                prefix: hex.to_string(),
                matches: matches.len(),
            }),
        }
    }
}

impl std::fmt::Debug for MemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("objects", &self.store.len())
            .finish_non_exhaustive()
    }
}

/// Directory being assembled by [`MemoryRepository::write_files`].
#[derive(Default)]
struct Dir {
    files: BTreeMap<String, ObjectId>,
    dirs: BTreeMap<String, Dir>,
}

impl Dir {
    fn insert(&mut self, rest: &str, full: &str, blob: ObjectId) -> RepoResult<()> {
        match rest.split_once('/') {
            Some((name, tail)) if !name.is_empty() && !self.files.contains_key(name) => {
                self.dirs.entry(name.to_string()).or_default().insert(tail, full, blob)
            }
            None if !rest.is_empty() && !self.dirs.contains_key(rest) => {
                self.files.insert(rest.to_string(), blob);
                Ok(())
            }
            _ => Err(RepoError::InvalidPath(full.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Accessor
// ---------------------------------------------------------------------------

impl ParentLookup for MemoryRepository {
    type Id = ObjectId;
    type Error = AccessError;

    fn parents(&self, id: &ObjectId) -> AccessResult<Vec<ObjectId>> {
        let graph = self.graph()?;
        let node = graph.get_node(id).ok_or(RepoError::CommitNotFound(*id))?;
        Ok(node.parents.clone())
    }

    fn generation(&self, id: &ObjectId) -> AccessResult<Option<u64>> {
        Ok(self.graph()?.generation_of(id))
    }
}

impl GraphAccessor for MemoryRepository {
    fn resolve(&self, name: &str) -> AccessResult<Option<ObjectId>> {
        if name == "HEAD" {
            return Ok(self.head_commit()?);
        }
        let short = name.strip_prefix(BRANCH_PREFIX).unwrap_or(name);
        if let Some(tip) = self.branch_tip(short)? {
            return Ok(Some(tip));
        }
        Ok(self.lookup_commit(name)?)
    }

    fn tree(&self, commit: &ObjectId) -> AccessResult<ObjectId> {
        let tree = self.graph()?.tree_of(commit).map_err(RepoError::from)?;
        Ok(tree)
    }

    fn diff_trees<'a>(&'a self, old: &ObjectId, new: &ObjectId) -> AccessResult<PathChanges<'a>> {
        let changes = sweep_diff::changed_paths(&self.store, old, new).map(|change| {
            change
                .map(|c| c.path().to_string())
                .map_err(|e| AccessError::from(RepoError::from(e)))
        });
        Ok(Box::new(changes))
    }

    fn list_local_branches(&self) -> AccessResult<Vec<LocalBranch<ObjectId>>> {
        let branches = self.refs.branches().map_err(RepoError::from)?;
        Ok(branches
            .into_iter()
            .map(|b| LocalBranch::new(b.name, Some(b.target)))
            .collect())
    }

    fn current_branch(&self) -> AccessResult<Option<String>> {
        let head = self.refs.head().map_err(RepoError::from)?;
        Ok(head.and_then(|h| h.branch().map(str::to_string)))
    }

    fn head(&self) -> AccessResult<ObjectId> {
        match self.refs.head().map_err(RepoError::from)? {
            Some(Head::Symbolic(name)) => self.branch_tip(&name)?.ok_or_else(|| {
                AccessError::HeadUnresolved(format!("branch '{name}' has no commits yet"))
            }),
            Some(Head::Detached(id)) => Ok(id),
            None => Err(AccessError::HeadUnresolved(RefError::HeadUnset.to_string())),
        }
    }

    fn delete_branch(&self, name: &str, force: bool) -> AccessResult<DeleteOutcome> {
        let tip = self
            .branch_tip(name)?
            .ok_or_else(|| AccessError::BranchNotFound(name.into()))?;

        if !force {
            let merged = match self.head_commit()? {
                Some(head) => sweep_dag::is_ancestor(self, &tip, &head)?,
                None => false,
            };
            if !merged {
                debug!(branch = %name, "tip not reachable from HEAD; refusing");
                return Ok(DeleteOutcome::Refused);
            }
        }

        match self.refs.delete_branch(name) {
            Ok(true) => Ok(DeleteOutcome::Deleted),
            Ok(false) => Err(AccessError::BranchNotFound(name.into())),
            Err(RefError::DeleteCurrentBranch { .. }) => {
                warn!(branch = %name, "refusing to delete the checked-out branch");
                Ok(DeleteOutcome::Refused)
            }
            Err(e) => Err(RepoError::from(e).into()),
        }
    }
}
