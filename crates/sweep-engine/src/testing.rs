//! Scriptable in-test repository used by the engine's unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use sweep_dag::ParentLookup;

use crate::accessor::{DeleteOutcome, GraphAccessor, LocalBranch, PathChanges};
use crate::error::{AccessError, AccessResult};

#[derive(Debug, thiserror::Error)]
#[error("simulated failure: {0}")]
pub(crate) struct Simulated(pub String);

/// Commits are small integers; trees are integers mapping to path tables.
#[derive(Default)]
pub(crate) struct FakeRepo {
    commits: HashMap<u32, (Vec<u32>, u32)>,
    generations: HashMap<u32, u64>,
    trees: HashMap<u32, BTreeMap<String, u32>>,
    branches: RefCell<Vec<(String, Option<u32>)>>,
    current: Option<String>,
    head: Option<u32>,
    failing_deletes: HashSet<String>,
    failing_commits: HashSet<u32>,
    pub diff_calls: Cell<usize>,
    pub delete_calls: Cell<usize>,
    pub parent_calls: Cell<usize>,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tree from `(path, content)` pairs.
    pub fn snapshot(mut self, id: u32, files: &[(&str, u32)]) -> Self {
        let table = files.iter().map(|(p, c)| (p.to_string(), *c)).collect();
        self.trees.insert(id, table);
        self
    }

    /// Parents must be registered first for the generation to be right.
    pub fn commit(mut self, id: u32, parents: &[u32], tree: u32) -> Self {
        let generation = parents
            .iter()
            .filter_map(|p| self.generations.get(p))
            .max()
            .map_or(1, |g| g + 1);
        self.generations.insert(id, generation);
        self.commits.insert(id, (parents.to_vec(), tree));
        self
    }

    pub fn branch(self, name: &str, tip: u32) -> Self {
        self.branches.borrow_mut().push((name.to_string(), Some(tip)));
        self
    }

    pub fn broken_branch(self, name: &str) -> Self {
        self.branches.borrow_mut().push((name.to_string(), None));
        self
    }

    /// Check out `name`; HEAD follows its tip.
    pub fn checkout(mut self, name: &str) -> Self {
        let tip = self
            .branches
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, t)| *t);
        self.current = Some(name.to_string());
        self.head = tip;
        self
    }

    pub fn detach(mut self, at: u32) -> Self {
        self.current = None;
        self.head = Some(at);
        self
    }

    pub fn fail_delete(mut self, name: &str) -> Self {
        self.failing_deletes.insert(name.to_string());
        self
    }

    /// Make every parent lookup of `id` fail.
    pub fn fail_commit(mut self, id: u32) -> Self {
        self.failing_commits.insert(id);
        self
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.borrow().iter().any(|(n, _)| n == name)
    }

    pub fn branch_names(&self) -> Vec<String> {
        self.branches.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl ParentLookup for FakeRepo {
    type Id = u32;
    type Error = AccessError;

    fn parents(&self, id: &u32) -> AccessResult<Vec<u32>> {
        self.parent_calls.set(self.parent_calls.get() + 1);
        if self.failing_commits.contains(id) {
            return Err(AccessError::backend(Simulated(format!("commit {id}"))));
        }
        self.commits
            .get(id)
            .map(|(p, _)| p.clone())
            .ok_or_else(|| AccessError::CommitNotFound(id.to_string()))
    }

    fn generation(&self, id: &u32) -> AccessResult<Option<u64>> {
        Ok(self.generations.get(id).copied())
    }
}

impl GraphAccessor for FakeRepo {
    fn resolve(&self, name: &str) -> AccessResult<Option<u32>> {
        if name == "HEAD" {
            return Ok(self.head);
        }
        let from_branch = self
            .branches
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, t)| *t);
        Ok(from_branch.or_else(|| {
            name.parse::<u32>()
                .ok()
                .filter(|id| self.commits.contains_key(id))
        }))
    }

    fn tree(&self, commit: &u32) -> AccessResult<u32> {
        self.commits
            .get(commit)
            .map(|(_, t)| *t)
            .ok_or_else(|| AccessError::CommitNotFound(commit.to_string()))
    }

    fn diff_trees<'a>(&'a self, old: &u32, new: &u32) -> AccessResult<PathChanges<'a>> {
        self.diff_calls.set(self.diff_calls.get() + 1);
        let a = self
            .trees
            .get(old)
            .ok_or_else(|| AccessError::TreeNotFound(old.to_string()))?;
        let b = self
            .trees
            .get(new)
            .ok_or_else(|| AccessError::TreeNotFound(new.to_string()))?;
        let mut paths: Vec<String> = a
            .iter()
            .filter(|(p, c)| b.get(*p) != Some(*c))
            .map(|(p, _)| p.clone())
            .collect();
        paths.extend(b.keys().filter(|p| !a.contains_key(*p)).cloned());
        paths.sort();
        Ok(Box::new(paths.into_iter().map(Ok::<String, AccessError>)))
    }

    fn list_local_branches(&self) -> AccessResult<Vec<LocalBranch<u32>>> {
        Ok(self
            .branches
            .borrow()
            .iter()
            .map(|(n, t)| LocalBranch::new(n.clone(), *t))
            .collect())
    }

    fn current_branch(&self) -> AccessResult<Option<String>> {
        Ok(self.current.clone())
    }

    fn head(&self) -> AccessResult<u32> {
        self.head
            .ok_or_else(|| AccessError::HeadUnresolved("no commit checked out".into()))
    }

    fn delete_branch(&self, name: &str, force: bool) -> AccessResult<DeleteOutcome> {
        self.delete_calls.set(self.delete_calls.get() + 1);
        if self.failing_deletes.contains(name) {
            return Err(AccessError::backend(Simulated(format!("delete {name}"))));
        }
        let tip = self
            .branches
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
            .ok_or_else(|| AccessError::BranchNotFound(name.to_string()))?;
        if !force {
            let merged = match (tip, self.head) {
                (Some(tip), Some(head)) => sweep_dag::is_ancestor(self, &tip, &head)?,
                _ => false,
            };
            if !merged {
                return Ok(DeleteOutcome::Refused);
            }
        }
        self.branches.borrow_mut().retain(|(n, _)| n != name);
        Ok(DeleteOutcome::Deleted)
    }
}

/// The repository shared by several test modules.
///
/// ```text
///   1 -- 2 -- 5 -- 6 -- 7 -- 8        main (8 merges feature-x at 4)
///         \    \              /
///          \    +-- 10        |       feature-z (unique content)
///           3 ------- 4 -----+        feature-x
///            \
///             9                       feature-y (tree equals 7's tree)
/// ```
///
/// `release-1.0` points at 5 and is therefore ancestor-merged.
pub(crate) fn mainline_repo() -> FakeRepo {
    FakeRepo::new()
        .snapshot(100, &[("README", 1)])
        .snapshot(200, &[("README", 1), ("lib.rs", 1)])
        .snapshot(300, &[("README", 1), ("x.rs", 1)])
        .snapshot(400, &[("README", 1), ("x.rs", 2)])
        .snapshot(500, &[("README", 2), ("lib.rs", 1)])
        .snapshot(600, &[("README", 2), ("lib.rs", 2)])
        .snapshot(700, &[("README", 2), ("lib.rs", 2), ("y.rs", 1)])
        .snapshot(701, &[("README", 2), ("lib.rs", 2), ("y.rs", 1)])
        .snapshot(800, &[("README", 2), ("lib.rs", 2), ("x.rs", 2), ("y.rs", 1)])
        .snapshot(900, &[("README", 1), ("y.rs", 1)])
        .snapshot(1000, &[("README", 2), ("lib.rs", 1), ("z.rs", 9)])
        .commit(1, &[], 100)
        .commit(2, &[1], 200)
        .commit(3, &[2], 300)
        .commit(4, &[3], 400)
        .commit(5, &[2], 500)
        .commit(6, &[5], 600)
        .commit(7, &[6], 700)
        .commit(8, &[7, 4], 800)
        .commit(9, &[3], 701)
        .commit(10, &[5], 1000)
        .branch("feature-x", 4)
        .branch("feature-y", 9)
        .branch("feature-z", 10)
        .branch("main", 8)
        .branch("release-1.0", 5)
        .checkout("main")
}
