//! Scratch repositories on disk for the backend's tests.

use std::cell::Cell;
use std::collections::BTreeMap;

use git2::{BranchType, Oid, Repository, Signature, Time};
use tempfile::TempDir;

use crate::repository::GitRepository;

/// Write a tree from `(path, content)` pairs; `/` separates directories.
pub(crate) fn write_tree(repo: &Repository, files: &[(&str, &str)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    let mut dirs: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
    for &(path, content) in files {
        match path.split_once('/') {
            Some((dir, rest)) => dirs.entry(dir).or_default().push((rest, content)),
            None => {
                let blob = repo.blob(content.as_bytes()).unwrap();
                builder.insert(path, blob, 0o100644).unwrap();
            }
        }
    }
    for (dir, entries) in dirs {
        let sub = write_tree(repo, &entries);
        builder.insert(dir, sub, 0o040000).unwrap();
    }
    builder.write().unwrap()
}

/// Write a flat tree whose file names are single, possibly non-UTF-8, bytes.
pub(crate) fn write_raw_tree(repo: &Repository, files: &[(u8, &str)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for &(name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(vec![name], blob, 0o100644).unwrap();
    }
    builder.write().unwrap()
}

/// A fresh repository in a temporary directory with HEAD on unborn `main`.
pub(crate) struct Scratch {
    pub dir: TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl Scratch {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.set_head("refs/heads/main").unwrap();
        Self {
            dir,
            repo,
            clock: Cell::new(1_700_000_000),
        }
    }

    fn signature(&self) -> Signature<'static> {
        let t = self.clock.get();
        self.clock.set(t + 60);
        Signature::new("Sweep Test", "sweep@example.com", &Time::new(t, 0)).unwrap()
    }

    pub fn tip(&self, branch: &str) -> Option<Oid> {
        self.repo
            .find_branch(branch, BranchType::Local)
            .ok()
            .and_then(|b| b.get().target())
    }

    /// Commit `tree` with the given parents and point `branch` at it.
    fn record(&self, branch: &str, parents: &[Oid], tree: Oid, message: &str) -> Oid {
        let tree = self.repo.find_tree(tree).unwrap();
        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|p| self.repo.find_commit(*p).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        let sig = self.signature();
        let id = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        self.branch(branch, id);
        id
    }

    /// Commit on top of `branch` (a root commit if it does not exist yet).
    pub fn commit(&self, branch: &str, files: &[(&str, &str)], message: &str) -> Oid {
        self.commit_tree(branch, write_tree(&self.repo, files), message)
    }

    /// Like [`commit`](Self::commit) with a tree that is already written.
    pub fn commit_tree(&self, branch: &str, tree: Oid, message: &str) -> Oid {
        let parents: Vec<Oid> = self.tip(branch).into_iter().collect();
        self.record(branch, &parents, tree, message)
    }

    pub fn merge(&self, branch: &str, other: Oid, files: &[(&str, &str)], message: &str) -> Oid {
        let tip = self.tip(branch).unwrap();
        self.record(branch, &[tip, other], write_tree(&self.repo, files), message)
    }

    pub fn branch(&self, name: &str, at: Oid) {
        self.repo
            .reference(&format!("refs/heads/{name}"), at, true, "test")
            .unwrap();
    }

    pub fn open(&self) -> GitRepository {
        GitRepository::discover(self.dir.path()).unwrap()
    }
}
