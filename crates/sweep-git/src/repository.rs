//! The libgit2-backed [`GraphAccessor`].

use std::path::Path;

use git2::{BranchType, ErrorCode, Oid, Repository, Sort};
use tracing::{debug, warn};

use sweep_dag::ParentLookup;
use sweep_engine::{AccessError, AccessResult, DeleteOutcome, GraphAccessor, LocalBranch, PathChanges};

use crate::diff::TreeChanges;
use crate::error::{commit_error, GitError, GitResult};

const HEADS: &str = "refs/heads/";

/// An on-disk git repository.
pub struct GitRepository {
    repo: Repository,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl GitRepository {
    /// Open the repository containing `path`.
    ///
    /// Searches upwards like git does, so any directory inside the working
    /// copy works.
    pub fn discover(path: &Path) -> GitResult<Self> {
        let repo = Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        debug!(git_dir = %repo.path().display(), "opened repository");
        Ok(Self { repo })
    }

    /// Working directory, `None` for a bare repository.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// The `credential.helper` setting, if any.
    pub fn credential_helper(&self) -> GitResult<Option<String>> {
        let config = self.repo.config()?;
        match config.get_string("credential.helper") {
            Ok(helper) if !helper.is_empty() => Ok(Some(helper)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn raw(&self) -> &Repository {
        &self.repo
    }

    /// The commit HEAD points at, `None` while the current branch is unborn.
    fn head_commit(&self) -> AccessResult<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head
                    .peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, "HEAD"))?;
                Ok(Some(commit.id()))
            }
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(GitError::from_git2(e, "HEAD").into()),
        }
    }
}

impl ParentLookup for GitRepository {
    type Id = Oid;
    type Error = AccessError;

    fn parents(&self, id: &Oid) -> AccessResult<Vec<Oid>> {
        let commit = self.repo.find_commit(*id).map_err(|e| commit_error(e, *id))?;
        Ok(commit.parent_ids().collect())
    }
}

impl GraphAccessor for GitRepository {
    fn resolve(&self, name: &str) -> AccessResult<Option<Oid>> {
        if name == "HEAD" {
            return self.head_commit();
        }

        let short = name.strip_prefix(HEADS).unwrap_or(name);
        match self.repo.find_branch(short, BranchType::Local) {
            Ok(branch) => return Ok(branch.get().peel_to_commit().ok().map(|c| c.id())),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {}
            Err(e) => return Err(GitError::from_git2(e, name).into()),
        }

        match self.repo.revparse_single(name) {
            Ok(object) => Ok(object.peel_to_commit().ok().map(|c| c.id())),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => Ok(None),
            Err(e) => Err(GitError::from_git2(e, name).into()),
        }
    }

    fn is_ancestor(&self, candidate: &Oid, reference: &Oid) -> AccessResult<bool> {
        if candidate == reference {
            return Ok(true);
        }
        self.repo
            .graph_descendant_of(*reference, *candidate)
            .map_err(|e| commit_error(e, *reference))
    }

    fn merge_bases(&self, a: &Oid, b: &Oid) -> AccessResult<Vec<Oid>> {
        match self.repo.merge_bases(*a, *b) {
            Ok(bases) => Ok(bases.to_vec()),
            // libgit2 reports "no merge base" and "no such commit" alike.
            Err(e) if e.code() == ErrorCode::NotFound => {
                for id in [a, b] {
                    self.repo.find_commit(*id).map_err(|e| commit_error(e, *id))?;
                }
                Ok(Vec::new())
            }
            Err(e) => Err(GitError::from_git2(e, &format!("{a}...{b}")).into()),
        }
    }

    fn candidate_range(&self, reference: &Oid, base: &Oid) -> AccessResult<Vec<Oid>> {
        let mut walk = self.repo.revwalk().map_err(GitError::from)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
            .map_err(GitError::from)?;
        walk.push(*reference).map_err(|e| commit_error(e, *reference))?;
        walk.hide(*base).map_err(|e| commit_error(e, *base))?;
        walk.map(|id| id.map_err(|e| AccessError::from(GitError::from(e))))
            .collect()
    }

    fn tree(&self, commit: &Oid) -> AccessResult<Oid> {
        let found = self
            .repo
            .find_commit(*commit)
            .map_err(|e| commit_error(e, *commit))?;
        Ok(found.tree_id())
    }

    fn diff_trees<'a>(&'a self, old: &Oid, new: &Oid) -> AccessResult<PathChanges<'a>> {
        Ok(Box::new(TreeChanges::new(&self.repo, *old, *new)))
    }

    fn list_local_branches(&self) -> AccessResult<Vec<LocalBranch<Oid>>> {
        let mut branches = Vec::new();
        for item in self
            .repo
            .branches(Some(BranchType::Local))
            .map_err(GitError::from)?
        {
            let (branch, _) = item.map_err(GitError::from)?;
            let tip = branch.get().peel_to_commit().ok().map(|c| c.id());
            match branch.name() {
                Ok(Some(name)) => branches.push(LocalBranch::new(name, tip)),
                // Escaped names contain `\`, which no ref name can, so the
                // branch is counted and kept but never resolved or deleted.
                _ => {
                    let name = branch
                        .name_bytes()
                        .map_err(GitError::from)?
                        .escape_ascii()
                        .to_string();
                    warn!(branch = %name, "branch name is not valid UTF-8");
                    branches.push(LocalBranch::new(name, None));
                }
            }
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn current_branch(&self) -> AccessResult<Option<String>> {
        if self.repo.head_detached().map_err(GitError::from)? {
            return Ok(None);
        }
        let head = self
            .repo
            .find_reference("HEAD")
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix(HEADS))
            .map(str::to_string))
    }

    fn head(&self) -> AccessResult<Oid> {
        let head = self
            .repo
            .head()
            .map_err(|e| AccessError::HeadUnresolved(e.message().to_string()))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| AccessError::HeadUnresolved(e.message().to_string()))?;
        Ok(commit.id())
    }

    fn delete_branch(&self, name: &str, force: bool) -> AccessResult<DeleteOutcome> {
        let mut branch = match self.repo.find_branch(name, BranchType::Local) {
            Ok(branch) => branch,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(AccessError::BranchNotFound(name.to_string()))
            }
            Err(e) => return Err(GitError::from_git2(e, name).into()),
        };

        if branch.is_head() {
            warn!(branch = %name, "refusing to delete the checked-out branch");
            return Ok(DeleteOutcome::Refused);
        }

        if !force {
            let tip = branch
                .get()
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, name))?
                .id();
            let merged = match self.head_commit()? {
                Some(head) => {
                    head == tip
                        || self
                            .repo
                            .graph_descendant_of(head, tip)
                            .map_err(GitError::from)?
                }
                None => false,
            };
            if !merged {
                debug!(branch = %name, "tip not reachable from HEAD; refusing");
                return Ok(DeleteOutcome::Refused);
            }
        }

        branch
            .delete()
            .map_err(|e| GitError::from_git2(e, &format!("{HEADS}{name}")))?;
        Ok(DeleteOutcome::Deleted)
    }
}
