//! In-memory reference store.
//!
//! [`InMemoryRefStore`] stores all branches in a `BTreeMap` protected by a
//! `RwLock`, so listing is naturally sorted by name.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use sweep_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_branch_name;
use crate::traits::RefStore;
use crate::types::{BranchRef, Head};

/// An in-memory implementation of [`RefStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    branches: RwLock<BTreeMap<String, ObjectId>>,
    head: RwLock<Option<Head>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> RefError {
    RefError::LockPoisoned(e.to_string())
}

impl RefStore for InMemoryRefStore {
    fn read_branch(&self, name: &str) -> Result<Option<BranchRef>> {
        let branches = self.branches.read().map_err(poisoned)?;
        Ok(branches.get(name).map(|t| BranchRef::new(name, *t)))
    }

    fn write_branch(&self, branch: &BranchRef) -> Result<()> {
        validate_branch_name(&branch.name)?;
        let mut branches = self.branches.write().map_err(poisoned)?;
        branches.insert(branch.name.clone(), branch.target);
        debug!(branch = %branch.name, target = %branch.target.short_hex(), "wrote branch");
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<bool> {
        {
            let head = self.head.read().map_err(poisoned)?;
            if let Some(Head::Symbolic(current)) = head.as_ref() {
                if current == name {
                    return Err(RefError::DeleteCurrentBranch {
                        name: current.clone(),
                    });
                }
            }
        }

        let mut branches = self.branches.write().map_err(poisoned)?;
        let existed = branches.remove(name).is_some();
        if existed {
            debug!(branch = %name, "deleted branch");
        }
        Ok(existed)
    }

    fn branches(&self) -> Result<Vec<BranchRef>> {
        let branches = self.branches.read().map_err(poisoned)?;
        Ok(branches
            .iter()
            .map(|(name, target)| BranchRef::new(name.clone(), *target))
            .collect())
    }

    fn head(&self) -> Result<Option<Head>> {
        let head = self.head.read().map_err(poisoned)?;
        Ok(head.clone())
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;
        let mut head = self.head.write().map_err(poisoned)?;
        *head = Some(Head::Symbolic(branch.to_string()));
        Ok(())
    }

    fn set_head_detached(&self, target: ObjectId) -> Result<()> {
        let mut head = self.head.write().map_err(poisoned)?;
        *head = Some(Head::Detached(target));
        Ok(())
    }
}
