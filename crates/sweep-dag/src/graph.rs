//! The commit arena.
//!
//! [`CommitGraph`] stores nodes in a [`HashMap`] and maintains a forward-edge
//! index (`children`) so descendants can be enumerated without a full scan.
//! Root commits (those with no parents) are tracked separately, and every
//! commit gets a generation number (one more than its highest parent) when
//! it is added.
//!
//! # Invariants
//!
//! - The graph is acyclic: a commit can only name parents that already exist.
//! - Every parent reference resolves to an existing node.
//! - Node IDs are unique within the graph.

use std::collections::HashMap;

use tracing::debug;

use sweep_types::{IdPrefix, ObjectId};

use crate::error::{DagError, DagResult};
use crate::traverse::ParentLookup;

/// A commit as the graph sees it: identity, snapshot and ordered parents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitNode {
    /// Content-addressed identifier of the commit.
    pub id: ObjectId,
    /// Root tree of the commit's snapshot.
    pub tree: ObjectId,
    /// Parent commits; the first parent is the mainline.
    pub parents: Vec<ObjectId>,
}

impl CommitNode {
    /// Create a new node.
    pub fn new(id: ObjectId, tree: ObjectId, parents: Vec<ObjectId>) -> Self {
        Self { id, tree, parents }
    }

    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if this commit has two or more parents.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Append-only arena of commits.
#[derive(Clone, Debug, Default)]
pub struct CommitGraph {
    /// All nodes, keyed by their ObjectId.
    nodes: HashMap<ObjectId, CommitNode>,
    /// Forward-edge index: parent -> list of children.
    children: HashMap<ObjectId, Vec<ObjectId>>,
    /// Commits that have no parents.
    roots: Vec<ObjectId>,
    /// Generation per commit; roots are 1.
    generations: HashMap<ObjectId, u64>,
}

impl CommitGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of commits in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no commits.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Add a commit to the graph.
    ///
    /// All parents must already exist in the graph. Returns an error if the
    /// commit ID already exists or if a parent reference dangles.
    pub fn add_node(&mut self, node: CommitNode) -> DagResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(DagError::DuplicateNode(node.id));
        }

        for parent in &node.parents {
            if !self.nodes.contains_key(parent) {
                return Err(DagError::DanglingParent {
                    node: node.id,
                    parent: *parent,
                });
            }
        }

        for parent in &node.parents {
            let siblings = self.children.entry(*parent).or_default();
            // A commit may list the same parent twice; index it once.
            if !siblings.contains(&node.id) {
                siblings.push(node.id);
            }
        }

        if node.is_root() {
            self.roots.push(node.id);
        }

        let generation = node
            .parents
            .iter()
            .filter_map(|p| self.generations.get(p))
            .max()
            .map_or(1, |g| g + 1);
        self.generations.insert(node.id, generation);

        debug!(
            commit = %node.id.short_hex(),
            parents = node.parents.len(),
            generation,
            "added commit node"
        );
        self.nodes.insert(node.id, node);

        Ok(())
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Retrieve a commit by its ObjectId.
    pub fn get_node(&self, id: &ObjectId) -> Option<&CommitNode> {
        self.nodes.get(id)
    }

    /// Returns `true` if the commit is in the graph.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.nodes.contains_key(id)
    }

    /// The root tree of a commit.
    pub fn tree_of(&self, id: &ObjectId) -> DagResult<ObjectId> {
        self.nodes
            .get(id)
            .map(|n| n.tree)
            .ok_or(DagError::NodeNotFound(*id))
    }

    /// Generation number of a commit, `None` if it is not in the graph.
    pub fn generation_of(&self, id: &ObjectId) -> Option<u64> {
        self.generations.get(id).copied()
    }

    /// Direct children of a commit, in insertion order.
    pub fn children_of(&self, id: &ObjectId) -> &[ObjectId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All root commits.
    pub fn roots(&self) -> Vec<&CommitNode> {
        self.roots
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Commits whose hex id starts with `prefix`, sorted.
    pub fn find_by_prefix(&self, prefix: &IdPrefix) -> Vec<ObjectId> {
        let mut found: Vec<ObjectId> = self
            .nodes
            .keys()
            .filter(|id| id.starts_with(prefix))
            .copied()
            .collect();
        found.sort();
        found
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    /// Validate the graph's structural integrity.
    ///
    /// Checks that every parent reference resolves, that the children index
    /// agrees with the parent edges, and that roots are tracked correctly.
    pub fn validate(&self) -> DagResult<()> {
        for node in self.nodes.values() {
            for parent in &node.parents {
                if !self.nodes.contains_key(parent) {
                    return Err(DagError::DanglingParent {
                        node: node.id,
                        parent: *parent,
                    });
                }
                if !self.children_of(parent).contains(&node.id) {
                    return Err(DagError::NodeNotFound(node.id));
                }
            }
        }

        for root in &self.roots {
            match self.nodes.get(root) {
                Some(node) if node.is_root() => {}
                _ => return Err(DagError::NodeNotFound(*root)),
            }
        }

        Ok(())
    }
}

impl ParentLookup for CommitGraph {
    type Id = ObjectId;
    type Error = DagError;

    fn parents(&self, id: &ObjectId) -> DagResult<Vec<ObjectId>> {
        self.nodes
            .get(id)
            .map(|n| n.parents.clone())
            .ok_or(DagError::NodeNotFound(*id))
    }

    fn generation(&self, id: &ObjectId) -> DagResult<Option<u64>> {
        Ok(self.generation_of(id))
    }
}
