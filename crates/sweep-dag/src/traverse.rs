//! Graph algorithms over anything that can list a commit's parents.
//!
//! Every function here is generic over [`ParentLookup`], so the same code
//! answers ancestry questions for the in-memory [`CommitGraph`] and for any
//! other backend. Lookups are fallible; the first failing lookup aborts the
//! traversal and its error is returned unchanged.
//!
//! When the graph supplies generation numbers the walks stop as soon as the
//! rest of the history cannot change the answer, so their cost follows the
//! distance between the commits involved rather than the history's length.
//! Without generations they stay correct but run to exhaustion.
//!
//! [`CommitGraph`]: crate::CommitGraph

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use tracing::debug;

/// Read access to the parent edges of a commit graph.
pub trait ParentLookup {
    /// Commit identifier.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;
    /// Error returned when a commit cannot be resolved.
    type Error;

    /// Ordered parents of `id`; the first parent is the mainline.
    fn parents(&self, id: &Self::Id) -> Result<Vec<Self::Id>, Self::Error>;

    /// Generation number of `id`, strictly greater than that of every
    /// parent. `None` when the graph cannot tell.
    fn generation(&self, _id: &Self::Id) -> Result<Option<u64>, Self::Error> {
        Ok(None)
    }
}

// ---------------------------------------------------------------
// Reachability
// ---------------------------------------------------------------

/// All commits reachable from `start` (including `start` itself).
pub fn ancestors<G: ParentLookup + ?Sized>(
    graph: &G,
    start: &G::Id,
) -> Result<HashSet<G::Id>, G::Error> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(*start);
    queue.push_back(*start);

    while let Some(current) = queue.pop_front() {
        for parent in graph.parents(&current)? {
            if visited.insert(parent) {
                queue.push_back(parent);
            }
        }
    }

    Ok(visited)
}

/// Returns `true` if `candidate` is reachable from `reference` by following
/// zero or more parent edges. Every parent of a merge commit is explored.
///
/// Commits whose generation is not above the candidate's are never
/// expanded, since the candidate cannot be behind them.
pub fn is_ancestor<G: ParentLookup + ?Sized>(
    graph: &G,
    candidate: &G::Id,
    reference: &G::Id,
) -> Result<bool, G::Error> {
    if candidate == reference {
        return Ok(true);
    }

    let floor = graph.generation(candidate)?;
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(*reference);
    queue.push_back(*reference);

    while let Some(current) = queue.pop_front() {
        for parent in graph.parents(&current)? {
            if parent == *candidate {
                return Ok(true);
            }
            if let Some(floor) = floor {
                if graph.generation(&parent)?.is_some_and(|g| g <= floor) {
                    continue;
                }
            }
            if visited.insert(parent) {
                queue.push_back(parent);
            }
        }
    }

    Ok(false)
}

// ---------------------------------------------------------------
// Two-sided walk
// ---------------------------------------------------------------

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const STALE: u8 = 4;

struct Queued<Id> {
    generation: u64,
    seq: Reverse<u64>,
    id: Id,
}

impl<Id> Queued<Id> {
    fn key(&self) -> (u64, Reverse<u64>) {
        (self.generation, self.seq)
    }
}

impl<Id> PartialEq for Queued<Id> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<Id> Eq for Queued<Id> {}

impl<Id> PartialOrd for Queued<Id> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Id> Ord for Queued<Id> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Paints flags down from one or two starting commits.
///
/// Commits are expanded highest generation first, ties in the order they
/// were queued. A commit is queued again whenever its flags grow, and is
/// expanded only when it carries flags it has not yet passed on. With
/// generations every commit's flags are final once it is expanded, which is
/// what lets [`settled`](Painter::settled) end the walk early.
struct Painter<'g, G: ParentLookup + ?Sized> {
    graph: &'g G,
    flags: HashMap<G::Id, u8>,
    expanded: HashMap<G::Id, u8>,
    parents: HashMap<G::Id, Vec<G::Id>>,
    queue: BinaryHeap<Queued<G::Id>>,
    queued: u64,
    ordered: bool,
}

impl<'g, G: ParentLookup + ?Sized> Painter<'g, G> {
    fn new(graph: &'g G) -> Self {
        Self {
            graph,
            flags: HashMap::new(),
            expanded: HashMap::new(),
            parents: HashMap::new(),
            queue: BinaryHeap::new(),
            queued: 0,
            ordered: true,
        }
    }

    fn flags(&self, id: &G::Id) -> u8 {
        self.flags.get(id).copied().unwrap_or(0)
    }

    fn paint(&mut self, id: G::Id, flags: u8) -> Result<(), G::Error> {
        let current = self.flags.entry(id).or_insert(0);
        if *current & flags == flags {
            return Ok(());
        }
        *current |= flags;

        let generation = match self.graph.generation(&id)? {
            Some(generation) => generation,
            None => {
                self.ordered = false;
                0
            }
        };
        self.queued += 1;
        self.queue.push(Queued {
            generation,
            seq: Reverse(self.queued),
            id,
        });
        Ok(())
    }

    /// The next commit holding flags it has not passed on yet.
    fn next(&mut self) -> Option<(G::Id, u8)> {
        while let Some(Queued { id, .. }) = self.queue.pop() {
            let flags = self.flags(&id);
            if self.expanded.get(&id) != Some(&flags) {
                return Some((id, flags));
            }
        }
        None
    }

    /// Pass `flags` on to the parents of `id`.
    fn expand(&mut self, id: G::Id, flags: u8) -> Result<(), G::Error> {
        self.flags.insert(id, flags);
        self.expanded.insert(id, flags);
        for parent in self.parents_of(&id)? {
            self.paint(parent, flags)?;
        }
        Ok(())
    }

    fn parents_of(&mut self, id: &G::Id) -> Result<Vec<G::Id>, G::Error> {
        if let Some(parents) = self.parents.get(id) {
            return Ok(parents.clone());
        }
        let parents = self.graph.parents(id)?;
        self.parents.insert(*id, parents.clone());
        Ok(parents)
    }

    /// Returns `true` once every queued commit carries `mask`, so nothing
    /// left to walk can change the result. Never true for unordered graphs.
    fn settled(&self, mask: u8) -> bool {
        self.ordered
            && self
                .queue
                .iter()
                .all(|queued| self.flags(&queued.id) & mask == mask)
    }
}

// ---------------------------------------------------------------
// Merge base
// ---------------------------------------------------------------

/// All best common ancestors of `a` and `b`.
///
/// A best common ancestor is a common ancestor that is not itself an
/// ancestor of another common ancestor. Results are ordered by breadth-first
/// discovery from `a`, first parents before later parents. An empty result
/// means the histories are disjoint.
pub fn merge_bases<G: ParentLookup + ?Sized>(
    graph: &G,
    a: &G::Id,
    b: &G::Id,
) -> Result<Vec<G::Id>, G::Error> {
    let mut walk = Painter::new(graph);
    walk.paint(*a, LEFT)?;
    walk.paint(*b, RIGHT)?;

    // A commit first seen from both sides is common; everything behind it
    // is marked stale and can no longer be best.
    let mut candidates = Vec::new();
    while !walk.settled(STALE) {
        let Some((id, mut flags)) = walk.next() else {
            break;
        };
        if flags & (LEFT | RIGHT) == LEFT | RIGHT && flags & STALE == 0 {
            candidates.push(id);
            flags |= STALE;
        }
        walk.expand(id, flags)?;
    }

    // Without generations a commit can be found common before a later path
    // shows it sits behind another candidate.
    let mut best = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let mut dominated = false;
        for (j, other) in candidates.iter().enumerate() {
            if i != j && is_ancestor(graph, candidate, other)? {
                dominated = true;
                break;
            }
        }
        if !dominated {
            best.push(*candidate);
        }
    }

    if best.len() < 2 {
        return Ok(best);
    }
    discovery_order(&mut walk, a, best)
}

/// Sort `bases` by breadth-first discovery from `start`, descending only
/// through commits that are not common to both sides.
fn discovery_order<G: ParentLookup + ?Sized>(
    walk: &mut Painter<'_, G>,
    start: &G::Id,
    bases: Vec<G::Id>,
) -> Result<Vec<G::Id>, G::Error> {
    let mut ordered = Vec::with_capacity(bases.len());
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(*start);
    queue.push_back(*start);

    while let Some(current) = queue.pop_front() {
        if bases.contains(&current) {
            ordered.push(current);
            if ordered.len() == bases.len() {
                break;
            }
            continue;
        }
        if walk.flags(&current) & (LEFT | RIGHT) == LEFT | RIGHT {
            continue;
        }
        for parent in walk.parents_of(&current)? {
            if visited.insert(parent) {
                queue.push_back(parent);
            }
        }
    }

    Ok(ordered)
}

/// The preferred merge base of `a` and `b`, or `None` for disjoint histories.
///
/// When several best common ancestors exist the first one found walking
/// from `a` wins.
pub fn merge_base<G: ParentLookup + ?Sized>(
    graph: &G,
    a: &G::Id,
    b: &G::Id,
) -> Result<Option<G::Id>, G::Error> {
    let bases = merge_bases(graph, a, b)?;
    if bases.len() > 1 {
        debug!(
            a = %a,
            b = %b,
            count = bases.len(),
            chosen = %bases[0],
            "multiple merge bases"
        );
    }
    Ok(bases.into_iter().next())
}

// ---------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------

/// Commits reachable from `tip` but not from `base`, oldest first.
///
/// Every commit appears after all of its parents that are in the range.
/// Parents are visited in order, so the first-parent line is laid down
/// before the commits a merge brought in. History behind `base` is only
/// walked as far as needed to rule commits out.
pub fn exclusive_range<G: ParentLookup + ?Sized>(
    graph: &G,
    tip: &G::Id,
    base: &G::Id,
) -> Result<Vec<G::Id>, G::Error> {
    struct Frame<Id> {
        id: Id,
        parents: Vec<Id>,
        next: usize,
    }

    let mut walk = Painter::new(graph);
    walk.paint(*base, RIGHT)?;
    walk.paint(*tip, LEFT)?;
    while !walk.settled(RIGHT) {
        let Some((id, flags)) = walk.next() else {
            break;
        };
        walk.expand(id, flags)?;
    }

    let mut order = Vec::new();
    if walk.flags(tip) != LEFT {
        return Ok(order);
    }

    let mut visited = HashSet::new();
    visited.insert(*tip);
    let mut stack = vec![Frame {
        id: *tip,
        parents: walk.parents_of(tip)?,
        next: 0,
    }];

    // Iterative post-order: a commit is emitted once its parents are done.
    while let Some(frame) = stack.last_mut() {
        match frame.parents.get(frame.next).copied() {
            Some(parent) => {
                frame.next += 1;
                if walk.flags(&parent) == LEFT && visited.insert(parent) {
                    let parents = walk.parents_of(&parent)?;
                    stack.push(Frame {
                        id: parent,
                        parents,
                        next: 0,
                    });
                }
            }
            None => {
                order.push(frame.id);
                stack.pop();
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DagError;
    use crate::graph::{CommitGraph, CommitNode};
    use proptest::prelude::*;
    use std::cell::Cell;
    use sweep_types::ObjectId;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    fn nth(i: u32) -> ObjectId {
        ObjectId::from_bytes(&i.to_be_bytes())
    }

    /// Hides generation numbers, forcing the exhaustive walks.
    struct Unordered<'a>(&'a CommitGraph);

    impl ParentLookup for Unordered<'_> {
        type Id = ObjectId;
        type Error = DagError;

        fn parents(&self, id: &ObjectId) -> Result<Vec<ObjectId>, DagError> {
            self.0.parents(id)
        }
    }

    /// Counts parent lookups.
    struct Counting<'a> {
        graph: &'a CommitGraph,
        calls: Cell<usize>,
    }

    impl ParentLookup for Counting<'_> {
        type Id = ObjectId;
        type Error = DagError;

        fn parents(&self, id: &ObjectId) -> Result<Vec<ObjectId>, DagError> {
            self.calls.set(self.calls.get() + 1);
            self.graph.parents(id)
        }

        fn generation(&self, id: &ObjectId) -> Result<Option<u64>, DagError> {
            self.graph.generation(id)
        }
    }

    fn build(edges: &[(u8, &[u8])]) -> CommitGraph {
        let mut g = CommitGraph::new();
        for (id, parents) in edges {
            g.add_node(CommitNode::new(
                oid(*id),
                ObjectId::from_bytes(&[*id]),
                parents.iter().map(|p| oid(*p)).collect(),
            ))
            .unwrap();
        }
        g
    }

    /// A -> B -> C
    fn linear() -> CommitGraph {
        build(&[(1, &[]), (2, &[1]), (3, &[2])])
    }

    /// Diamond:
    ///   A
    ///  / \
    /// B   C
    ///  \ /
    ///   D
    fn diamond() -> CommitGraph {
        build(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3])])
    }

    // ----------------------------------------------------------
    // Ancestry
    // ----------------------------------------------------------

    #[test]
    fn commit_is_its_own_ancestor() {
        let g = linear();
        assert!(is_ancestor(&g, &oid(2), &oid(2)).unwrap());
    }

    #[test]
    fn ancestry_in_linear_chain() {
        let g = linear();
        assert!(is_ancestor(&g, &oid(1), &oid(3)).unwrap());
        assert!(!is_ancestor(&g, &oid(3), &oid(1)).unwrap());
    }

    #[test]
    fn ancestry_through_second_parent() {
        let g = diamond();
        assert!(is_ancestor(&g, &oid(3), &oid(4)).unwrap());
        assert!(!is_ancestor(&g, &oid(2), &oid(3)).unwrap());
    }

    #[test]
    fn ancestry_with_unknown_reference_fails() {
        let g = linear();
        let err = is_ancestor(&g, &oid(1), &oid(42)).unwrap_err();
        assert!(matches!(err, DagError::NodeNotFound(id) if id == oid(42)));
    }

    #[test]
    fn ancestors_includes_start() {
        let g = diamond();
        let set = ancestors(&g, &oid(4)).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(ancestors(&g, &oid(1)).unwrap().len(), 1);
    }

    // ----------------------------------------------------------
    // Merge base
    // ----------------------------------------------------------

    #[test]
    fn merge_base_of_siblings_is_fork_point() {
        let g = diamond();
        assert_eq!(merge_base(&g, &oid(2), &oid(3)).unwrap(), Some(oid(1)));
    }

    #[test]
    fn merge_base_of_ancestor_pair_is_the_ancestor() {
        let g = linear();
        assert_eq!(merge_base(&g, &oid(3), &oid(1)).unwrap(), Some(oid(1)));
        assert_eq!(merge_base(&g, &oid(1), &oid(3)).unwrap(), Some(oid(1)));
        assert_eq!(merge_base(&g, &oid(2), &oid(2)).unwrap(), Some(oid(2)));
    }

    #[test]
    fn disjoint_histories_have_no_merge_base() {
        let g = build(&[(1, &[]), (2, &[1]), (10, &[]), (11, &[10])]);
        assert_eq!(merge_base(&g, &oid(2), &oid(11)).unwrap(), None);
        assert!(merge_bases(&g, &oid(2), &oid(11)).unwrap().is_empty());
    }

    #[test]
    fn redundant_frontier_candidate_is_dropped() {
        // 1 -> 2 -> 3 (b); a = merge(3', 1) where 3' = child of 2.
        // Walking from a reaches 2 via 5 and 1 directly; 1 is behind 2.
        let g = build(&[(1, &[]), (2, &[1]), (3, &[2]), (5, &[2]), (6, &[1, 5])]);
        assert_eq!(merge_bases(&g, &oid(6), &oid(3)).unwrap(), vec![oid(2)]);
    }

    #[test]
    fn criss_cross_reports_both_bases_in_discovery_order() {
        // Two branches that merged each other:
        //   1 - 2 ----- 4 (2 + 3)
        //    \     X
        //     3 ----- 5 (3 + 2)
        let g = build(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3]), (5, &[3, 2])]);
        assert_eq!(merge_bases(&g, &oid(4), &oid(5)).unwrap(), vec![oid(2), oid(3)]);
        assert_eq!(merge_bases(&g, &oid(5), &oid(4)).unwrap(), vec![oid(3), oid(2)]);
        assert_eq!(merge_base(&g, &oid(4), &oid(5)).unwrap(), Some(oid(2)));
    }

    // ----------------------------------------------------------
    // Ranges
    // ----------------------------------------------------------

    #[test]
    fn range_of_linear_chain_is_oldest_first() {
        let g = build(&[(1, &[]), (2, &[1]), (3, &[2]), (4, &[3])]);
        assert_eq!(
            exclusive_range(&g, &oid(4), &oid(1)).unwrap(),
            vec![oid(2), oid(3), oid(4)]
        );
    }

    #[test]
    fn range_is_empty_when_tip_is_behind_base() {
        let g = linear();
        assert!(exclusive_range(&g, &oid(1), &oid(3)).unwrap().is_empty());
        assert!(exclusive_range(&g, &oid(3), &oid(3)).unwrap().is_empty());
    }

    #[test]
    fn range_through_merge_lays_first_parent_line_first() {
        // 1 - 2 - 4 (merge of 2 and 3)
        //  \- 3 -/
        let g = build(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3])]);
        assert_eq!(
            exclusive_range(&g, &oid(4), &oid(1)).unwrap(),
            vec![oid(2), oid(3), oid(4)]
        );
    }

    #[test]
    fn range_against_disjoint_base_includes_root() {
        let g = build(&[(1, &[]), (2, &[1]), (10, &[])]);
        assert_eq!(
            exclusive_range(&g, &oid(2), &oid(10)).unwrap(),
            vec![oid(1), oid(2)]
        );
    }

    #[test]
    fn unordered_graph_gives_the_same_answers() {
        let g = build(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3]), (5, &[3, 2]), (6, &[4])]);
        let u = Unordered(&g);
        assert_eq!(merge_bases(&u, &oid(4), &oid(5)).unwrap(), vec![oid(2), oid(3)]);
        assert_eq!(merge_bases(&u, &oid(5), &oid(4)).unwrap(), vec![oid(3), oid(2)]);
        assert_eq!(exclusive_range(&u, &oid(6), &oid(3)).unwrap(), vec![oid(2), oid(4), oid(6)]);
        assert!(!is_ancestor(&u, &oid(5), &oid(6)).unwrap());
    }

    #[test]
    fn walks_near_the_tip_of_a_long_history_stay_local() {
        // 2,000 commits on the mainline; the side branch forks two commits
        // before its tip.
        let mut g = CommitGraph::new();
        for i in 0..2000u32 {
            let parents = if i == 0 { vec![] } else { vec![nth(i - 1)] };
            g.add_node(CommitNode::new(nth(i), nth(i), parents)).unwrap();
        }
        let side = ObjectId::from_bytes(b"side");
        g.add_node(CommitNode::new(side, side, vec![nth(1997)])).unwrap();
        let tip = nth(1999);

        let counting = Counting {
            graph: &g,
            calls: Cell::new(0),
        };
        assert_eq!(merge_base(&counting, &side, &tip).unwrap(), Some(nth(1997)));
        assert_eq!(
            exclusive_range(&counting, &tip, &nth(1997)).unwrap(),
            vec![nth(1998), nth(1999)]
        );
        assert!(!is_ancestor(&counting, &side, &tip).unwrap());
        assert!(is_ancestor(&counting, &nth(1998), &tip).unwrap());
        assert!(counting.calls.get() < 20, "{} parent lookups", counting.calls.get());
    }

    // ----------------------------------------------------------
    // Properties
    // ----------------------------------------------------------

    /// Random DAG: commit `i` picks up to two parents among `0..i`.
    fn arb_graph() -> impl Strategy<Value = CommitGraph> {
        prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..3), 1..24)
            .prop_map(|picks| {
                let mut g = CommitGraph::new();
                for (i, choice) in picks.iter().enumerate() {
                    let mut parents: Vec<ObjectId> = Vec::new();
                    if i > 0 {
                        for idx in choice {
                            let p = oid(idx.index(i) as u8);
                            if !parents.contains(&p) {
                                parents.push(p);
                            }
                        }
                    }
                    g.add_node(CommitNode::new(
                        oid(i as u8),
                        ObjectId::from_bytes(&[i as u8]),
                        parents,
                    ))
                    .unwrap();
                }
                g
            })
    }

    proptest! {
        #[test]
        fn parents_are_ancestors(g in arb_graph(), pick in any::<prop::sample::Index>()) {
            let child = oid(pick.index(g.len()) as u8);
            for parent in g.parents(&child).unwrap() {
                prop_assert!(is_ancestor(&g, &parent, &child).unwrap());
            }
        }

        #[test]
        fn merge_bases_are_common_and_unrelated(
            g in arb_graph(),
            x in any::<prop::sample::Index>(),
            y in any::<prop::sample::Index>(),
        ) {
            let a = oid(x.index(g.len()) as u8);
            let b = oid(y.index(g.len()) as u8);
            let bases = merge_bases(&g, &a, &b).unwrap();
            for base in &bases {
                prop_assert!(is_ancestor(&g, base, &a).unwrap());
                prop_assert!(is_ancestor(&g, base, &b).unwrap());
                for other in &bases {
                    if other != base {
                        prop_assert!(!is_ancestor(&g, base, other).unwrap());
                    }
                }
            }
            let common = ancestors(&g, &a).unwrap()
                .intersection(&ancestors(&g, &b).unwrap())
                .count();
            prop_assert_eq!(bases.is_empty(), common == 0);
        }

        #[test]
        fn range_is_the_set_difference_in_topological_order(
            g in arb_graph(),
            x in any::<prop::sample::Index>(),
            y in any::<prop::sample::Index>(),
        ) {
            let tip = oid(x.index(g.len()) as u8);
            let base = oid(y.index(g.len()) as u8);
            let range = exclusive_range(&g, &tip, &base).unwrap();

            let from_tip = ancestors(&g, &tip).unwrap();
            let from_base = ancestors(&g, &base).unwrap();
            let expected: HashSet<ObjectId> = from_tip.difference(&from_base).copied().collect();
            let got: HashSet<ObjectId> = range.iter().copied().collect();
            prop_assert_eq!(got.len(), range.len());
            prop_assert_eq!(got, expected);

            for (pos, id) in range.iter().enumerate() {
                for parent in g.parents(id).unwrap() {
                    if let Some(ppos) = range.iter().position(|r| *r == parent) {
                        prop_assert!(ppos < pos);
                    }
                }
            }
        }

        #[test]
        fn generations_only_change_the_cost(
            g in arb_graph(),
            x in any::<prop::sample::Index>(),
            y in any::<prop::sample::Index>(),
        ) {
            let a = oid(x.index(g.len()) as u8);
            let b = oid(y.index(g.len()) as u8);
            let u = Unordered(&g);
            prop_assert_eq!(merge_bases(&g, &a, &b).unwrap(), merge_bases(&u, &a, &b).unwrap());
            prop_assert_eq!(exclusive_range(&g, &a, &b).unwrap(), exclusive_range(&u, &a, &b).unwrap());
            prop_assert_eq!(is_ancestor(&g, &a, &b).unwrap(), is_ancestor(&u, &a, &b).unwrap());
        }
    }
}
