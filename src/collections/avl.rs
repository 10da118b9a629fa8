//! AVL tree over an explicit comparer
//!
//! Nodes live in a dense arena and refer to each other by [`NodeId`].
//! Parent links are plain ids used for upward rebalancing and successor
//! walks; ownership is the arena's alone.
//!
//! # Balance
//!
//! Each node stores `balance = height(left) - height(right)`. Insertion
//! walks up adjusting ancestors and stops at the first node whose balance
//! returns to 0 or after a single (possibly double) rotation. Removal keeps
//! walking past rotations because a deletion can shorten every subtree up
//! to the root.
//!
//! # Duplicates
//!
//! [`AvlTree::new`] accepts equal keys (they descend right).
//! [`AvlTree::unique`] rejects them with `AERO_COLLECTION_DUPLICATE_KEY`.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use super::comparer::Comparer;
use super::errors::{CollectionError, CollectionResult};

/// Arena slot index of a node
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    data: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    balance: i8,
}

/// Self-balancing binary search tree
#[derive(Debug, Clone)]
pub struct AvlTree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Option<NodeId>,
    comparer: Comparer<K>,
    unique: bool,
}

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree that accepts duplicate keys
    pub fn new(comparer: Comparer<K>) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            comparer,
            unique: false,
        }
    }

    /// Creates an empty tree that rejects duplicate keys
    pub fn unique(comparer: Comparer<K>) -> Self {
        Self {
            unique: true,
            ..Self::new(comparer)
        }
    }

    pub fn comparer(&self) -> &Comparer<K> {
        &self.comparer
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Height of the tree (0 when empty). O(n).
    pub fn height(&self) -> usize {
        fn walk<K, V>(tree: &AvlTree<K, V>, id: Option<NodeId>) -> usize {
            match id {
                Some(id) => {
                    let node = &tree.nodes[id];
                    1 + walk(tree, node.left).max(walk(tree, node.right))
                }
                None => 0,
            }
        }
        walk(self, self.root)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    fn find_node(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            cur = match self.comparer.compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|id| &self.nodes[id].data)
    }

    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find_node(key)?;
        Some(&mut self.nodes[id].data)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(self.leftmost(root)))
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(self.rightmost(root)))
    }

    fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = &self.nodes[id];
        (&node.key, &node.data)
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            if self.nodes[parent].left == Some(cur) {
                return Some(parent);
            }
            cur = parent;
        }
        None
    }

    /// First node in order whose key is `>= low`
    fn lower_bound(&self, low: &K) -> Option<NodeId> {
        let mut cur = self.root;
        let mut candidate = None;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if self.comparer.compare(&node.key, low) == Ordering::Less {
                cur = node.right;
            } else {
                candidate = Some(id);
                cur = node.left;
            }
        }
        candidate
    }

    /// Visit every node with `low <= key <= high` in order.
    ///
    /// The visitor returns `ControlFlow::Break(())` to stop the walk.
    pub fn range<F>(&self, low: &K, high: &K, mut visitor: F)
    where
        F: FnMut(&K, &V) -> ControlFlow<()>,
    {
        let mut cur = self.lower_bound(low);
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if self.comparer.compare(&node.key, high) == Ordering::Greater {
                break;
            }
            if visitor(&node.key, &node.data).is_break() {
                break;
            }
            cur = self.successor(id);
        }
    }

    /// In-order iterator
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            next: self.root.map(|root| self.leftmost(root)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Insert a node as a leaf and rebalance.
    pub fn insert(&mut self, key: K, data: V) -> CollectionResult<()> {
        let Some(mut cur) = self.root else {
            let id = self.alloc(key, data, None);
            self.root = Some(id);
            return Ok(());
        };

        let go_left = loop {
            let ord = self.comparer.compare(&key, &self.nodes[cur].key);
            if ord == Ordering::Equal && self.unique {
                return Err(CollectionError::duplicate_key());
            }
            let go_left = ord == Ordering::Less;
            let next = if go_left {
                self.nodes[cur].left
            } else {
                self.nodes[cur].right
            };
            match next {
                Some(next) => cur = next,
                None => break go_left,
            }
        };

        let id = self.alloc(key, data, Some(cur));
        if go_left {
            self.nodes[cur].left = Some(id);
        } else {
            self.nodes[cur].right = Some(id);
        }
        self.retrace_insert(id);
        Ok(())
    }

    /// Bulk insert into an empty tree.
    pub fn load<I>(&mut self, entries: I) -> CollectionResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        if !self.is_empty() {
            return Err(CollectionError::not_empty(self.len()));
        }
        for (key, data) in entries {
            self.insert(key, data)?;
        }
        Ok(())
    }

    /// Remove the node for `key`, returning its key and data.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let mut target = self.find_node(key)?;

        // Two children: take over the in-order predecessor's payload,
        // leaving a node with at most one child to unlink.
        if let (Some(left), Some(_)) = (self.nodes[target].left, self.nodes[target].right) {
            let pred = self.rightmost(left);
            self.swap_payload(target, pred);
            target = pred;
        }

        self.retrace_remove(target);

        let node = &self.nodes[target];
        let child = node.left.or(node.right);
        let parent = node.parent;
        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        self.set_child(parent, target, child);

        let node = self.release(target);
        Some((node.key, node.data))
    }

    fn alloc(&mut self, key: K, data: V, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node {
            key,
            data,
            left: None,
            right: None,
            parent,
            balance: 0,
        });
        self.nodes.len() - 1
    }

    /// Drop an unlinked node, moving the last arena slot into its place.
    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let last = self.nodes.len() - 1;
        if id != last {
            let moved = &self.nodes[last];
            let (parent, left, right) = (moved.parent, moved.left, moved.right);
            match parent {
                Some(p) => {
                    if self.nodes[p].left == Some(last) {
                        self.nodes[p].left = Some(id);
                    } else {
                        self.nodes[p].right = Some(id);
                    }
                }
                None => self.root = Some(id),
            }
            for child in [left, right].into_iter().flatten() {
                self.nodes[child].parent = Some(id);
            }
        }
        self.nodes.swap_remove(id)
    }

    fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        let (x, y) = (&mut head[lo], &mut tail[0]);
        std::mem::swap(&mut x.key, &mut y.key);
        std::mem::swap(&mut x.data, &mut y.data);
    }

    /// Point `parent`'s link to `old` at `new` (or the root when parentless).
    fn set_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            Some(p) => {
                if self.nodes[p].left == Some(old) {
                    self.nodes[p].left = new;
                } else {
                    self.nodes[p].right = new;
                }
            }
            None => self.root = new,
        }
    }

    fn retrace_insert(&mut self, mut child: NodeId) {
        while let Some(parent) = self.nodes[child].parent {
            if self.nodes[parent].left == Some(child) {
                self.nodes[parent].balance += 1;
            } else {
                self.nodes[parent].balance -= 1;
            }
            match self.nodes[parent].balance {
                0 => break,
                1 | -1 => child = parent,
                _ => {
                    self.rebalance(parent);
                    break;
                }
            }
        }
    }

    /// Adjust ancestors for the removal of `target`'s subtree level.
    ///
    /// Runs while `target` is still linked; rotations happen on the
    /// sibling side so `target` keeps its parent.
    fn retrace_remove(&mut self, target: NodeId) {
        let mut child = target;
        while let Some(parent) = self.nodes[child].parent {
            if self.nodes[parent].left == Some(child) {
                self.nodes[parent].balance -= 1;
            } else {
                self.nodes[parent].balance += 1;
            }
            let balance = self.nodes[parent].balance;
            child = if balance.abs() > 1 {
                let root = self.rebalance(parent);
                if self.nodes[root].balance != 0 {
                    break;
                }
                root
            } else if balance != 0 {
                break;
            } else {
                parent
            };
        }
    }

    /// Restore balance at `id`, returning the subtree's new root.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        let balance = self.nodes[id].balance;
        if balance > 1 {
            let Some(left) = self.nodes[id].left else {
                return id;
            };
            if self.nodes[left].balance < 0 {
                self.rotate_left(left);
            }
            self.rotate_right(id)
        } else if balance < -1 {
            let Some(right) = self.nodes[id].right else {
                return id;
            };
            if self.nodes[right].balance > 0 {
                self.rotate_right(right);
            }
            self.rotate_left(id)
        } else {
            id
        }
    }

    fn rotate_left(&mut self, a: NodeId) -> NodeId {
        let Some(b) = self.nodes[a].right else {
            return a;
        };
        let inner = self.nodes[b].left;
        let parent = self.nodes[a].parent;

        self.nodes[a].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(a);
        }
        self.nodes[b].left = Some(a);
        self.nodes[a].parent = Some(b);
        self.nodes[b].parent = parent;
        self.set_child(parent, a, Some(b));

        let a_bal = self.nodes[a].balance + 1 - self.nodes[b].balance.min(0);
        let b_bal = self.nodes[b].balance + 1 + a_bal.max(0);
        self.nodes[a].balance = a_bal;
        self.nodes[b].balance = b_bal;
        b
    }

    fn rotate_right(&mut self, a: NodeId) -> NodeId {
        let Some(b) = self.nodes[a].left else {
            return a;
        };
        let inner = self.nodes[b].right;
        let parent = self.nodes[a].parent;

        self.nodes[a].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(a);
        }
        self.nodes[b].right = Some(a);
        self.nodes[a].parent = Some(b);
        self.nodes[b].parent = parent;
        self.set_child(parent, a, Some(b));

        let a_bal = self.nodes[a].balance - 1 - self.nodes[b].balance.max(0);
        let b_bal = self.nodes[b].balance - 1 + a_bal.min(0);
        self.nodes[a].balance = a_bal;
        self.nodes[b].balance = b_bal;
        b
    }

    // ---------------------------------------------------------------
    // Verification
    // ---------------------------------------------------------------

    /// Walk the whole tree and report the first broken invariant.
    ///
    /// Checks stored balance against real heights, the {-1, 0, 1} bound,
    /// local BST order, parent links, in-order monotonicity and that the
    /// node count matches the arena.
    pub fn check_invariants(&self) -> CollectionResult<()> {
        let mut count = 0;
        if let Some(root) = self.root {
            self.check_subtree(root, None, &mut count)?;
        }
        if count != self.nodes.len() {
            return Err(CollectionError::invariant(format!(
                "reachable nodes {} != size {}",
                count,
                self.nodes.len()
            )));
        }
        let mut prev: Option<&K> = None;
        for key in self.keys() {
            if let Some(p) = prev {
                if self.comparer.compare(p, key) == Ordering::Greater {
                    return Err(CollectionError::invariant("in-order keys decrease"));
                }
            }
            prev = Some(key);
        }
        Ok(())
    }

    fn check_subtree(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        count: &mut usize,
    ) -> CollectionResult<i64> {
        let node = &self.nodes[id];
        if node.parent != parent {
            return Err(CollectionError::invariant(format!("node {} has a stale parent link", id)));
        }
        *count += 1;

        let left_height = match node.left {
            Some(left) => {
                if self.comparer.compare(&self.nodes[left].key, &node.key) == Ordering::Greater {
                    return Err(CollectionError::invariant(format!("left child of {} is greater", id)));
                }
                self.check_subtree(left, Some(id), count)?
            }
            None => 0,
        };
        let right_height = match node.right {
            Some(right) => {
                if self.comparer.compare(&self.nodes[right].key, &node.key) == Ordering::Less {
                    return Err(CollectionError::invariant(format!("right child of {} is smaller", id)));
                }
                self.check_subtree(right, Some(id), count)?
            }
            None => 0,
        };

        let real = left_height - right_height;
        if real != i64::from(node.balance) {
            return Err(CollectionError::invariant(format!(
                "node {} stores balance {} but measures {}",
                id, node.balance, real
            )));
        }
        if real.abs() > 1 {
            return Err(CollectionError::invariant(format!("node {} is unbalanced ({})", id, real)));
        }
        Ok(1 + left_height.max(right_height))
    }
}

/// In-order iterator over an [`AvlTree`], driven by successor links
pub struct Iter<'a, K, V> {
    tree: &'a AvlTree<K, V>,
    next: Option<NodeId>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        Some(self.tree.entry(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree() -> AvlTree<i64, Vec<u32>> {
        AvlTree::new(Comparer::natural())
    }

    fn keys(tree: &AvlTree<i64, Vec<u32>>) -> Vec<i64> {
        tree.keys().copied().collect()
    }

    #[test]
    fn test_empty_tree() {
        let t = tree();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert!(t.min().is_none());
        assert!(t.max().is_none());
        assert!(t.find(&1).is_none());
        assert_eq!(t.iter().count(), 0);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let mut t = tree();
        for k in 0..1000 {
            t.insert(k, vec![k as u32]).unwrap();
        }
        t.check_invariants().unwrap();
        assert_eq!(t.len(), 1000);
        // AVL height bound: < 1.44 log2(n + 2)
        assert!(t.height() <= 14, "height {}", t.height());
        assert_eq!(keys(&t), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_find_and_find_mut() {
        let mut t = tree();
        t.insert(10, vec![1]).unwrap();
        t.insert(5, vec![2]).unwrap();
        t.find_mut(&5).unwrap().push(3);
        assert_eq!(t.find(&5), Some(&vec![2, 3]));
        assert!(t.contains(&10));
        assert!(!t.contains(&11));
    }

    #[test]
    fn test_min_max() {
        let mut t = tree();
        for k in [50, 20, 80, 10, 90] {
            t.insert(k, vec![]).unwrap();
        }
        assert_eq!(t.min().map(|(k, _)| *k), Some(10));
        assert_eq!(t.max().map(|(k, _)| *k), Some(90));
    }

    #[test]
    fn test_unique_rejects_duplicate() {
        let mut t = AvlTree::unique(Comparer::<i64>::natural());
        t.insert(1, ()).unwrap();
        let err = t.insert(1, ()).unwrap_err();
        assert_eq!(err.code().code(), "AERO_COLLECTION_DUPLICATE_KEY");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_duplicates_allowed_by_default() {
        let mut t = tree();
        t.insert(1, vec![1]).unwrap();
        t.insert(1, vec![2]).unwrap();
        t.insert(1, vec![3]).unwrap();
        assert_eq!(t.len(), 3);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_leaf_inner_and_root() {
        let mut t = tree();
        for k in [50, 30, 70, 20, 40, 60, 80, 35] {
            t.insert(k, vec![k as u32]).unwrap();
        }
        // inner node with two children
        assert_eq!(t.remove(&30).map(|(k, _)| k), Some(30));
        t.check_invariants().unwrap();
        // leaf
        assert_eq!(t.remove(&80).map(|(_, v)| v), Some(vec![80]));
        t.check_invariants().unwrap();
        // root
        let root_key = t.nodes[t.root.unwrap()].key;
        assert!(t.remove(&root_key).is_some());
        t.check_invariants().unwrap();
        // missing
        assert!(t.remove(&999).is_none());
        assert_eq!(keys(&t).len(), 5);
    }

    #[test]
    fn test_remove_keeps_payload_with_key() {
        let mut t = tree();
        for k in 0..32 {
            t.insert(k, vec![k as u32]).unwrap();
        }
        for k in (0..32).step_by(3) {
            assert_eq!(t.remove(&k), Some((k, vec![k as u32])));
        }
        for (k, v) in t.iter() {
            assert_eq!(v, &vec![*k as u32]);
        }
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_all() {
        let mut t = tree();
        for k in 0..100 {
            t.insert((k * 37) % 101, vec![]).unwrap();
        }
        for k in 0..100 {
            assert!(t.remove(&((k * 37) % 101)).is_some());
            t.check_invariants().unwrap();
        }
        assert!(t.is_empty());
    }

    #[test]
    fn test_range_inclusive() {
        let mut t = tree();
        for k in [1, 3, 5, 7, 9] {
            t.insert(k, vec![]).unwrap();
        }
        let mut seen = Vec::new();
        t.range(&3, &7, |k, _| {
            seen.push(*k);
            ControlFlow::Continue(())
        });
        assert_eq!(seen, vec![3, 5, 7]);

        seen.clear();
        t.range(&2, &8, |k, _| {
            seen.push(*k);
            ControlFlow::Continue(())
        });
        assert_eq!(seen, vec![3, 5, 7]);
    }

    #[test]
    fn test_range_early_stop() {
        let mut t = tree();
        for k in 0..20 {
            t.insert(k, vec![]).unwrap();
        }
        let mut seen = Vec::new();
        t.range(&0, &19, |k, _| {
            seen.push(*k);
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_load() {
        let mut t = tree();
        t.load((0..10).map(|k| (k, vec![]))).unwrap();
        assert_eq!(t.len(), 10);
        t.check_invariants().unwrap();

        let err = t.load(vec![(11, vec![])]).unwrap_err();
        assert_eq!(err.code().code(), "AERO_COLLECTION_NOT_EMPTY");
    }

    #[test]
    fn test_clear() {
        let mut t = tree();
        t.insert(1, vec![]).unwrap();
        t.clear();
        assert!(t.is_empty());
        t.load(vec![(2, vec![])]).unwrap();
    }

    #[test]
    fn test_reverse_comparer() {
        let mut t = AvlTree::new(Comparer::<i64>::natural().reverse());
        for k in [1, 2, 3, 4] {
            t.insert(k, ()).unwrap();
        }
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1]);
        assert_eq!(t.min().map(|(k, _)| *k), Some(4));
    }

    proptest! {
        #[test]
        fn prop_balanced_after_any_ops(ops in prop::collection::vec((any::<bool>(), 0i64..64), 0..300)) {
            let mut t = AvlTree::unique(Comparer::natural());
            let mut model = std::collections::BTreeSet::new();
            for (insert, key) in ops {
                if insert {
                    prop_assert_eq!(t.insert(key, ()).is_ok(), model.insert(key));
                } else {
                    prop_assert_eq!(t.remove(&key).is_some(), model.remove(&key));
                }
                prop_assert!(t.check_invariants().is_ok());
            }
            prop_assert_eq!(t.keys().copied().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
        }
    }
}
