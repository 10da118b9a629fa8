//! AVL-tree backed index
//!
//! Range operators are built on the tree's inclusive range walk from the
//! tree's own min or max to the query bound. Exclusive operators drop the
//! node equal to the bound during the walk.

use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::collections::{AvlTree, Comparer};
use crate::observability::{log_event, Event};

use super::key::{IndexKey, ItemId};
use super::traits::{remove_id, Index, IndexKind, KeyFn};

/// Ordered index backed by an AVL tree
pub struct AvlIndex<T> {
    name: String,
    item_fn: KeyFn<T>,
    key_fn: KeyFn<T>,
    tree: AvlTree<IndexKey, Vec<ItemId>>,
}

impl<T> AvlIndex<T> {
    /// Creates an empty index in natural key order
    pub fn new<I, K>(name: impl Into<String>, item_fn: I, key_fn: K) -> Self
    where
        I: Fn(&T) -> ItemId + Send + Sync + 'static,
        K: Fn(&T) -> IndexKey + Send + Sync + 'static,
    {
        Self::with_comparer(name, item_fn, key_fn, Comparer::natural())
    }

    /// Creates an empty index ordered by `comparer`
    pub fn with_comparer<I, K>(
        name: impl Into<String>,
        item_fn: I,
        key_fn: K,
        comparer: Comparer<IndexKey>,
    ) -> Self
    where
        I: Fn(&T) -> ItemId + Send + Sync + 'static,
        K: Fn(&T) -> IndexKey + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            item_fn: Arc::new(item_fn),
            key_fn: Arc::new(key_fn),
            tree: AvlTree::unique(comparer),
        }
    }

    /// The backing tree, for inspection
    pub fn tree(&self) -> &AvlTree<IndexKey, Vec<ItemId>> {
        &self.tree
    }

    /// Walk `[low, high]`, skipping a node equal to `exclude`.
    fn collect_range(&self, low: &IndexKey, high: &IndexKey, exclude: Option<&IndexKey>) -> Vec<ItemId> {
        let comparer = self.tree.comparer();
        let mut out = Vec::new();
        self.tree.range(low, high, |key, bucket| {
            let skip = exclude.is_some_and(|bound| comparer.compare(key, bound) == Ordering::Equal);
            if !skip {
                out.extend(bucket.iter().cloned());
            }
            ControlFlow::Continue(())
        });
        out
    }
}

impl<T> Index<T> for AvlIndex<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Avl
    }

    fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn keys(&self) -> Vec<IndexKey> {
        self.tree.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }

    fn find(&self, key: &IndexKey) -> Vec<ItemId> {
        self.tree.find(key).cloned().unwrap_or_default()
    }

    fn insert(&mut self, item: &T) {
        let key = (self.key_fn)(item);
        let id = (self.item_fn)(item);
        if let Some(bucket) = self.tree.find_mut(&key) {
            bucket.push(id);
            return;
        }
        if let Err(err) = self.tree.insert(key, vec![id]) {
            log_event(
                Event::IndexInsertFailed,
                &[("index", self.name.as_str()), ("reason", err.message())],
            );
        }
    }

    fn remove(&mut self, item: &T) {
        let key = (self.key_fn)(item);
        let id = (self.item_fn)(item);
        let emptied = match self.tree.find_mut(&key) {
            Some(bucket) => remove_id(bucket, &id),
            None => return,
        };
        if emptied {
            self.tree.remove(&key);
        }
    }

    fn lt(&self, key: &IndexKey) -> Vec<ItemId> {
        match self.tree.min() {
            Some((min, _)) => self.collect_range(min, key, Some(key)),
            None => Vec::new(),
        }
    }

    fn lte(&self, key: &IndexKey) -> Vec<ItemId> {
        match self.tree.min() {
            Some((min, _)) => self.collect_range(min, key, None),
            None => Vec::new(),
        }
    }

    fn gt(&self, key: &IndexKey) -> Vec<ItemId> {
        match self.tree.max() {
            Some((max, _)) => self.collect_range(key, max, Some(key)),
            None => Vec::new(),
        }
    }

    fn gte(&self, key: &IndexKey) -> Vec<ItemId> {
        match self.tree.max() {
            Some((max, _)) => self.collect_range(key, max, None),
            None => Vec::new(),
        }
    }
}
