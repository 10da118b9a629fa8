//! Sorted-array backed index
//!
//! Keys are held in a [`BinaryArray`] so point lookups are O(log n) and
//! range operators slice the array at the bound.

use std::sync::Arc;

use crate::collections::{BinaryArray, Comparer, Entry};

use super::key::{IndexKey, ItemId};
use super::traits::{remove_id, Index, IndexKind, KeyFn};

/// Ordered index backed by a sorted array
pub struct BinaryIndex<T> {
    name: String,
    item_fn: KeyFn<T>,
    key_fn: KeyFn<T>,
    array: BinaryArray<IndexKey, Vec<ItemId>>,
}

impl<T> BinaryIndex<T> {
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
            array: BinaryArray::new(comparer),
        }
    }

    /// Sorted keys and buckets, for inspection
    pub fn entries(&self) -> &[Entry<IndexKey, Vec<ItemId>>] {
        self.array.as_slice()
    }
}

fn flatten(slice: &[Entry<IndexKey, Vec<ItemId>>]) -> Vec<ItemId> {
    slice.iter().flat_map(|e| e.value.iter().cloned()).collect()
}

impl<T> Index<T> for BinaryIndex<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Binary
    }

    fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    fn len(&self) -> usize {
        self.array.len()
    }

    fn keys(&self) -> Vec<IndexKey> {
        self.array.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.array.clear();
    }

    fn find(&self, key: &IndexKey) -> Vec<ItemId> {
        self.array.get(key).cloned().unwrap_or_default()
    }

    fn insert(&mut self, item: &T) {
        let key = (self.key_fn)(item);
        let id = (self.item_fn)(item);
        match self.array.get_mut(&key) {
            Some(bucket) => bucket.push(id),
            None => {
                self.array.add(key, vec![id]);
            }
        }
    }

    fn remove(&mut self, item: &T) {
        let key = (self.key_fn)(item);
        let id = (self.item_fn)(item);
        let Some(pos) = self.array.index_of(&key) else {
            return;
        };
        let emptied = match self.array.get_mut(&key) {
            Some(bucket) => remove_id(bucket, &id),
            None => false,
        };
        if emptied {
            self.array.remove_at(pos);
        }
    }

    fn lt(&self, key: &IndexKey) -> Vec<ItemId> {
        flatten(self.array.lt(key))
    }

    fn lte(&self, key: &IndexKey) -> Vec<ItemId> {
        flatten(self.array.lte(key))
    }

    fn gt(&self, key: &IndexKey) -> Vec<ItemId> {
        flatten(self.array.gt(key))
    }

    fn gte(&self, key: &IndexKey) -> Vec<ItemId> {
        flatten(self.array.gte(key))
    }
}
