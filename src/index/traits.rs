//! The index contract shared by every variant

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{IndexError, IndexResult};
use super::key::{IndexKey, ItemId};

/// Derives an index key (or item id) from an item
pub type KeyFn<T> = Arc<dyn Fn(&T) -> IndexKey + Send + Sync>;

/// Backing structure of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Hash map, insertion-ordered keys, emulated ranges
    Hash,
    /// Sorted array with binary search
    Binary,
    /// AVL tree
    Avl,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Hash => "hash",
            IndexKind::Binary => "binary",
            IndexKind::Avl => "avl",
        }
    }

    /// Returns true if keys are kept in comparer order
    pub fn is_ordered(&self) -> bool {
        !matches!(self, IndexKind::Hash)
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named secondary index over items of type `T`.
///
/// Each index groups item ids into buckets under a derived index key.
/// A bucket never exists empty: removing its last id deletes the key.
///
/// Lookups never fail; absent keys produce empty results.
pub trait Index<T> {
    /// Name, unique within a store
    fn name(&self) -> &str;

    fn kind(&self) -> IndexKind;

    fn is_empty(&self) -> bool;

    /// Number of distinct index keys
    fn len(&self) -> usize;

    /// All keys: insertion order for hash indexes, ascending otherwise
    fn keys(&self) -> Vec<IndexKey>;

    /// Reset to empty
    fn clear(&mut self);

    /// Item ids stored under `key`
    fn find(&self, key: &IndexKey) -> Vec<ItemId>;

    /// Concatenation of `find` over `keys`, in the given key order
    fn find_many(&self, keys: &[IndexKey]) -> Vec<ItemId> {
        keys.iter().flat_map(|key| self.find(key)).collect()
    }

    /// Add the item's id to the bucket for its key
    fn insert(&mut self, item: &T);

    /// Remove the item's id from the bucket for its key
    fn remove(&mut self, item: &T);

    /// Re-index an item: the old item (if any) is removed by its own
    /// derived key before the new item is inserted, so a changed key
    /// moves the id between buckets.
    fn update(&mut self, item: &T, old: Option<&T>) {
        if let Some(old) = old {
            self.remove(old);
        }
        self.insert(item);
    }

    /// Insert every item into an empty index.
    fn populate<'a>(&mut self, items: &mut dyn Iterator<Item = &'a T>) -> IndexResult<()>
    where
        T: 'a,
    {
        if !self.is_empty() {
            return Err(IndexError::not_empty(self.name(), self.len()));
        }
        for item in items {
            self.insert(item);
        }
        Ok(())
    }

    /// Ids under keys strictly below `key`
    fn lt(&self, key: &IndexKey) -> Vec<ItemId>;

    /// Ids under keys at or below `key`
    fn lte(&self, key: &IndexKey) -> Vec<ItemId>;

    /// Ids under keys strictly above `key`
    fn gt(&self, key: &IndexKey) -> Vec<ItemId>;

    /// Ids under keys at or above `key`
    fn gte(&self, key: &IndexKey) -> Vec<ItemId>;
}

/// Remove one occurrence of `id` from a bucket.
///
/// Returns true if the bucket is now empty.
pub(crate) fn remove_id(bucket: &mut Vec<ItemId>, id: &ItemId) -> bool {
    if let Some(pos) = bucket.iter().position(|candidate| candidate == id) {
        bucket.remove(pos);
    }
    bucket.is_empty()
}
