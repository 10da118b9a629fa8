//! Hash-map backed index
//!
//! Keys iterate in first-insertion order. Range operators have no order
//! to exploit here, so they filter every key through the comparer and
//! then delegate to `find_many` (O(n) in the number of keys).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::collections::Comparer;

use super::key::{IndexKey, ItemId};
use super::traits::{remove_id, Index, IndexKind, KeyFn};

#[derive(Debug, Clone)]
struct Bucket {
    /// Creation sequence, for insertion-ordered key listing
    seq: u64,
    ids: Vec<ItemId>,
}

/// Equality index backed by a `HashMap`
pub struct HashIndex<T> {
    name: String,
    item_fn: KeyFn<T>,
    key_fn: KeyFn<T>,
    comparer: Comparer<IndexKey>,
    buckets: HashMap<IndexKey, Bucket>,
    next_seq: u64,
}

impl<T> HashIndex<T> {
    /// Creates an empty hash index.
    ///
    /// `item_fn` derives the id stored in buckets, `key_fn` the key the
    /// item is grouped under. Emulated range queries use natural order.
    pub fn new<I, K>(name: impl Into<String>, item_fn: I, key_fn: K) -> Self
    where
        I: Fn(&T) -> ItemId + Send + Sync + 'static,
        K: Fn(&T) -> IndexKey + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            item_fn: Arc::new(item_fn),
            key_fn: Arc::new(key_fn),
            comparer: Comparer::natural(),
            buckets: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Ids under every key whose comparison with `bound` satisfies `keep`
    fn scan<P>(&self, bound: &IndexKey, keep: P) -> Vec<ItemId>
    where
        P: Fn(Ordering) -> bool,
    {
        let matching: Vec<IndexKey> = self
            .keys()
            .into_iter()
            .filter(|key| keep(self.comparer.compare(key, bound)))
            .collect();
        self.find_many(&matching)
    }
}

impl<T> Index<T> for HashIndex<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Hash
    }

    fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn keys(&self) -> Vec<IndexKey> {
        let mut ordered: Vec<(u64, &IndexKey)> =
            self.buckets.iter().map(|(key, bucket)| (bucket.seq, key)).collect();
        ordered.sort_unstable_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, key)| key.clone()).collect()
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.next_seq = 0;
    }

    fn find(&self, key: &IndexKey) -> Vec<ItemId> {
        self.buckets
            .get(key)
            .map(|bucket| bucket.ids.clone())
            .unwrap_or_default()
    }

    fn insert(&mut self, item: &T) {
        let key = (self.key_fn)(item);
        let id = (self.item_fn)(item);
        let seq = self.next_seq;
        let bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            seq,
            ids: Vec::new(),
        });
        if bucket.seq == seq {
            self.next_seq += 1;
        }
        bucket.ids.push(id);
    }

    fn remove(&mut self, item: &T) {
        let key = (self.key_fn)(item);
        let id = (self.item_fn)(item);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            if remove_id(&mut bucket.ids, &id) {
                self.buckets.remove(&key);
            }
        }
    }

    fn lt(&self, key: &IndexKey) -> Vec<ItemId> {
        self.scan(key, |ord| ord == Ordering::Less)
    }

    fn lte(&self, key: &IndexKey) -> Vec<ItemId> {
        self.scan(key, |ord| ord != Ordering::Greater)
    }

    fn gt(&self, key: &IndexKey) -> Vec<ItemId> {
        self.scan(key, |ord| ord == Ordering::Greater)
    }

    fn gte(&self, key: &IndexKey) -> Vec<ItemId> {
        self.scan(key, |ord| ord != Ordering::Less)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn by_color() -> HashIndex<Value> {
        HashIndex::new(
            "color",
            |item: &Value| IndexKey::from_json(&item["id"]).unwrap_or(IndexKey::Null),
            |item: &Value| IndexKey::from_json(&item["color"]).unwrap_or(IndexKey::Null),
        )
    }

    fn ids(values: &[i64]) -> Vec<ItemId> {
        values.iter().map(|v| IndexKey::from(*v)).collect()
    }

    #[test]
    fn test_insert_and_find() {
        let mut index = by_color();
        index.insert(&json!({"id": 1, "color": "red"}));
        index.insert(&json!({"id": 2, "color": "red"}));
        index.insert(&json!({"id": 3, "color": "blue"}));

        assert_eq!(index.find(&"red".into()), ids(&[1, 2]));
        assert_eq!(index.find(&"blue".into()), ids(&[3]));
        assert!(index.find(&"green".into()).is_empty());
    }

    #[test]
    fn test_keys_in_insertion_order() {
        let mut index = by_color();
        for (id, color) in [(1, "red"), (2, "blue"), (3, "green"), (4, "blue")] {
            index.insert(&json!({"id": id, "color": color}));
        }
        assert_eq!(
            index.keys(),
            vec![IndexKey::from("red"), IndexKey::from("blue"), IndexKey::from("green")]
        );
    }

    #[test]
    fn test_recreated_bucket_moves_to_end() {
        let mut index = by_color();
        index.insert(&json!({"id": 1, "color": "red"}));
        index.insert(&json!({"id": 2, "color": "blue"}));
        index.remove(&json!({"id": 1, "color": "red"}));
        index.insert(&json!({"id": 1, "color": "red"}));
        assert_eq!(index.keys(), vec![IndexKey::from("blue"), IndexKey::from("red")]);
    }

    #[test]
    fn test_remove_last_id_drops_key() {
        let mut index = by_color();
        let item = json!({"id": 1, "color": "red"});
        index.insert(&item);
        index.remove(&item);
        assert!(index.is_empty());
        assert!(index.keys().is_empty());
        // removing again is a no-op
        index.remove(&item);
    }

    #[test]
    fn test_update_moves_bucket() {
        let mut index = by_color();
        let old = json!({"id": 1, "color": "red"});
        let new = json!({"id": 1, "color": "blue"});
        index.insert(&old);
        index.update(&new, Some(&old));
        assert!(index.find(&"red".into()).is_empty());
        assert_eq!(index.find(&"blue".into()), ids(&[1]));
    }

    #[test]
    fn test_emulated_ranges() {
        let mut index: HashIndex<Value> = HashIndex::new(
            "n",
            |item: &Value| IndexKey::from_json(&item["id"]).unwrap_or(IndexKey::Null),
            |item: &Value| IndexKey::from_json(&item["n"]).unwrap_or(IndexKey::Null),
        );
        for n in [7, 1, 5, 3] {
            index.insert(&json!({"id": n * 10, "n": n}));
        }
        let bound = IndexKey::from(5i64);
        // insertion order of keys is preserved in the result
        assert_eq!(index.lt(&bound), ids(&[10, 30]));
        assert_eq!(index.lte(&bound), ids(&[10, 50, 30]));
        assert_eq!(index.gt(&bound), ids(&[70]));
        assert_eq!(index.gte(&bound), ids(&[70, 50]));
    }

    #[test]
    fn test_populate_twice_fails() {
        let mut index = by_color();
        let items = vec![json!({"id": 1, "color": "red"})];
        index.populate(&mut items.iter()).unwrap();
        let err = index.populate(&mut items.iter()).unwrap_err();
        assert_eq!(err.code().code(), "AERO_INDEX_NOT_EMPTY");

        index.clear();
        index.populate(&mut items.iter()).unwrap();
        assert_eq!(index.len(), 1);
    }
}
