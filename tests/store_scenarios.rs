//! Store scenarios
//!
//! - Items are reachable through every index after each mutation
//! - Updates migrate ids between buckets
//! - populate is guarded, rebuild and destroy reset state
//! - A store can be declared from a config file

use std::collections::BTreeMap;
use std::fs;

use aeroindex::index::{AvlIndex, BinaryIndex, HashIndex, Index, IndexKey};
use aeroindex::store::{field_key, InMemoryStore, StoreConfig, StoreError};
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;

// =============================================================================
// Helper Functions
// =============================================================================

fn field(name: &'static str) -> impl Fn(&Value) -> IndexKey + Send + Sync + 'static {
    move |item: &Value| field_key(item, name)
}

fn ids(items: &[&Value]) -> Vec<i64> {
    items.iter().filter_map(|item| item["id"].as_i64()).collect()
}

fn names_store() -> InMemoryStore<Value> {
    let mut store = InMemoryStore::new(field("id"));
    store
        .ensure_index(Box::new(HashIndex::new("name", field("id"), field("name"))))
        .unwrap();
    store
        .populate(vec![
            json!({"id": 1, "name": "a"}),
            json!({"id": 2, "name": "b"}),
            json!({"id": 3, "name": "a"}),
        ])
        .unwrap();
    store
}

// =============================================================================
// Core Scenario
// =============================================================================

/// get("name", "a") -> {1, 3}; after remove_key(1) -> {3}.
#[test]
fn test_get_after_remove_key() {
    let mut store = names_store();
    assert_eq!(ids(&store.get_one("name", &"a".into()).unwrap()), vec![1, 3]);

    store.remove_key(&IndexKey::from(1i64));
    assert_eq!(ids(&store.get_one("name", &"a".into()).unwrap()), vec![3]);
    assert_eq!(store.len(), 2);
}

/// Removing the last id under a key drops the key.
#[test]
fn test_last_removal_drops_key() {
    let mut store = names_store();
    store.remove_key(&IndexKey::from(2i64));
    assert_eq!(store.get_index_keys("name").unwrap(), vec![IndexKey::from("a")]);
    assert!(store.get_one("name", &"b".into()).unwrap().is_empty());
}

// =============================================================================
// Updates
// =============================================================================

/// A changed key moves the id on every index kind.
#[test]
fn test_update_migrates_on_every_kind() {
    let mut store = InMemoryStore::new(field("id"));
    store.ensure_index(Box::new(HashIndex::new("h", field("id"), field("k")))).unwrap();
    store.ensure_index(Box::new(BinaryIndex::new("b", field("id"), field("k")))).unwrap();
    store.ensure_index(Box::new(AvlIndex::new("a", field("id"), field("k")))).unwrap();
    store.add_one(json!({"id": 1, "k": 10}));
    store.add_one(json!({"id": 2, "k": 10}));

    store.update_one(json!({"id": 1, "k": 20}));

    for index in ["h", "b", "a"] {
        assert_eq!(ids(&store.get_one(index, &10i64.into()).unwrap()), vec![2], "{}", index);
        assert_eq!(ids(&store.get_one(index, &20i64.into()).unwrap()), vec![1], "{}", index);
    }

    store.update_one(json!({"id": 2, "k": 20}));
    for index in ["h", "b", "a"] {
        assert_eq!(
            store.get_index_keys(index).unwrap(),
            vec![IndexKey::from(20i64)],
            "{}",
            index
        );
    }
}

/// Re-adding an identical item does not duplicate its id; the id moves
/// to the end of its bucket.
#[test]
fn test_idempotent_upsert() {
    let mut store = names_store();
    store.add(vec![json!({"id": 1, "name": "a"}), json!({"id": 1, "name": "a"})]);
    assert_eq!(ids(&store.get_one("name", &"a".into()).unwrap()), vec![3, 1]);
    assert_eq!(store.len(), 3);
}

/// Items with a missing field index under null.
#[test]
fn test_missing_field_indexes_as_null() {
    let mut store = names_store();
    store.add_one(json!({"id": 4}));
    assert_eq!(ids(&store.get_one("name", &IndexKey::Null).unwrap()), vec![4]);
    assert_eq!(ids(&store.find(&json!({"name": null})).unwrap()), vec![4]);
}

// =============================================================================
// Lifecycle
// =============================================================================

/// A second populate fails; the first one's contents survive.
#[test]
fn test_populate_guard() {
    let mut store = names_store();
    let err = store.populate(vec![json!({"id": 9, "name": "z"})]).unwrap_err();
    assert!(matches!(err, StoreError::NotEmpty(3)));
    assert!(err.is_fatal());
    assert!(store.get_one("name", &"z".into()).unwrap().is_empty());
}

/// An index populated by hand cannot be populated again by the store.
#[test]
fn test_prefilled_index_blocks_populate() {
    let mut index = HashIndex::new("name", field("id"), field("name"));
    index.insert(&json!({"id": 1, "name": "a"}));

    let mut store = InMemoryStore::new(field("id"));
    store.ensure_index(Box::new(index)).unwrap();
    let err = store.populate(vec![json!({"id": 2, "name": "b"})]).unwrap_err();
    assert_eq!(err.code(), "AERO_INDEX_NOT_EMPTY");
}

/// A repeated primary key fails before any index is touched.
#[test]
fn test_populate_rejects_duplicate_keys() {
    let mut store = InMemoryStore::new(field("id"));
    store
        .ensure_index(Box::new(HashIndex::new("name", field("id"), field("name"))))
        .unwrap();

    let err = store
        .populate(vec![json!({"id": 1, "name": "a"}), json!({"id": 1, "name": "b"})])
        .unwrap_err();
    assert!(matches!(&err, StoreError::DuplicateKey(key) if *key == IndexKey::from(1i64)));
    assert_eq!(err.code(), "AERO_STORE_DUPLICATE_KEY");
    assert!(err.is_fatal());
    assert!(store.is_empty());
    assert!(store.get_index_keys("name").unwrap().is_empty());

    store
        .populate(vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})])
        .unwrap();
    assert_eq!(ids(&store.get_one("name", &"a".into()).unwrap()), vec![1]);
}

/// A non-empty index fails populate before any other index is filled.
#[test]
fn test_prefilled_index_leaves_others_empty() {
    let mut prefilled = HashIndex::new("name", field("id"), field("name"));
    prefilled.insert(&json!({"id": 1, "name": "a"}));

    let mut store = InMemoryStore::new(field("id"));
    store.ensure_index(Box::new(prefilled)).unwrap();
    for name in ["alpha", "beta", "gamma", "omega"] {
        store
            .ensure_index(Box::new(BinaryIndex::new(name, field("id"), field("name"))))
            .unwrap();
    }

    let err = store.populate(vec![json!({"id": 2, "name": "b"})]).unwrap_err();
    assert_eq!(err.code(), "AERO_INDEX_NOT_EMPTY");
    assert!(store.is_empty());
    for name in ["alpha", "beta", "gamma", "omega"] {
        assert!(store.get_index_keys(name).unwrap().is_empty(), "{} was filled", name);
    }
}

/// Unsigned ids above i64::MAX stay distinct primary keys.
#[test]
fn test_large_unsigned_ids() {
    let mut store = InMemoryStore::new(field("id"));
    store
        .populate(vec![
            json!({"id": u64::MAX, "name": "a"}),
            json!({"id": u64::MAX - 1, "name": "b"}),
        ])
        .unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.has(&IndexKey::from(u64::MAX)));
    assert!(store.has(&IndexKey::from(u64::MAX - 1)));
}

#[test]
fn test_rebuild_then_query() {
    let mut store = names_store();
    store
        .rebuild(vec![json!({"id": 7, "name": "b"}), json!({"id": 8, "name": "c"})])
        .unwrap();
    assert!(!store.has(&IndexKey::from(1i64)));
    assert_eq!(ids(&store.find(&json!({"name": ["a", "b", "c"]})).unwrap()), vec![7, 8]);
}

#[test]
fn test_destroy_then_reuse() {
    let mut store = names_store();
    store.destroy();
    assert!(store.is_empty());
    assert!(matches!(
        store.get_one("name", &"a".into()),
        Err(StoreError::UnknownIndex(_))
    ));

    store
        .ensure_index(Box::new(AvlIndex::new("name", field("id"), field("name"))))
        .unwrap();
    store.populate(vec![json!({"id": 5, "name": "q"})]).unwrap();
    assert_eq!(store.index("name").map(|i| i.len()), Some(1));
}

/// Ids an index returns without a stored entry are skipped.
#[test]
fn test_dangling_ids_are_skipped() {
    let mut index = HashIndex::new("name", field("id"), field("name"));
    index.insert(&json!({"id": 99, "name": "ghost"}));

    let mut store = InMemoryStore::new(field("id"));
    store.ensure_index(Box::new(index)).unwrap();
    store.add_one(json!({"id": 1, "name": "ghost"}));
    assert_eq!(ids(&store.get_one("name", &"ghost".into()).unwrap()), vec![1]);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_store_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aeroindex.json");
    fs::write(
        &path,
        r#"{
            "primary_key": "sku",
            "log_level": "error",
            "indexes": [
                {"name": "price", "kind": "avl", "field": "/pricing/amount"},
                {"name": "brand", "kind": "hash", "field": "brand"}
            ]
        }"#,
    )
    .unwrap();

    let config = StoreConfig::load(&path).unwrap();
    let mut store = InMemoryStore::from_config(&config).unwrap();
    store
        .populate(vec![
            json!({"sku": "A", "brand": "x", "pricing": {"amount": 12.5}}),
            json!({"sku": "B", "brand": "y", "pricing": {"amount": 8}}),
            json!({"sku": "C", "brand": "x", "pricing": {"amount": 20}}),
        ])
        .unwrap();

    let cheap_x = store
        .find(&json!({"brand": "x", "price": {"$lt": 15}}))
        .unwrap();
    assert_eq!(cheap_x.len(), 1);
    assert_eq!(cheap_x[0]["sku"], "A");

    assert!(store.has(&IndexKey::from("B")));
}

// =============================================================================
// Property Tests
// =============================================================================

fn boxed(kind: usize) -> Box<dyn Index<Value>> {
    match kind {
        0 => Box::new(HashIndex::new("k", field("id"), field("k"))),
        1 => Box::new(BinaryIndex::new("k", field("id"), field("k"))),
        _ => Box::new(AvlIndex::new("k", field("id"), field("k"))),
    }
}

proptest! {
    /// Every live item is found under its key; keys with no live item are gone.
    #[test]
    fn prop_index_round_trip(
        kind in 0usize..3,
        ops in prop::collection::vec((any::<bool>(), 0i64..20, 0i64..6), 0..150),
    ) {
        let mut index = boxed(kind);
        let mut live: BTreeMap<i64, i64> = BTreeMap::new();

        for (insert, id, key) in ops {
            let item = json!({"id": id, "k": key});
            if insert {
                let old = live.get(&id).map(|k| json!({"id": id, "k": k}));
                index.update(&item, old.as_ref());
                live.insert(id, key);
            } else if let Some(k) = live.remove(&id) {
                index.remove(&json!({"id": id, "k": k}));
            }
        }

        for (id, key) in &live {
            prop_assert!(index.find(&IndexKey::from(*key)).contains(&IndexKey::from(*id)));
        }
        let mut expected: Vec<i64> = live.values().copied().collect();
        expected.sort_unstable();
        expected.dedup();
        let mut actual: Vec<IndexKey> = index.keys();
        actual.sort();
        prop_assert_eq!(actual, expected.into_iter().map(IndexKey::from).collect::<Vec<_>>());
    }
}
