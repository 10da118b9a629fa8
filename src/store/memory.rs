//! In-memory store
//!
//! Owns the primary entries table and the named secondary indexes.
//! Every mutation is fanned out to every registered index, passing the
//! previously stored item so indexes can move ids between buckets.
//!
//! # Invariants
//!
//! - Entries are keyed by the store-wide key function
//! - After any public mutation returns, every index reflects exactly
//!   the stored entries
//! - Ids returned by an index with no stored entry are skipped

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::Value;

use crate::index::{Index, IndexError, IndexKey, ItemId, KeyFn};
use crate::observability::{log_event, Event, ObservationScope, StoreMetrics};
use crate::query::{IndexLookup, QueryEngine, QueryError, Selector};

use super::errors::{StoreError, StoreResult};

/// Primary table plus secondary indexes over items of type `T`
pub struct InMemoryStore<T> {
    key_fn: KeyFn<T>,
    entries: BTreeMap<ItemId, T>,
    indexes: HashMap<String, Box<dyn Index<T>>>,
    metrics: StoreMetrics,
}

impl<T> InMemoryStore<T> {
    /// Creates an empty store with no indexes.
    ///
    /// `key_fn` derives the primary key; keys are expected to be unique.
    pub fn new<K>(key_fn: K) -> Self
    where
        K: Fn(&T) -> ItemId + Send + Sync + 'static,
    {
        Self {
            key_fn: Arc::new(key_fn),
            entries: BTreeMap::new(),
            indexes: HashMap::new(),
            metrics: StoreMetrics::new(),
        }
    }

    /// Loads items into an empty store, filling every index first.
    ///
    /// Nothing is written unless the entries and every index are empty
    /// and no two items share a primary key.
    pub fn populate<I>(&mut self, items: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        if !self.entries.is_empty() {
            return Err(StoreError::NotEmpty(self.entries.len()));
        }
        let items: Vec<T> = items.into_iter().collect();
        let count = items.len().to_string();
        let scope = ObservationScope::with_fields(Event::StorePopulate, &[("items", count.as_str())]);

        let mut keys = BTreeSet::new();
        for item in &items {
            let key = (self.key_fn)(item);
            if !keys.insert(key.clone()) {
                let err = StoreError::DuplicateKey(key);
                scope.fail(&err.to_string());
                return Err(err);
            }
        }

        let mut names: Vec<&String> = self.indexes.keys().collect();
        names.sort();
        let filled = names
            .into_iter()
            .filter_map(|name| self.indexes.get(name))
            .find(|index| !index.is_empty());
        if let Some(index) = filled {
            let err = IndexError::not_empty(index.name(), index.len());
            scope.fail(err.message());
            return Err(err.into());
        }

        for index in self.indexes.values_mut() {
            if let Err(err) = index.populate(&mut items.iter()) {
                scope.fail(err.message());
                return Err(err.into());
            }
            self.metrics.increment_index_populations();
        }

        self.metrics.add_items_written(items.len() as u64);
        for item in items {
            self.entries.insert((self.key_fn)(&item), item);
        }
        scope.complete();
        Ok(())
    }

    /// Clears every index and the entries, then populates from `items`.
    pub fn rebuild<I>(&mut self, items: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        let scope = ObservationScope::new(Event::StoreRebuild);
        for index in self.indexes.values_mut() {
            index.clear();
            log_event(Event::IndexCleared, &[("index", index.name())]);
        }
        self.entries.clear();
        self.metrics.increment_rebuilds();

        match self.populate(items) {
            Ok(()) => {
                scope.complete();
                Ok(())
            }
            Err(err) => {
                scope.fail(&err.to_string());
                Err(err)
            }
        }
    }

    /// Drops every entry and unregisters every index
    pub fn destroy(&mut self) {
        let entries = self.entries.len().to_string();
        let indexes = self.indexes.len().to_string();
        self.entries.clear();
        self.indexes.clear();
        log_event(
            Event::StoreDestroyed,
            &[("entries", entries.as_str()), ("indexes", indexes.as_str())],
        );
    }

    /// Returns true if an entry exists under `key`
    pub fn has(&self, key: &ItemId) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item(&self, key: &ItemId) -> Option<&T> {
        self.entries.get(key)
    }

    /// All entries in primary key order
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Primary key of `item`
    pub fn key_of(&self, item: &T) -> ItemId {
        (self.key_fn)(item)
    }

    /// Items stored under any of `keys` in the named index
    pub fn get(&self, index: &str, keys: &[IndexKey]) -> StoreResult<Vec<&T>> {
        let ids = self.lookup_index(index)?.find_many(keys);
        Ok(self.resolve(&ids))
    }

    /// Items stored under `key` in the named index
    pub fn get_one(&self, index: &str, key: &IndexKey) -> StoreResult<Vec<&T>> {
        let ids = self.lookup_index(index)?.find(key);
        Ok(self.resolve(&ids))
    }

    /// Parses and evaluates a loose filter
    pub fn find(&self, query: &Value) -> StoreResult<Vec<&T>> {
        let result = QueryEngine::new(&self.indexes).find(query);
        self.finish_query(result)
    }

    /// Evaluates a parsed selector
    pub fn find_selector(&self, selector: &Selector) -> StoreResult<Vec<&T>> {
        let result = QueryEngine::new(&self.indexes).find_selector(selector);
        self.finish_query(result)
    }

    /// Registers `index` unless one with the same name exists.
    ///
    /// An empty index is populated from the current entries. Returns
    /// true if the index was added.
    pub fn ensure_index(&mut self, mut index: Box<dyn Index<T>>) -> StoreResult<bool> {
        if self.indexes.contains_key(index.name()) {
            return Ok(false);
        }
        if index.is_empty() {
            index.populate(&mut self.entries.values())?;
            self.metrics.increment_index_populations();
            let keys = index.len().to_string();
            log_event(
                Event::IndexPopulated,
                &[("index", index.name()), ("keys", keys.as_str())],
            );
        }
        log_event(
            Event::IndexRegistered,
            &[("index", index.name()), ("kind", index.kind().as_str())],
        );
        self.indexes.insert(index.name().to_string(), index);
        Ok(true)
    }

    pub fn index(&self, name: &str) -> Option<&dyn Index<T>> {
        self.indexes.lookup(name)
    }

    /// Registered index names, sorted
    pub fn index_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Upserts every item
    pub fn add<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.add_one(item);
        }
    }

    /// Upserts one item, returning the entry it replaced
    pub fn add_one(&mut self, item: T) -> Option<T> {
        let key = (self.key_fn)(&item);
        let previous = self.entries.get(&key);
        for index in self.indexes.values_mut() {
            index.update(&item, previous);
        }
        self.metrics.add_items_written(1);
        self.entries.insert(key, item)
    }

    /// Upserts every item
    pub fn update<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.add(items);
    }

    /// Upserts one item, returning the entry it replaced
    pub fn update_one(&mut self, item: T) -> Option<T> {
        self.add_one(item)
    }

    /// Removes the stored entry for each item's key
    pub fn remove<'a, I>(&mut self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        items
            .into_iter()
            .filter_map(|item| self.remove_one(item))
            .collect()
    }

    /// Removes the stored entry with the same key as `item`.
    ///
    /// Indexes are updated from the stored entry, not from `item`.
    pub fn remove_one(&mut self, item: &T) -> Option<T> {
        let key = (self.key_fn)(item);
        self.remove_key(&key)
    }

    pub fn remove_key(&mut self, key: &ItemId) -> Option<T> {
        let stored = self.entries.remove(key)?;
        for index in self.indexes.values_mut() {
            index.remove(&stored);
        }
        self.metrics.add_items_removed(1);
        Some(stored)
    }

    /// Keys of the named index, in index order
    pub fn get_index_keys(&self, index: &str) -> StoreResult<Vec<IndexKey>> {
        Ok(self.lookup_index(index)?.keys())
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    fn lookup_index(&self, name: &str) -> StoreResult<&dyn Index<T>> {
        self.index(name)
            .ok_or_else(|| StoreError::UnknownIndex(name.to_string()))
    }

    fn resolve(&self, ids: &[ItemId]) -> Vec<&T> {
        ids.iter().filter_map(|id| self.entries.get(id)).collect()
    }

    fn finish_query(&self, result: Result<Vec<ItemId>, QueryError>) -> StoreResult<Vec<&T>> {
        match result {
            Ok(ids) => {
                self.metrics.increment_queries_executed();
                let items = self.resolve(&ids);
                let count = items.len().to_string();
                log_event(Event::QueryExecuted, &[("items", count.as_str())]);
                Ok(items)
            }
            Err(err) => {
                self.metrics.increment_queries_rejected();
                log_event(
                    Event::QueryRejected,
                    &[("code", err.code().code()), ("reason", err.message())],
                );
                Err(err.into())
            }
        }
    }
}

impl<T> IndexLookup<T> for InMemoryStore<T> {
    fn lookup(&self, name: &str) -> Option<&dyn Index<T>> {
        self.indexes.lookup(name)
    }
}
