//! Sorted array with binary-search positioning
//!
//! Entries are kept strictly ascending by the comparer. Lookups are
//! O(log n); inserts and removals shift the tail and are O(n).
//!
//! Range slices (`lt`, `lte`, `gt`, `gte`) borrow directly from the
//! backing vector. Missing keys yield empty slices, never errors.

use std::cmp::Ordering;

use super::comparer::Comparer;

/// A single key/value slot
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// Vector of entries kept sorted by key
#[derive(Debug, Clone)]
pub struct BinaryArray<K, V> {
    entries: Vec<Entry<K, V>>,
    comparer: Comparer<K>,
}

impl<K, V> BinaryArray<K, V> {
    /// Creates an empty array ordered by `comparer`
    pub fn new(comparer: Comparer<K>) -> Self {
        Self {
            entries: Vec::new(),
            comparer,
        }
    }

    /// Returns the comparer
    pub fn comparer(&self) -> &Comparer<K> {
        &self.comparer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Smallest position `i` such that `entries[i].key >= key`.
    pub fn insert_pos(&self, key: &K) -> usize {
        self.entries
            .partition_point(|e| self.comparer.compare(&e.key, key) == Ordering::Less)
    }

    /// Position of `key`, if present.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        let pos = self.insert_pos(key);
        match self.entries.get(pos) {
            Some(e) if self.comparer.equal(&e.key, key) => Some(pos),
            _ => None,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index_of(key).map(|pos| &self.entries[pos].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.index_of(key)?;
        Some(&mut self.entries[pos].value)
    }

    pub fn get_at(&self, pos: usize) -> Option<&Entry<K, V>> {
        self.entries.get(pos)
    }

    /// Insert at an explicit position.
    ///
    /// The caller is responsible for choosing a position that keeps the
    /// array sorted; positions past the end append.
    pub fn add_at(&mut self, pos: usize, key: K, value: V) {
        let pos = pos.min(self.entries.len());
        debug_assert!(pos == 0 || self.comparer.compare(&self.entries[pos - 1].key, &key) == Ordering::Less);
        self.entries.insert(pos, Entry { key, value });
    }

    /// Replace the value at `pos`, returning the previous one.
    pub fn replace_at(&mut self, pos: usize, value: V) -> Option<V> {
        let entry = self.entries.get_mut(pos)?;
        Some(std::mem::replace(&mut entry.value, value))
    }

    pub fn remove_at(&mut self, pos: usize) -> Option<Entry<K, V>> {
        if pos < self.entries.len() {
            Some(self.entries.remove(pos))
        } else {
            None
        }
    }

    /// Insert `key` at its sorted position and return that position.
    ///
    /// An existing equal key keeps its slot and has its value replaced.
    pub fn add(&mut self, key: K, value: V) -> usize {
        let pos = self.insert_pos(&key);
        match self.entries.get_mut(pos) {
            Some(e) if self.comparer.equal(&e.key, &key) => e.value = value,
            _ => self.entries.insert(pos, Entry { key, value }),
        }
        pos
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.index_of(key)?;
        Some(self.entries.remove(pos).value)
    }

    /// Entries with keys strictly below `key`.
    pub fn lt(&self, key: &K) -> &[Entry<K, V>] {
        &self.entries[..self.insert_pos(key)]
    }

    /// Entries with keys at or below `key`.
    pub fn lte(&self, key: &K) -> &[Entry<K, V>] {
        &self.entries[..self.upper_pos(key)]
    }

    /// Entries with keys strictly above `key`.
    pub fn gt(&self, key: &K) -> &[Entry<K, V>] {
        &self.entries[self.upper_pos(key)..]
    }

    /// Entries with keys at or above `key`.
    pub fn gte(&self, key: &K) -> &[Entry<K, V>] {
        &self.entries[self.insert_pos(key)..]
    }

    /// First position past an entry equal to `key`
    fn upper_pos(&self, key: &K) -> usize {
        let pos = self.insert_pos(key);
        match self.entries.get(pos) {
            Some(e) if self.comparer.equal(&e.key, key) => pos + 1,
            _ => pos,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|e| &e.value)
    }

    pub fn as_slice(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    /// Returns true if keys are strictly ascending
    pub fn check_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| self.comparer.compare(&w[0].key, &w[1].key) == Ordering::Less)
    }
}

impl<'a, K, V> IntoIterator for &'a BinaryArray<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = std::slice::Iter<'a, Entry<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
