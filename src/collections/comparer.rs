//! Total-order functions over keys

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A shareable total-order function.
///
/// Cloning a comparer shares the same function, so an index and the
/// structure behind it always agree on key order.
pub struct Comparer<K> {
    func: Arc<dyn Fn(&K, &K) -> Ordering + Send + Sync>,
}

impl<K: 'static> Comparer<K> {
    /// Wrap an ordering function
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Returns the same ordering, inverted
    pub fn reverse(&self) -> Self {
        let inner = self.clone();
        Self::new(move |a, b| inner.compare(b, a))
    }
}

impl<K: Ord + 'static> Comparer<K> {
    /// Natural `Ord` ordering
    pub fn natural() -> Self {
        Self::new(|a: &K, b: &K| a.cmp(b))
    }
}

impl<K> Comparer<K> {
    /// Compare two keys
    #[inline]
    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.func)(a, b)
    }

    /// Returns true if both keys compare equal
    #[inline]
    pub fn equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<K> Clone for Comparer<K> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

impl<K> fmt::Debug for Comparer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparer(..)")
    }
}

impl<K: Ord + 'static> Default for Comparer<K> {
    fn default() -> Self {
        Self::natural()
    }
}
