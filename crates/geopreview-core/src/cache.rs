//! Memoization cache for pipeline results.
//!
//! Maps an argument tuple to a shared, immutable result. Population is
//! idempotent: a value is computed outside the lock, and when two callers race
//! on the same key the first stored value wins and the other is dropped.
//! Errors are returned to the caller and never stored.

use lru::LruCache;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Eviction policy for a [`MemoCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Keep every entry for the lifetime of the cache
    #[default]
    Unbounded,
    /// Keep at most `n` entries, evicting the least recently used
    Lru(NonZeroUsize),
}

impl CachePolicy {
    /// Policy from a capacity where 0 means unbounded
    pub fn from_capacity(capacity: usize) -> Self {
        match NonZeroUsize::new(capacity) {
            Some(cap) => CachePolicy::Lru(cap),
            None => CachePolicy::Unbounded,
        }
    }
}

enum Store<K: Hash + Eq, V> {
    Unbounded(HashMap<K, Arc<V>>),
    Lru(LruCache<K, Arc<V>>),
}

impl<K: Hash + Eq, V> Store<K, V> {
    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        match self {
            Store::Unbounded(map) => map.get(key).cloned(),
            Store::Lru(lru) => lru.get(key).cloned(),
        }
    }

    fn insert(&mut self, key: K, value: Arc<V>) {
        match self {
            Store::Unbounded(map) => {
                map.insert(key, value);
            }
            Store::Lru(lru) => {
                lru.put(key, value);
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Store::Unbounded(map) => map.len(),
            Store::Lru(lru) => lru.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Store::Unbounded(map) => map.clear(),
            Store::Lru(lru) => lru.clear(),
        }
    }
}

/// Thread-safe memo cache keyed by argument tuples
pub struct MemoCache<K: Hash + Eq, V> {
    store: Mutex<Store<K, V>>,
}

impl<K: Hash + Eq + Clone, V> MemoCache<K, V> {
    pub fn new(policy: CachePolicy) -> Self {
        let store = match policy {
            CachePolicy::Unbounded => Store::Unbounded(HashMap::new()),
            CachePolicy::Lru(cap) => Store::Lru(LruCache::new(cap)),
        };
        Self { store: Mutex::new(store) }
    }

    pub fn unbounded() -> Self {
        Self::new(CachePolicy::Unbounded)
    }

    /// Look up a cached value
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key)
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without holding the lock. If another caller stored the
    /// same key in the meantime, that value is returned instead.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }

        let value = Arc::new(compute()?);

        let mut store = self.lock();
        if let Some(existing) = store.get(&key) {
            return Ok(existing);
        }
        store.insert(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Store<K, V>> {
        // A panic inside `compute` never happens under the lock, so a poisoned
        // store still holds only complete entries.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K: Hash + Eq + Clone, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::unbounded()
    }
}
