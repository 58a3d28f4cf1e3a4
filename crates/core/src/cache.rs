//! Time-bounded cache with explicit per-key invalidation
//!
//! Shared by the corporate knowledge resolver and the analytics aggregator.
//! The cache owns its TTL; writers that change the underlying data are
//! handed the cache so they can invalidate the one key they touched - a
//! blanket flush is never needed and never performed.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// TTL cache keyed by `K`. Values are cloned out on read.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a live entry, dropping it if the TTL has elapsed
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: take the write lock and remove, re-checking freshness in
        // case a writer replaced the entry between the two locks.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop one key. Other keys are untouched.
    pub fn invalidate(&self, key: &K) {
        self.entries.write().remove(key);
    }

    /// Drop every expired entry. Housekeeping only; `get` already ignores
    /// stale entries.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .write()
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
