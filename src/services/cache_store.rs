//! Bounded key-value store with LRU eviction and pin-aware bookkeeping.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, trace};

use crate::domain::models::CacheConfig;

/// A cached value plus the bookkeeping used for eviction decisions.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_access: Instant,
    /// Monotonic access sequence; total order for LRU decisions even
    /// when instants tie.
    touch_seq: u64,
}

#[derive(Debug)]
struct StoreInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Pin counts per key. Pinned keys are referenced by an in-flight
    /// resolve and are never evicted; a pin may exist before the entry
    /// does.
    pins: HashMap<K, usize>,
    clock: u64,
}

/// Mapping from key to cached value, bounded by a configured capacity.
///
/// All operations are synchronous and lock-only: `get` never suspends
/// and never performs I/O. After a [`put`](Self::put) completes the
/// store holds at most `capacity` entries, except when every entry is
/// pinned by an in-flight resolve, in which case capacity is
/// temporarily exceeded rather than corrupting an in-flight operation.
pub struct CacheStore<K, V> {
    inner: Mutex<StoreInner<K, V>>,
    config: CacheConfig,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a store with the given sizing configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                pins: HashMap::new(),
                clock: 0,
            }),
            config,
        }
    }

    /// Create a store with no entry limit.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(CacheConfig::unbounded())
    }

    /// The sizing configuration this store was built with.
    #[must_use]
    pub const fn config(&self) -> CacheConfig {
        self.config
    }

    /// Look up a cached value, refreshing its last-access marker.
    ///
    /// Absence is `None`, not an error.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        inner.clock += 1;
        let clock = inner.clock;
        let entry = inner.entries.get_mut(key)?;
        entry.last_access = Instant::now();
        entry.touch_seq = clock;
        Some(entry.value.clone())
    }

    /// Insert or overwrite a value.
    ///
    /// If the store exceeds its capacity afterward, least-recently
    /// accessed unpinned entries are evicted until it fits.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.lock();
        inner.clock += 1;
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            inserted_at: now,
            last_access: now,
            touch_seq: inner.clock,
        };
        inner.entries.insert(key.clone(), entry);
        if let Some(capacity) = self.config.capacity {
            Self::evict_over_capacity(&mut inner, capacity.get(), &key);
        }
    }

    /// Delete an entry if present; no-op otherwise. Returns the
    /// removed value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().entries.remove(key).map(|entry| entry.value)
    }

    /// Whether an entry exists for `key`, without touching its
    /// last-access marker.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Drop every entry. Pins are untouched; in-flight resolves will
    /// repopulate on completion.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Snapshot of the currently cached keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.lock().entries.keys().cloned().collect()
    }

    /// Age of the entry for `key` since insertion, if cached.
    pub fn entry_age(&self, key: &K) -> Option<std::time::Duration> {
        self.lock()
            .entries
            .get(key)
            .map(|entry| entry.inserted_at.elapsed())
    }

    /// Mark `key` as referenced by an in-flight resolve, shielding it
    /// from eviction until unpinned.
    pub(crate) fn pin(&self, key: &K) {
        let mut inner = self.lock();
        *inner.pins.entry(key.clone()).or_insert(0) += 1;
        trace!(pins = inner.pins.len(), "pinned cache key");
    }

    /// Release one pin on `key`.
    pub(crate) fn unpin(&self, key: &K) {
        let mut inner = self.lock();
        if let Some(count) = inner.pins.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                inner.pins.remove(key);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner<K, V>> {
        // A panic while holding the lock leaves the map structurally
        // intact, so recover the guard rather than poisoning every
        // later caller.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn evict_over_capacity(inner: &mut StoreInner<K, V>, capacity: usize, just_written: &K) {
        while inner.entries.len() > capacity {
            // The write that triggered eviction is the most recent
            // access by definition; it must never be its own victim.
            let victim = inner
                .entries
                .iter()
                .filter(|(key, _)| *key != just_written && !inner.pins.contains_key(*key))
                .min_by_key(|(_, entry)| entry.touch_seq)
                .map(|(key, _)| key.clone());
            let Some(victim) = victim else {
                // Every other entry is pinned: run over capacity until
                // the in-flight resolves settle.
                debug!(
                    len = inner.entries.len(),
                    capacity, "all entries pinned, deferring eviction"
                );
                break;
            };
            inner.entries.remove(&victim);
            debug!(len = inner.entries.len(), capacity, "evicted least-recently-used entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn bounded(capacity: usize) -> CacheStore<u64, String> {
        CacheStore::new(CacheConfig::bounded(NonZeroUsize::new(capacity).unwrap()))
    }

    #[test]
    fn test_put_get_round_trip() {
        let store = CacheStore::unbounded();
        store.put(1u64, "alpha".to_string());
        assert_eq!(store.get(&1), Some("alpha".to_string()));
        assert_eq!(store.get(&2), None);
    }

    #[test]
    fn test_put_overwrites() {
        let store = CacheStore::unbounded();
        store.put(1u64, "old".to_string());
        store.put(1u64, "new".to_string());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&1), Some("new".to_string()));
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let store = CacheStore::unbounded();
        store.put(1u64, "alpha".to_string());
        assert_eq!(store.remove(&1), Some("alpha".to_string()));
        assert_eq!(store.remove(&1), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_lru_eviction_order() {
        let store = bounded(3);
        store.put(1, "a".to_string());
        store.put(2, "b".to_string());
        store.put(3, "c".to_string());
        store.put(4, "d".to_string());

        // Key 1 was the least recently accessed.
        assert!(!store.contains(&1));
        assert_eq!(store.len(), 3);
        for key in [2, 3, 4] {
            assert!(store.contains(&key));
        }
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let store = bounded(3);
        store.put(1, "a".to_string());
        store.put(2, "b".to_string());
        store.put(3, "c".to_string());

        // Touch key 1; key 2 becomes the LRU victim.
        assert!(store.get(&1).is_some());
        store.put(4, "d".to_string());

        assert!(store.contains(&1));
        assert!(!store.contains(&2));
    }

    #[test]
    fn test_pinned_entries_survive_eviction() {
        let store = bounded(2);
        store.put(1, "a".to_string());
        store.put(2, "b".to_string());
        store.pin(&1);
        store.pin(&2);

        // Both candidates are pinned: capacity is exceeded, nothing lost.
        store.put(3, "c".to_string());
        assert_eq!(store.len(), 3);

        // Unpinning re-enables eviction on the next put.
        store.unpin(&1);
        store.unpin(&2);
        store.put(4, "d".to_string());
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&1));
        assert!(!store.contains(&2));
    }

    #[test]
    fn test_put_into_fully_pinned_store_keeps_new_value() {
        // A push-update landing while in-flight resolves pin a full
        // store must not discard its own write; the store runs over
        // capacity instead.
        let store = bounded(2);
        store.put(1, "a".to_string());
        store.put(2, "b".to_string());
        store.pin(&1);
        store.pin(&2);

        store.put(3, "pushed".to_string());
        assert_eq!(store.get(&3), Some("pushed".to_string()));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_pin_without_entry_is_harmless() {
        let store = bounded(1);
        store.pin(&9);
        store.put(1, "a".to_string());
        store.put(2, "b".to_string());
        assert_eq!(store.len(), 1);
        store.unpin(&9);
    }

    #[test]
    fn test_clear_and_keys() {
        let store = CacheStore::unbounded();
        store.put(1u64, "a".to_string());
        store.put(2u64, "b".to_string());
        let mut keys = store.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2]);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_entry_age_present_only_when_cached() {
        let store = CacheStore::unbounded();
        assert!(store.entry_age(&1u64).is_none());
        store.put(1u64, "a".to_string());
        assert!(store.entry_age(&1).is_some());
    }
}
