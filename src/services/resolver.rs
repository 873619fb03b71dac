//! Single-flight resolution of cache misses.
//!
//! For each key a transient state machine runs absent → fetching →
//! {cached, failed}: the first miss starts one fetch, every concurrent
//! caller for the same key waits on that fetch's shared outcome, and a
//! failed attempt returns the key to absent so the next resolve starts
//! fresh. Failures are never cached.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::domain::errors::{FetchError, FetchResult};
use crate::services::cache_store::CacheStore;

/// Shared outcome of one in-flight fetch.
///
/// One exists per key currently being fetched; it fans the settled
/// result out to every waiter and is destroyed as soon as the fetch
/// completes. Never persisted.
struct PendingFetch<V> {
    tx: broadcast::Sender<FetchResult<V>>,
}

/// Coordinates cache lookups with deduplicated network fetches.
///
/// Guarantees that for any key at most one fetch is in flight at a
/// time and that all concurrent [`resolve`](Self::resolve) calls for
/// that key observe the identical outcome of that single invocation.
pub struct Resolver<K, V> {
    store: Arc<CacheStore<K, V>>,
    pending: Arc<Mutex<HashMap<K, PendingFetch<V>>>>,
}

impl<K, V> Resolver<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    /// Create a resolver over a shared cache store.
    #[must_use]
    pub fn new(store: Arc<CacheStore<K, V>>) -> Self {
        Self {
            store,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The cache store this resolver consults and writes back into.
    #[must_use]
    pub fn store(&self) -> &Arc<CacheStore<K, V>> {
        &self.store
    }

    /// Number of keys with a fetch currently in flight.
    pub fn in_flight(&self) -> usize {
        lock_pending(&self.pending).len()
    }

    /// Return the cached value for `key`, or fetch it exactly once.
    ///
    /// Cache hits return immediately without suspending. On a miss the
    /// caller either joins an existing in-flight fetch for the key or
    /// starts the single fetch itself; either way it suspends until
    /// that one fetch settles and receives its outcome. The fetch runs
    /// on a spawned task, so a caller abandoning its wait cancels
    /// nothing and other waiters are unaffected.
    ///
    /// On success the value is written into the store before waiters
    /// are woken; on failure nothing is written and the next resolve
    /// starts a fresh attempt.
    pub async fn resolve<F, Fut>(&self, key: K, fetch: F) -> FetchResult<V>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = FetchResult<V>> + Send + 'static,
    {
        if let Some(value) = self.store.get(&key) {
            trace!("cache hit");
            return Ok(value);
        }

        // Check-or-create of the pending entry is one atomic step under
        // the registry lock: two concurrent misses for the same key can
        // never both start a fetch.
        let mut rx = {
            let mut pending = lock_pending(&self.pending);
            if let Some(fetching) = pending.get(&key) {
                trace!("joining in-flight fetch");
                fetching.tx.subscribe()
            } else if let Some(value) = self.store.get(&key) {
                // A fetch or push-update completed between the first
                // lookup and taking the registry lock.
                return Ok(value);
            } else {
                debug!("cache miss, starting fetch");
                let (tx, rx) = broadcast::channel(1);
                pending.insert(
                    key.clone(),
                    PendingFetch { tx: tx.clone() },
                );
                self.store.pin(&key);
                self.spawn_driver(key.clone(), fetch(key), tx);
                rx
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            // The driver task only disappears without broadcasting if
            // the runtime is torn down mid-fetch.
            Err(_) => Err(FetchError::Transport(
                "fetch task dropped before completing".to_string(),
            )),
        }
    }

    /// Drive one fetch to completion on its own task: write back on
    /// success, settle the pending entry, broadcast the outcome.
    fn spawn_driver<Fut>(
        &self,
        key: K,
        fut: Fut,
        tx: broadcast::Sender<FetchResult<V>>,
    ) where
        Fut: Future<Output = FetchResult<V>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            let outcome = fut.await;
            match &outcome {
                Ok(value) => {
                    // Write back before waking waiters so a resolve
                    // arriving after completion hits the cache.
                    store.put(key.clone(), value.clone());
                    debug!("fetch succeeded, cached value");
                }
                Err(err) => {
                    debug!(error = %err, "fetch failed, nothing cached");
                }
            }
            {
                // Registry lock before store lock, same order as the
                // resolve path.
                let mut pending = lock_pending(&pending);
                pending.remove(&key);
                store.unpin(&key);
            }
            // Waiters subscribed while the entry was registered; a send
            // error just means nobody is left listening.
            let _ = tx.send(outcome);
        });
    }
}

fn lock_pending<K, V>(
    pending: &Mutex<HashMap<K, PendingFetch<V>>>,
) -> MutexGuard<'_, HashMap<K, PendingFetch<V>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
