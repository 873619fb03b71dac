//! Per-entity-type composition of cache store, resolver, and fetch port.

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::FetchResult;
use crate::domain::models::{CacheConfig, Snowflake};
use crate::domain::ports::EntityFetcher;
use crate::services::cache_store::CacheStore;
use crate::services::resolver::Resolver;

/// A push-update observed by the realtime-channel collaborator.
///
/// These notifications arrive unrequested and keep the cache fresh
/// without re-fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent<V> {
    /// The entity was created or changed; the cache takes the new value.
    Updated {
        /// The entity's identifier.
        id: Snowflake,
        /// The entity as observed on the wire.
        value: V,
    },
    /// The entity was removed on the platform.
    Deleted {
        /// The entity's identifier.
        id: Snowflake,
    },
}

/// Cache-or-fetch facade for one entity type.
///
/// Composes a [`CacheStore`] keyed by [`Snowflake`], a single-flight
/// [`Resolver`], and the transport-supplied [`EntityFetcher`]. The
/// fetcher is an explicit handle passed in at construction; entity
/// values stay plain data and carry no reference back to any client.
pub struct EntityManager<V> {
    store: Arc<CacheStore<Snowflake, V>>,
    resolver: Resolver<Snowflake, V>,
    fetcher: Arc<dyn EntityFetcher<V>>,
}

impl<V> EntityManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a manager with the given cache sizing policy and fetch
    /// port.
    #[must_use]
    pub fn new(config: CacheConfig, fetcher: Arc<dyn EntityFetcher<V>>) -> Self {
        let store = Arc::new(CacheStore::new(config));
        let resolver = Resolver::new(Arc::clone(&store));
        Self {
            store,
            resolver,
            fetcher,
        }
    }

    /// Cache-only lookup; never touches the network.
    #[must_use]
    pub fn get_cached(&self, id: Snowflake) -> Option<V> {
        self.store.get(&id)
    }

    /// Resolve `id` through the cache, fetching it at most once under
    /// concurrent demand.
    pub async fn resolve(&self, id: Snowflake) -> FetchResult<V> {
        let fetcher = Arc::clone(&self.fetcher);
        self.resolver
            .resolve(id, move |id| async move { fetcher.fetch(id).await })
            .await
    }

    /// Bypass the cache and issue a fresh fetch.
    ///
    /// Used when the caller explicitly wants current data. The result
    /// is written into the cache on success, but the call is not
    /// deduplicated against any in-flight resolve.
    pub async fn fetch(&self, id: Snowflake) -> FetchResult<V> {
        let value = self.fetcher.fetch(id).await?;
        self.store.put(id, value.clone());
        Ok(value)
    }

    /// Entry point for push-updates from the realtime channel.
    ///
    /// Writes go straight into the cache store, bypassing the
    /// resolver; against a racing in-flight fetch for the same id the
    /// last completed write wins.
    pub fn apply_event(&self, event: EntityEvent<V>) {
        match event {
            EntityEvent::Updated { id, value } => {
                debug!(%id, "push update, caching entity");
                self.store.put(id, value);
            }
            EntityEvent::Deleted { id } => {
                debug!(%id, "push delete, dropping entity");
                self.store.remove(&id);
            }
        }
    }

    /// The underlying cache store, for introspection.
    #[must_use]
    pub fn store(&self) -> &CacheStore<Snowflake, V> {
        &self.store
    }
}
