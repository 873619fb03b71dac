//! Transport-side port for fetching entities by identifier.

use async_trait::async_trait;

use crate::domain::errors::FetchResult;
use crate::domain::models::Snowflake;

/// Asynchronous fetch operation supplied by the transport collaborator.
///
/// The resolver invokes this at most once per key at a time and relays
/// the single attempt's outcome to every concurrent waiter.
/// Implementations own timeout, retry, and rate-limit policy; a
/// timeout surfaces here as an ordinary [`FetchError`] and is
/// delivered uniformly to all waiters.
///
/// [`FetchError`]: crate::domain::errors::FetchError
#[async_trait]
pub trait EntityFetcher<V>: Send + Sync {
    /// Fetch the entity identified by `id` from the platform.
    async fn fetch(&self, id: Snowflake) -> FetchResult<V>;
}
