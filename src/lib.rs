//! Rookery - typed entity cache with single-flight resolution
//!
//! Rookery is the cache-or-fetch core of a client for a
//! snowflake-identified realtime platform: ask for an entity by
//! identifier, get it instantly if already known, otherwise fetch it
//! from the network exactly once even under concurrent demand, and
//! keep the cache consistent with push-based update/delete
//! notifications from the realtime channel.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): identifiers, flag sets, cache
//!   configuration, error types, and the transport-facing
//!   [`EntityFetcher`] port
//! - **Service Layer** (`services`): the [`CacheStore`], the
//!   single-flight [`Resolver`], and the per-entity-type
//!   [`EntityManager`]
//!
//! Transport (HTTP), gateway framing, and per-entity JSON schemas are
//! external collaborators: the transport side implements
//! [`EntityFetcher`], and the gateway side feeds
//! [`EntityManager::apply_event`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rookery::{CacheConfig, EntityManager, Snowflake};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let roles = EntityManager::new(CacheConfig::unbounded(), Arc::new(http_fetcher));
//!     let role = roles.resolve(Snowflake::parse("175928847299117063")?).await?;
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{FetchError, FetchResult, FormatError, InvalidFlagError};
pub use domain::models::{CacheConfig, Flag, FlagDomain, FlagSet, Snowflake, PLATFORM_EPOCH_MS};
pub use domain::ports::EntityFetcher;
pub use services::{CacheStore, EntityEvent, EntityManager, Resolver};
