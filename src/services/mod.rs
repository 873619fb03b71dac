//! Coordination layer: the cache store, the single-flight resolver,
//! and the per-entity-type manager that composes them.

pub mod cache_store;
pub mod entity_manager;
pub mod resolver;

pub use cache_store::CacheStore;
pub use entity_manager::{EntityEvent, EntityManager};
pub use resolver::Resolver;
