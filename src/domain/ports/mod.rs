//! Port trait definitions (Hexagonal Architecture)
//!
//! The cache layer stays independent of any concrete transport: the
//! only contract between them is [`EntityFetcher`], implemented by the
//! HTTP collaborator and handed to each entity manager explicitly.

pub mod entity_fetcher;

pub use entity_fetcher::EntityFetcher;
