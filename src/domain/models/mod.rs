//! Core domain models: identifiers, flag sets, and cache configuration.

pub mod config;
pub mod flags;
pub mod snowflake;

pub use config::CacheConfig;
pub use flags::{Flag, FlagDomain, FlagSet};
pub use snowflake::{Snowflake, PLATFORM_EPOCH_MS};
