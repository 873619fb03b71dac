//! Cache sizing configuration.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Per-store cache configuration.
///
/// Capacity is a per-entity-type policy chosen by the composing
/// manager: small, frequently-reused sets (guild roles) typically run
/// unbounded, while high-volume sets (messages) take a bounded LRU
/// capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Maximum number of entries; `None` means unbounded.
    #[serde(default)]
    pub capacity: Option<NonZeroUsize>,
}

impl CacheConfig {
    /// Configuration with no entry limit.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { capacity: None }
    }

    /// Configuration bounded to `capacity` entries with LRU eviction.
    #[must_use]
    pub const fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}
