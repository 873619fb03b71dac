//! Domain layer for the entity cache
//!
//! This module contains the pure data types and port contracts: no
//! locks, no I/O.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{FetchError, FetchResult, FormatError, InvalidFlagError};
