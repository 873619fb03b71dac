//! Error types for the cache and resolution layer.

use thiserror::Error;

/// Malformed identifier input.
///
/// Returned by [`Snowflake::parse`](crate::domain::models::Snowflake::parse)
/// when the input is not a base-10 value representable in 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed identifier: {input:?}")]
pub struct FormatError {
    /// The rejected input, verbatim.
    pub input: String,
}

/// A named flag was defined with a bit offset outside its domain width.
///
/// This is a configuration error caught at flag definition time, not a
/// runtime condition callers recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("flag offset {offset} out of range for {width}-bit flag domain")]
pub struct InvalidFlagError {
    /// The offending bit offset.
    pub offset: u32,
    /// The domain's declared bit width.
    pub width: u32,
}

/// Failure modes reported by the transport-side fetch operation.
///
/// The resolver treats every variant uniformly as "fetch failed": the
/// outcome is delivered to all current waiters and nothing is written
/// to the cache. Retry and backoff policy belong to the transport
/// collaborator, never to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The entity does not exist on the platform.
    #[error("entity not found")]
    NotFound,

    /// The platform refused the request due to rate limiting.
    #[error("rate limited by platform")]
    RateLimited,

    /// The request failed at the transport level.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
