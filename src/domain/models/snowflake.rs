//! Platform-assigned 64-bit identifier with an embedded creation time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::errors::FormatError;

/// Milliseconds between the Unix epoch and the platform epoch
/// (2015-01-01T00:00:00Z).
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

/// Low bits carrying opaque worker/process/sequence data.
const TIMESTAMP_SHIFT: u32 = 22;

/// A platform-assigned 64-bit identifier.
///
/// The high 42 bits hold milliseconds since the platform epoch; the low
/// 22 bits are generator data this crate does not interpret. Equality
/// and ordering are defined purely on the integer value, so sorting
/// approximates creation order (not guaranteed monotonic across
/// distributed generators).
///
/// On the wire an identifier travels as a base-10 string, since 64-bit
/// integers lose precision in ecosystems with narrower number types.
/// Deserialization accepts either a string or a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Wrap a raw 64-bit value as an identifier.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The underlying integer value; exact round trip with [`from_raw`](Self::from_raw).
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Parse a base-10 string into an identifier.
    ///
    /// Rejects empty input, signs, non-digit characters, and values
    /// that do not fit in 64 bits.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError {
                input: input.to_string(),
            });
        }
        input
            .parse::<u64>()
            .map(Self)
            .map_err(|_| FormatError {
                input: input.to_string(),
            })
    }

    /// Milliseconds since the Unix epoch at which this identifier was
    /// generated.
    #[must_use]
    pub const fn timestamp_millis(self) -> u64 {
        (self.0 >> TIMESTAMP_SHIFT) + PLATFORM_EPOCH_MS
    }

    /// The creation time embedded in the identifier.
    ///
    /// Pure and total: every representable identifier maps to a valid
    /// timestamp (the 42-bit millisecond range ends in the year 2154,
    /// well inside chrono's range).
    #[must_use]
    pub fn timestamp(self) -> DateTime<Utc> {
        #[allow(clippy::cast_possible_wrap)]
        let millis = self.timestamp_millis() as i64;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .expect("42-bit snowflake timestamp is always within chrono range")
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for Snowflake {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl TryFrom<i64> for Snowflake {
    type Error = FormatError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        u64::try_from(raw)
            .map(Self)
            .map_err(|_| FormatError {
                input: raw.to_string(),
            })
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct SnowflakeVisitor;

impl Visitor<'_> for SnowflakeVisitor {
    type Value = Snowflake;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a base-10 identifier string or a non-negative integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Snowflake::parse(v).map_err(|err| E::custom(err))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Snowflake::from_raw(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Snowflake::try_from(v).map_err(|err| E::custom(err))
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SnowflakeVisitor)
    }
}
