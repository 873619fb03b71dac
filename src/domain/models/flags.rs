//! Fixed-width bit-flag containers tagged with a logical domain.
//!
//! Every boolean-attribute set on the wire is one integer whose bits
//! are named flags. [`FlagSet`] wraps that integer with value
//! semantics: `with`/`without` return a new set, and bits the crate
//! does not know about survive a decode-encode round trip untouched,
//! which keeps the type forward compatible with undocumented flags.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::errors::InvalidFlagError;

/// Marker trait naming a logical flag domain.
///
/// Implementors are zero-sized tags ("message flags", "role
/// permissions") that keep sets from different domains from mixing at
/// compile time.
pub trait FlagDomain {
    /// Number of meaningful bits on the wire; at most 64.
    const WIDTH: u32 = 64;
}

/// A single named flag: one bit offset within a domain.
pub struct Flag<D> {
    mask: u64,
    offset: u32,
    _domain: PhantomData<D>,
}

impl<D> Clone for Flag<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Flag<D> {}

impl<D> fmt::Debug for Flag<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag").field("offset", &self.offset).finish()
    }
}

impl<D: FlagDomain> Flag<D> {
    /// Define a flag at a bit offset within the domain.
    ///
    /// Fails with [`InvalidFlagError`] when the offset does not fit the
    /// domain's declared width (or the domain declares more than 64
    /// bits). This is a definition-time configuration check.
    pub fn new(offset: u32) -> Result<Self, InvalidFlagError> {
        if D::WIDTH > 64 || offset >= D::WIDTH {
            return Err(InvalidFlagError {
                offset,
                width: D::WIDTH,
            });
        }
        Ok(Self {
            mask: 1 << offset,
            offset,
            _domain: PhantomData,
        })
    }

    /// The bit offset this flag was defined at.
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.offset
    }
}

/// An immutable set of named flags over a single integer.
pub struct FlagSet<D> {
    bits: u64,
    _domain: PhantomData<D>,
}

impl<D> FlagSet<D> {
    /// Wrap a raw integer as-is; unknown bits are preserved, never
    /// rejected.
    #[must_use]
    pub const fn from_raw(bits: u64) -> Self {
        Self {
            bits,
            _domain: PhantomData,
        }
    }

    /// An empty set (no bits set).
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_raw(0)
    }

    /// The wrapped integer, bit-exact with what was decoded.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.bits
    }

    /// Whether no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Bitwise membership test for a named flag.
    #[must_use]
    pub const fn has(self, flag: Flag<D>) -> bool {
        self.bits & flag.mask != 0
    }

    /// A new set with the flag's bit set; `self` is unchanged.
    #[must_use]
    pub const fn with(self, flag: Flag<D>) -> Self {
        Self::from_raw(self.bits | flag.mask)
    }

    /// A new set with the flag's bit cleared; `self` is unchanged.
    #[must_use]
    pub const fn without(self, flag: Flag<D>) -> Self {
        Self::from_raw(self.bits & !flag.mask)
    }
}

// Manual impls keep the derives from demanding bounds on the phantom
// domain parameter.

impl<D> Clone for FlagSet<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for FlagSet<D> {}

impl<D> Default for FlagSet<D> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<D> PartialEq for FlagSet<D> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<D> Eq for FlagSet<D> {}

impl<D> Hash for FlagSet<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<D> fmt::Debug for FlagSet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagSet({:#b})", self.bits)
    }
}

impl<D> Serialize for FlagSet<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits)
    }
}

impl<'de, D> Deserialize<'de> for FlagSet<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        u64::deserialize(deserializer).map(Self::from_raw)
    }
}
