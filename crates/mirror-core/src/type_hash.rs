//! Deterministic hash-based type identity.
//!
//! This module provides [`TypeHash`], a 64-bit hash that uniquely identifies a
//! registered type. Hashes are computed deterministically from the type's
//! identifier, enabling:
//!
//! - Forward references (hash computed before the descriptor exists)
//! - No registration order dependencies
//! - Same identifier = same hash, process-wide
//!
//! # Examples
//!
//! ```
//! use mirror_core::TypeHash;
//!
//! let hash1 = TypeHash::from_name("int");
//! let hash2 = TypeHash::from_name("int");
//! assert_eq!(hash1, hash2);
//!
//! assert_ne!(TypeHash::from_name("int"), TypeHash::from_name("float"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain marker mixed into every type hash so that type identities can never
/// collide with other hashed entities sharing the same spelling.
const TYPE_DOMAIN: u64 = 0x2fac10b63a6cc57c;

/// A deterministic 64-bit hash identifying a registered type.
///
/// Computed from the type's identifier. The same input always produces the
/// same hash, so a `TypeHash` can be derived before the descriptor has been
/// interned in the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type identifier.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(TYPE_DOMAIN ^ xxh64(name.as_bytes(), 0))
    }

    /// Raw hash value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(TypeHash::from_name("int"), TypeHash::from_name("int"));
        assert_eq!(
            TypeHash::from_name("list<int>"),
            TypeHash::from_name("list<int>")
        );
    }

    #[test]
    fn distinct_names_distinct_hashes() {
        assert_ne!(TypeHash::from_name("int"), TypeHash::from_name("float"));
        assert_ne!(TypeHash::from_name("int"), TypeHash::from_name("Int"));
    }

    #[test]
    fn never_empty() {
        assert_ne!(TypeHash::from_name("void"), TypeHash::EMPTY);
    }
}
