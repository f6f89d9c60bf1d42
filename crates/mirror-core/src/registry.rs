//! Process-wide type registry.
//!
//! The registry is a lazily-populated, append-only cache from type identity
//! to interned descriptor. A descriptor is built exactly once per kind (the
//! first [`type_of`] request wins) and is immutable afterwards, so every
//! subsequent read only touches the map lock. Entries live for the process
//! lifetime and are torn down only at process exit.
//!
//! Concurrent first-use is serialized by a mutex: descriptors are built
//! outside the lock (describing a type may recursively request its parent,
//! element, or member slot types) and interned under it; a racing builder's
//! duplicate is discarded.
//!
//! # Example
//!
//! ```
//! use mirror_core::{lookup, type_of};
//!
//! let int = type_of::<i64>();
//! assert_eq!(int.name(), "int");
//!
//! // Idempotent: same interned descriptor every time.
//! assert!(std::ptr::eq(int, type_of::<i64>()));
//!
//! // Interned descriptors are also reachable by identifier.
//! assert!(std::ptr::eq(int, lookup("int").unwrap()));
//! ```

use std::sync::Mutex;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::reflect::Reflect;
use crate::type_hash::TypeHash;
use crate::type_info::TypeInfo;
use crate::value::Value;

#[derive(Default)]
struct State {
    by_hash: FxHashMap<TypeHash, &'static TypeInfo>,
    by_name: FxHashMap<&'static str, &'static TypeInfo>,
}

/// Process-wide cache of type descriptors keyed by identity.
pub struct TypeRegistry {
    state: Mutex<State>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// The process-wide registry, with the built-in types pre-seeded.
    pub fn global() -> &'static TypeRegistry {
        &REGISTRY
    }

    /// The descriptor for kind `T`: created on first request, memoized,
    /// idempotent.
    ///
    /// Registration runs in two phases: the shell is interned first, then
    /// the deferred member table is populated: member signatures may
    /// reference the receiver type, which resolves to the interned shell. A
    /// descriptor requested during its own member population is therefore
    /// visible with an empty member table until the populating call returns.
    ///
    /// # Panics
    ///
    /// Panics if the type's declared member table violates the no-ambiguity
    /// invariant; a descriptor is a compile-time artifact and an ambiguous
    /// one cannot be registered.
    pub fn type_of<T: Reflect>(&self) -> &'static TypeInfo {
        let hash = T::type_hash();
        if let Some(&entry) = self.state.lock().unwrap().by_hash.get(&hash) {
            return entry;
        }

        // Build outside the lock; T::describe() may recursively request
        // other descriptors.
        let (shell, populate) = T::describe().into_parts();

        let interned = {
            let mut state = self.state.lock().unwrap();
            if let Some(&entry) = state.by_hash.get(&hash) {
                // A racing first-use got there first; its descriptor stands.
                return entry;
            }
            let interned: &'static TypeInfo = Box::leak(Box::new(shell));
            state.by_hash.insert(hash, interned);
            state.by_name.insert(interned.name(), interned);
            interned
        };

        if let Some(populate) = populate {
            match populate() {
                Ok(members) => interned.install_members(members),
                Err(err) => panic!("member registration for <{}> failed: {err}", interned.name()),
            }
        }
        interned
    }

    /// The memoized descriptor for an identifier, if one has been interned.
    pub fn get(&self, name: &str) -> Option<&'static TypeInfo> {
        self.state.lock().unwrap().by_name.get(name).copied()
    }

    /// The memoized descriptor for an identity hash.
    pub fn get_by_hash(&self, hash: TypeHash) -> Option<&'static TypeInfo> {
        self.state.lock().unwrap().by_hash.get(&hash).copied()
    }

    /// Whether a descriptor with that identifier has been interned.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of interned descriptors.
    pub fn type_count(&self) -> usize {
        self.state.lock().unwrap().by_hash.len()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_count())
            .finish()
    }
}

lazy_static! {
    static ref REGISTRY: TypeRegistry = {
        let registry = TypeRegistry::new();
        registry.type_of::<()>();
        registry.type_of::<bool>();
        registry.type_of::<i64>();
        registry.type_of::<f64>();
        registry.type_of::<String>();
        registry.type_of::<Value>();
        registry
    };
}

/// The interned descriptor for kind `T` (created on first use).
pub fn type_of<T: Reflect>() -> &'static TypeInfo {
    TypeRegistry::global().type_of::<T>()
}

/// The interned descriptor for an identifier.
pub fn lookup(name: &str) -> Option<&'static TypeInfo> {
    TypeRegistry::global().get(name)
}
