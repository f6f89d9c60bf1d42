//! The kind-tag trait for registrable types.
//!
//! [`Reflect`] ties a concrete Rust type to its runtime identity (name and
//! [`TypeHash`]) and to the descriptor built on first use. It is the
//! construct-on-first-use hook: the registry calls [`Reflect::describe`] the
//! first time a kind is requested and interns the result.
//!
//! # Built-in types
//!
//! - `()`: "void", the no-result type; no capabilities.
//! - `bool` / `i64` / `f64` / `String`: "bool" / "int" / "float" /
//!   "string". All integer and float widths collapse onto `i64`/`f64`.
//! - `Vec<T>`: "list<T>", with a contained element type and a `push`
//!   member.
//! - `Option<T>`: "nullable<T>", accepting null assignment.
//! - `Value`: "dynamic", the universal dynamic-value type (defined next to
//!   the container).
//!
//! # Example
//!
//! ```
//! use mirror_core::{Reflect, TypeBuilder, TypeTraits};
//!
//! #[derive(Clone, Default)]
//! struct Vault { sealed: bool }
//!
//! impl Reflect for Vault {
//!     fn type_name() -> &'static str { "Vault" }
//!     fn describe() -> TypeBuilder<Vault> {
//!         TypeBuilder::new(TypeTraits::empty())
//!             .constructible()
//!             .duplicable()
//!     }
//! }
//! ```

use std::any::TypeId;
use std::sync::Mutex;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::argument::Argument;
use crate::function::{Function, NativeFn};
use crate::type_hash::TypeHash;
use crate::type_info::{TypeBuilder, TypeTraits};
use crate::value::Value;

/// Trait for types that can be registered with the reflection engine.
///
/// Provides the identity the registry keys on and the descriptor it interns
/// on first use.
pub trait Reflect: Sized + 'static {
    /// The type's globally unique identifier.
    fn type_name() -> &'static str;

    /// The type's identity hash, derived from the identifier.
    fn type_hash() -> TypeHash {
        TypeHash::from_name(Self::type_name())
    }

    /// Declare the descriptor for this type. Called once per process by the
    /// registry; never call it directly, go through
    /// [`type_of`](crate::type_of).
    fn describe() -> TypeBuilder<Self>;
}

/// Intern a computed name for a generic instantiation.
///
/// Statics inside generic functions are shared across instantiations, so
/// names for `Vec<T>`/`Option<T>` are memoized in one map keyed by `TypeId`.
fn interned_name<T: 'static>(make: impl FnOnce() -> String) -> &'static str {
    lazy_static! {
        static ref NAMES: Mutex<FxHashMap<TypeId, &'static str>> =
            Mutex::new(FxHashMap::default());
    }
    let mut names = NAMES.lock().unwrap();
    *names
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::leak(make().into_boxed_str()))
}

// === Primitive implementations ===

impl Reflect for () {
    fn type_name() -> &'static str {
        "void"
    }

    fn describe() -> TypeBuilder<()> {
        TypeBuilder::new(TypeTraits::VOID)
    }
}

impl Reflect for bool {
    fn type_name() -> &'static str {
        "bool"
    }

    fn describe() -> TypeBuilder<bool> {
        TypeBuilder::new(TypeTraits::BOOLEAN)
            .constructible()
            .duplicable()
            .transferable()
    }
}

impl Reflect for i64 {
    fn type_name() -> &'static str {
        "int"
    }

    fn describe() -> TypeBuilder<i64> {
        TypeBuilder::new(TypeTraits::INTEGER)
            .constructible()
            .duplicable()
            .transferable()
    }
}

impl Reflect for f64 {
    fn type_name() -> &'static str {
        "float"
    }

    fn describe() -> TypeBuilder<f64> {
        TypeBuilder::new(TypeTraits::FLOAT)
            .constructible()
            .duplicable()
            .transferable()
    }
}

impl Reflect for String {
    fn type_name() -> &'static str {
        "string"
    }

    fn describe() -> TypeBuilder<String> {
        TypeBuilder::new(TypeTraits::STRING)
            .constructible()
            .duplicable()
            .transferable()
    }
}

// === Containers ===

impl<T: Reflect + Clone> Reflect for Vec<T> {
    fn type_name() -> &'static str {
        interned_name::<Vec<T>>(|| format!("list<{}>", T::type_name()))
    }

    fn describe() -> TypeBuilder<Vec<T>> {
        TypeBuilder::new(TypeTraits::LIST)
            .constructible()
            .duplicable()
            .transferable()
            .contains::<T>()
            .members(|table| table.add(push_member::<T>()))
    }
}

/// The list append member: `void push(list &persistent, T)`.
///
/// Consumes the supplied element, so element types must carry the transfer
/// capability.
fn push_member<T: Reflect + Clone>() -> Function {
    Function::new(
        "push",
        Argument::owned::<()>(),
        vec![Argument::persistent::<Vec<T>>(), Argument::owned::<T>()],
    )
    .with_callable(NativeFn::new(|args: &mut [Value]| {
        let (receiver, rest) = args.split_at_mut(1);
        let item = rest[0].take::<T>()?.into_concrete::<T>()?;
        receiver[0].cast_mut::<Vec<T>>()?.push(item);
        Ok(Value::new())
    }))
}

impl<T: Reflect + Clone> Reflect for Option<T> {
    fn type_name() -> &'static str {
        interned_name::<Option<T>>(|| format!("nullable<{}>", T::type_name()))
    }

    fn describe() -> TypeBuilder<Option<T>> {
        TypeBuilder::new(TypeTraits::empty())
            .constructible()
            .duplicable()
            .transferable()
            .nullable(|slot| *slot = None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::type_of;

    #[test]
    fn primitive_identities() {
        assert_eq!(<()>::type_name(), "void");
        assert_eq!(bool::type_name(), "bool");
        assert_eq!(i64::type_name(), "int");
        assert_eq!(f64::type_name(), "float");
        assert_eq!(String::type_name(), "string");
        assert_eq!(Value::type_name(), "dynamic");
    }

    #[test]
    fn hashes_follow_names() {
        assert_eq!(i64::type_hash(), TypeHash::from_name("int"));
        assert_ne!(i64::type_hash(), f64::type_hash());
    }

    #[test]
    fn generic_names_are_stable() {
        assert_eq!(<Vec<i64>>::type_name(), "list<int>");
        assert_eq!(<Vec<i64>>::type_name(), <Vec<i64>>::type_name());
        assert_eq!(<Vec<Vec<i64>>>::type_name(), "list<list<int>>");
        assert_eq!(<Option<i64>>::type_name(), "nullable<int>");
    }

    #[test]
    fn nullable_descriptor() {
        let ty = type_of::<Option<i64>>();
        assert!(ty.is_nullable());
        assert!(ty.is_constructible());
        assert!(!ty.is_list());
    }
}
