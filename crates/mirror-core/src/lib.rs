//! Core of the `mirror` runtime type-introspection engine.
//!
//! This crate provides the type system: deterministic type identity
//! ([`TypeHash`]), runtime descriptors ([`TypeInfo`]) interned by a
//! process-wide [`TypeRegistry`], call-slot descriptions ([`Argument`]) with
//! the central compatibility test, operation signatures ([`Function`]) and
//! ambiguity-free overload sets ([`Overloads`]), and the type-erased
//! [`Value`] container with its runtime access discipline.
//!
//! Distinctions a static type system enforces at compile time (mutability,
//! reference category, convertibility) are carried here as runtime tags and
//! re-checked at every access. The policy lives in one place,
//! [`Argument::test`], and is reused by the overload resolver, the value
//! container, and downstream consumers such as the JSON decoder.
//!
//! # Quick start
//!
//! ```
//! use mirror_core::{type_of, Value};
//!
//! let mut list = Value::own(Vec::<i64>::new());
//! list.call("push", vec![Value::own(42i64)]).unwrap();
//! assert_eq!(list.get::<Vec<i64>>().as_slice(), &[42]);
//!
//! let ty = type_of::<Vec<i64>>();
//! assert_eq!(ty.name(), "list<int>");
//! ```

mod argument;
mod error;
mod function;
mod overloads;
mod reflect;
mod registry;
mod type_hash;
mod type_info;
mod value;

pub use argument::{Argument, Match, RefKind};
pub use error::{AccessError, CallError, ReflectError, RegistrationError};
pub use function::{signature, signature_of, Function, NativeFn};
pub use overloads::Overloads;
pub use reflect::Reflect;
pub use registry::{lookup, type_of, TypeRegistry};
pub use type_hash::TypeHash;
pub use type_info::{Conversion, MemberTable, ParentLink, TypeBuilder, TypeInfo, TypeTraits};
pub use value::Value;
