//! `mirror`: a runtime type-introspection engine.
//!
//! A registry of type descriptors, a type-erased value container that tracks
//! ownership and mutability at runtime, a function-overload resolver, and a
//! JSON-driven value populator built on top of those primitives.
//!
//! This crate is a facade: the type system lives in `mirror-core` and the
//! JSON front-end in `mirror-json`.
//!
//! # Quick start
//!
//! ```
//! use mirror::{type_of, Value};
//!
//! // Type-erased values with runtime access discipline.
//! let mut value = Value::own(41i64);
//! *value.cast_mut::<i64>().unwrap() += 1;
//! assert_eq!(*value.get::<i64>(), 42);
//!
//! // Type-directed JSON decoding.
//! let list = mirror::json::parse(type_of::<Vec<i64>>(), "[1, 2, 3]").unwrap();
//! assert_eq!(list.get::<Vec<i64>>().as_slice(), &[1, 2, 3]);
//! ```

pub use mirror_core::{
    lookup, signature, signature_of, type_of, AccessError, Argument, CallError, Conversion,
    Function, Match, MemberTable, NativeFn, Overloads, ParentLink, Reflect, ReflectError, RefKind,
    RegistrationError, TypeBuilder, TypeHash, TypeInfo, TypeRegistry, TypeTraits, Value,
};

/// JSON token stream and type-directed decoder.
pub mod json {
    pub use mirror_json::{parse, parse_into, DecodeError, LexError, Lexer, Token, TokenKind};
}
