//! JSON front-end for the `mirror` reflection engine.
//!
//! Provides the token stream ([`Lexer`], [`Token`]) and the type-directed
//! decoder ([`parse`], [`parse_into`]) that populates reflected values from
//! JSON text. All type checking is driven by the destination's descriptor;
//! compound assignments resolve through member overload compatibility.
//!
//! ```
//! use mirror_core::type_of;
//! use mirror_json::parse;
//!
//! let value = parse(type_of::<i64>(), "42").unwrap();
//! assert_eq!(*value.get::<i64>(), 42);
//! ```

mod decoder;
mod error;
mod lexer;
mod token;

pub use decoder::{parse, parse_into};
pub use error::{DecodeError, LexError};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
