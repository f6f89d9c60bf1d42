//! Error types for JSON tokenization and decoding.

use thiserror::Error;

use mirror_core::{AccessError, CallError};

use crate::token::TokenKind;

/// Errors that occur while tokenizing JSON text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// A string literal was not properly terminated.
    #[error("unterminated string at offset {offset}")]
    UnterminatedString { offset: usize },

    /// An invalid escape sequence inside a string literal.
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    /// A numeric literal could not be parsed.
    #[error("invalid number at offset {offset}: {detail}")]
    InvalidNumber { offset: usize, detail: String },
}

/// Errors that abort a decode.
///
/// A decode error leaves the destination's already-assigned portions
/// unspecified; discard a partially-decoded value on error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The token kind disagrees with the destination's declared kind.
    #[error("can't assign {found} to non-{expected} type <{ty}>")]
    TypeMismatch {
        expected: &'static str,
        found: String,
        ty: &'static str,
    },

    /// A token kind illegal in the current decoder state.
    #[error("unknown token {kind:?} while parsing {context}")]
    UnknownToken {
        kind: TokenKind,
        context: &'static str,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Call(#[from] CallError),
}
