//! Type-directed JSON decoder.
//!
//! Consumes a token stream and populates a destination [`Value`], recursing
//! by nesting depth and dispatching on token kind against the destination's
//! declared kind. Compound destinations are driven through their member
//! tables: list append and record member assignment both resolve through
//! the overload compatibility rules, so the decoder enforces the same
//! policy as any other caller.
//!
//! # Example
//!
//! ```
//! use mirror_core::type_of;
//! use mirror_json::parse;
//!
//! let value = parse(type_of::<Vec<i64>>(), "[1, 2, 3]").unwrap();
//! assert_eq!(value.get::<Vec<i64>>().as_slice(), &[1, 2, 3]);
//! ```

use mirror_core::{TypeInfo, Value};

use crate::error::DecodeError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Decode `text` into a fresh value of type `ty`.
///
/// Fails before any decoding occurs if `ty` lacks the construction
/// capability.
pub fn parse(ty: &'static TypeInfo, text: &str) -> Result<Value, DecodeError> {
    let mut value = ty.construct()?;
    parse_into(&mut value, text)?;
    Ok(value)
}

/// Decode `text` into an existing destination value.
///
/// On error the destination's already-assigned portions are unspecified;
/// discard a partially-decoded value.
pub fn parse_into(value: &mut Value, text: &str) -> Result<(), DecodeError> {
    let mut decoder = Decoder {
        lexer: Lexer::new(text),
    };
    let token = decoder.lexer.next_token()?;
    decoder.parse_value(value, token)
}

struct Decoder<'src> {
    lexer: Lexer<'src>,
}

impl Decoder<'_> {
    fn parse_value(&mut self, dest: &mut Value, token: Token) -> Result<(), DecodeError> {
        match token.kind {
            TokenKind::Null => parse_null(dest),
            TokenKind::Bool => parse_bool(dest, &token),
            TokenKind::Number => parse_number(dest, token),
            TokenKind::String => parse_string(dest, token),
            TokenKind::ArrayStart => self.parse_array(dest),
            TokenKind::ObjectStart => self.parse_object(dest),
            kind => Err(DecodeError::UnknownToken {
                kind,
                context: "value",
            }),
        }
    }

    fn parse_array(&mut self, dest: &mut Value) -> Result<(), DecodeError> {
        let ty = dest.ty();
        let element = match ty.contained() {
            Some(element) if ty.is_list() => element,
            _ => {
                return Err(DecodeError::TypeMismatch {
                    expected: "list",
                    found: "array".to_string(),
                    ty: ty.name(),
                });
            }
        };

        let mut token = self.lexer.next_token()?;
        if token.kind == TokenKind::ArrayEnd {
            return Ok(());
        }

        loop {
            let mut item = element.construct()?;
            self.parse_value(&mut item, token)?;
            dest.call("push", vec![item])?;

            token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::Separator => token = self.lexer.next_token()?,
                TokenKind::ArrayEnd => return Ok(()),
                kind => {
                    return Err(DecodeError::UnknownToken {
                        kind,
                        context: "array",
                    });
                }
            }
        }
    }

    /// Record decode: member-name/value pairs until `ObjectEnd`. Each key
    /// must name a settable member (with parent fallback); the member's
    /// value-slot type is default-constructed, decoded into, and assigned
    /// through the resolved setter. Duplicate keys decode again and the last
    /// assignment wins.
    fn parse_object(&mut self, dest: &mut Value) -> Result<(), DecodeError> {
        let ty = dest.ty();
        if ty.is_primitive() || ty.is_list() || ty.is_string() {
            return Err(DecodeError::TypeMismatch {
                expected: "record",
                found: "object".to_string(),
                ty: ty.name(),
            });
        }

        let mut token = self.lexer.next_token()?;
        if token.kind == TokenKind::ObjectEnd {
            return Ok(());
        }

        loop {
            if token.kind != TokenKind::String {
                return Err(DecodeError::UnknownToken {
                    kind: token.kind,
                    context: "member name",
                });
            }
            let key = token.text;

            let separator = self.lexer.next_token()?;
            if separator.kind != TokenKind::Separator {
                return Err(DecodeError::UnknownToken {
                    kind: separator.kind,
                    context: "member separator",
                });
            }

            let slot = settable_member(ty, &key)?;
            let mut member = slot.construct()?;
            let value_token = self.lexer.next_token()?;
            self.parse_value(&mut member, value_token)?;
            dest.call(&key, vec![member])?;

            token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::Separator => token = self.lexer.next_token()?,
                TokenKind::ObjectEnd => return Ok(()),
                kind => {
                    return Err(DecodeError::UnknownToken {
                        kind,
                        context: "object",
                    });
                }
            }
        }
    }
}

fn parse_null(dest: &mut Value) -> Result<(), DecodeError> {
    if !dest.ty().is_nullable() {
        return Err(DecodeError::TypeMismatch {
            expected: "nullable",
            found: "null".to_string(),
            ty: dest.ty().name(),
        });
    }
    dest.set_null()?;
    Ok(())
}

fn parse_bool(dest: &mut Value, token: &Token) -> Result<(), DecodeError> {
    if !dest.ty().is_boolean() {
        return Err(DecodeError::TypeMismatch {
            expected: "bool",
            found: token.bool_value.to_string(),
            ty: dest.ty().name(),
        });
    }
    dest.assign(token.bool_value)?;
    Ok(())
}

fn parse_number(dest: &mut Value, token: Token) -> Result<(), DecodeError> {
    let ty = dest.ty();
    if ty.is_integer() {
        dest.assign(token.int_value)?;
    } else if ty.is_float() {
        dest.assign(token.float_value)?;
    } else {
        return Err(DecodeError::TypeMismatch {
            expected: "number",
            found: token.text,
            ty: ty.name(),
        });
    }
    Ok(())
}

fn parse_string(dest: &mut Value, token: Token) -> Result<(), DecodeError> {
    if !dest.ty().is_string() {
        return Err(DecodeError::TypeMismatch {
            expected: "string",
            found: token.text,
            ty: dest.ty().name(),
        });
    }
    dest.assign(token.text)?;
    Ok(())
}

/// The value-slot type of the settable overload for `key`: the two-parameter
/// candidate's second parameter (receiver, then value).
fn settable_member(ty: &'static TypeInfo, key: &str) -> Result<&'static TypeInfo, DecodeError> {
    let missing = || DecodeError::TypeMismatch {
        expected: "settable",
        found: format!("member <{key}>"),
        ty: ty.name(),
    };
    let overloads = ty.member(key).ok_or_else(missing)?;
    overloads
        .members()
        .iter()
        .find(|member| member.params().len() == 2)
        .map(|member| member.params()[1].ty())
        .ok_or_else(missing)
}
