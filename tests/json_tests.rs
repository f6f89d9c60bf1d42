//! Tests for the type-directed JSON decoder.

mod common;

use common::{Account, Portfolio, Shape, Square};
use mirror::json::{parse, parse_into, DecodeError};
use mirror::{type_of, Value};

#[test]
fn scalars_decode_into_matching_kinds() {
    assert_eq!(*parse(type_of::<i64>(), "42").unwrap().get::<i64>(), 42);
    assert_eq!(*parse(type_of::<i64>(), "-7").unwrap().get::<i64>(), -7);
    assert_eq!(*parse(type_of::<f64>(), "2.5").unwrap().get::<f64>(), 2.5);
    assert!(*parse(type_of::<bool>(), "true").unwrap().get::<bool>());
    assert_eq!(
        parse(type_of::<String>(), "\"hello\"").unwrap().get::<String>(),
        "hello"
    );
}

#[test]
fn scalar_kind_mismatches() {
    assert!(matches!(
        parse(type_of::<String>(), "42").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
    assert!(matches!(
        parse(type_of::<i64>(), "\"42\"").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
    assert!(matches!(
        parse(type_of::<i64>(), "true").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
    assert!(matches!(
        parse(type_of::<bool>(), "1").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
}

#[test]
fn number_representation_follows_the_destination() {
    // the token carries both payloads; the declared kind picks one
    assert_eq!(*parse(type_of::<f64>(), "42").unwrap().get::<f64>(), 42.0);
    assert_eq!(*parse(type_of::<i64>(), "2.9").unwrap().get::<i64>(), 2);
}

#[test]
fn null_requires_a_nullable_destination() {
    assert!(matches!(
        parse(type_of::<i64>(), "null").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));

    let value = parse(type_of::<Option<i64>>(), "null").unwrap();
    assert_eq!(*value.get::<Option<i64>>(), None);
}

#[test]
fn lists_decode_element_by_element() {
    let value = parse(type_of::<Vec<i64>>(), "[1, 2, 3]").unwrap();
    assert_eq!(value.get::<Vec<i64>>().as_slice(), &[1, 2, 3]);

    let empty = parse(type_of::<Vec<i64>>(), "[]").unwrap();
    assert!(empty.get::<Vec<i64>>().is_empty());
}

#[test]
fn nested_lists() {
    let value = parse(type_of::<Vec<Vec<i64>>>(), "[[1], [2, 3], []]").unwrap();
    assert_eq!(
        value.get::<Vec<Vec<i64>>>(),
        &vec![vec![1], vec![2, 3], vec![]]
    );
}

#[test]
fn list_element_mismatch_aborts() {
    let err = parse(type_of::<Vec<i64>>(), "[1, \"two\"]").unwrap_err();
    assert!(matches!(err, DecodeError::TypeMismatch { .. }));
}

#[test]
fn array_into_non_list_is_a_mismatch() {
    let err = parse(type_of::<i64>(), "[1]").unwrap_err();
    assert!(matches!(err, DecodeError::TypeMismatch { .. }));
}

#[test]
fn record_decodes_member_by_member() {
    let text = r#"{
        "owner": "ada",
        "balance": 10,
        "rate": 0.5,
        "active": true,
        "history": [1, 2, 3]
    }"#;
    let value = parse(type_of::<Account>(), text).unwrap();
    let account = value.get::<Account>();
    assert_eq!(account.owner, "ada");
    assert_eq!(account.balance, 10);
    assert_eq!(account.rate, 0.5);
    assert!(account.active);
    assert_eq!(account.history, vec![1, 2, 3]);
}

#[test]
fn empty_record() {
    let value = parse(type_of::<Account>(), "{}").unwrap();
    assert_eq!(value.get::<Account>(), &Account::default());
}

#[test]
fn record_duplicate_key_last_wins() {
    let value = parse(type_of::<Account>(), r#"{"balance": 1, "balance": 2}"#).unwrap();
    assert_eq!(value.get::<Account>().balance, 2);
}

#[test]
fn record_unknown_member_is_a_mismatch() {
    let err = parse(type_of::<Account>(), r#"{"iban": "x"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::TypeMismatch { .. }));
}

#[test]
fn record_members_resolve_through_the_parent_chain() {
    let value = parse(type_of::<Square>(), r#"{"width": 4, "side": 5}"#).unwrap();
    let square = value.get::<Square>();
    assert_eq!(square.rect.width, 4);
    assert_eq!(square.side, 5);
}

#[test]
fn nested_records_and_record_lists() {
    let text = r#"{
        "primary": {"owner": "ada", "balance": 1},
        "accounts": [
            {"owner": "grace", "balance": 2},
            {"owner": "edsger", "balance": 3}
        ]
    }"#;
    let value = parse(type_of::<Portfolio>(), text).unwrap();
    let portfolio = value.get::<Portfolio>();
    assert_eq!(portfolio.primary.owner, "ada");
    assert_eq!(portfolio.accounts.len(), 2);
    assert_eq!(portfolio.accounts[1].owner, "edsger");
    assert_eq!(portfolio.accounts[1].balance, 3);
}

#[test]
fn object_into_scalar_or_list_is_a_mismatch() {
    assert!(matches!(
        parse(type_of::<i64>(), "{}").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
    assert!(matches!(
        parse(type_of::<String>(), "{}").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
    assert!(matches!(
        parse(type_of::<Vec<i64>>(), "{}").unwrap_err(),
        DecodeError::TypeMismatch { .. }
    ));
}

#[test]
fn parse_into_an_existing_value() {
    let mut value = Value::own(0i64);
    parse_into(&mut value, "42").unwrap();
    assert_eq!(*value.get::<i64>(), 42);
}

#[test]
fn parse_rejects_non_constructible_types_before_decoding() {
    // Shape carries no construction capability at all
    let err = parse(type_of::<Shape>(), "{}").unwrap_err();
    assert!(matches!(err, DecodeError::Access(_)));
}

#[test]
fn stray_tokens_are_unknown() {
    assert!(matches!(
        parse(type_of::<i64>(), ",").unwrap_err(),
        DecodeError::UnknownToken { .. }
    ));
    assert!(matches!(
        parse(type_of::<Vec<i64>>(), "[1 2]").unwrap_err(),
        DecodeError::UnknownToken { .. }
    ));
    assert!(matches!(
        parse(type_of::<Account>(), "{1: 2}").unwrap_err(),
        DecodeError::UnknownToken { .. }
    ));
    assert!(matches!(
        parse(type_of::<Account>(), r#"{"balance" 2}"#).unwrap_err(),
        DecodeError::UnknownToken { .. }
    ));
}

#[test]
fn malformed_text_is_a_lex_error() {
    assert!(matches!(
        parse(type_of::<String>(), "\"unterminated").unwrap_err(),
        DecodeError::Lex(_)
    ));
    assert!(matches!(
        parse(type_of::<i64>(), "nul").unwrap_err(),
        DecodeError::Lex(_)
    ));
}
