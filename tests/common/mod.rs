//! Shared fixture types for the integration tests.
//!
//! A small single-inheritance hierarchy (`Shape` <- `Rect` <- `Square`), a
//! conversion-only type (`Blueprint`), and two record types for decoding
//! (`Account`, `Portfolio`).

#![allow(dead_code)]

use mirror::{Argument, Function, NativeFn, Reflect, TypeBuilder, TypeTraits, Value};

/// Abstract marker base: registered with no capabilities at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape;

impl Reflect for Shape {
    fn type_name() -> &'static str {
        "Shape"
    }

    fn describe() -> TypeBuilder<Shape> {
        TypeBuilder::new(TypeTraits::empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rect {
    pub shape: Shape,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            shape: Shape,
            width,
            height,
        }
    }
}

impl Reflect for Rect {
    fn type_name() -> &'static str {
        "Rect"
    }

    fn describe() -> TypeBuilder<Rect> {
        TypeBuilder::new(TypeTraits::empty())
            .constructible()
            .duplicable()
            .transferable()
            .parent::<Shape>(|r: &Rect| &r.shape, |r: &mut Rect| &mut r.shape)
            .members(|table| {
                table.field("width", |r: &Rect| &r.width, |r, v| r.width = v)?;
                table.field("height", |r: &Rect| &r.height, |r, v| r.height = v)?;
                table.add(resize_member())
            })
    }
}

/// A two-argument custom member: `void resize(Rect &persistent, int, int)`.
fn resize_member() -> Function {
    Function::new(
        "resize",
        Argument::owned::<()>(),
        vec![
            Argument::persistent::<Rect>(),
            Argument::owned::<i64>(),
            Argument::owned::<i64>(),
        ],
    )
    .with_callable(NativeFn::new(|args: &mut [Value]| {
        let (receiver, rest) = args.split_at_mut(1);
        let width = *rest[0].cast::<i64>()?;
        let height = *rest[1].cast::<i64>()?;
        let rect = receiver[0].cast_mut::<Rect>()?;
        rect.width = width;
        rect.height = height;
        Ok(Value::new())
    }))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Square {
    pub rect: Rect,
    pub side: i64,
}

impl Square {
    pub fn new(side: i64) -> Self {
        Self {
            rect: Rect::new(side, side),
            side,
        }
    }
}

impl Reflect for Square {
    fn type_name() -> &'static str {
        "Square"
    }

    fn describe() -> TypeBuilder<Square> {
        TypeBuilder::new(TypeTraits::empty())
            .constructible()
            .duplicable()
            .transferable()
            .parent::<Rect>(|s: &Square| &s.rect, |s: &mut Square| &mut s.rect)
            .members(|table| table.field("side", |s: &Square| &s.side, |s, v| s.side = v))
    }
}

/// Convertible to `Rect` without being its subtype.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blueprint {
    pub width: i64,
    pub height: i64,
}

impl Reflect for Blueprint {
    fn type_name() -> &'static str {
        "Blueprint"
    }

    fn describe() -> TypeBuilder<Blueprint> {
        TypeBuilder::new(TypeTraits::empty())
            .constructible()
            .duplicable()
            .transferable()
            .converts_to::<Rect>(|b: &Blueprint| Rect::new(b.width, b.height))
    }
}

/// Record type exercising every scalar kind plus a list member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub owner: String,
    pub balance: i64,
    pub rate: f64,
    pub active: bool,
    pub history: Vec<i64>,
}

impl Reflect for Account {
    fn type_name() -> &'static str {
        "Account"
    }

    fn describe() -> TypeBuilder<Account> {
        TypeBuilder::new(TypeTraits::empty())
            .constructible()
            .duplicable()
            .transferable()
            .members(|table| {
                table.field("owner", |a: &Account| &a.owner, |a, v| a.owner = v)?;
                table.field("balance", |a: &Account| &a.balance, |a, v| a.balance = v)?;
                table.field("rate", |a: &Account| &a.rate, |a, v| a.rate = v)?;
                table.field("active", |a: &Account| &a.active, |a, v| a.active = v)?;
                table.field("history", |a: &Account| &a.history, |a, v| a.history = v)
            })
    }
}

/// Record nesting another record and a list of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    pub primary: Account,
    pub accounts: Vec<Account>,
}

impl Reflect for Portfolio {
    fn type_name() -> &'static str {
        "Portfolio"
    }

    fn describe() -> TypeBuilder<Portfolio> {
        TypeBuilder::new(TypeTraits::empty())
            .constructible()
            .duplicable()
            .transferable()
            .members(|table| {
                table.field("primary", |p: &Portfolio| &p.primary, |p, v| p.primary = v)?;
                table.field("accounts", |p: &Portfolio| &p.accounts, |p, v| {
                    p.accounts = v
                })
            })
    }
}
