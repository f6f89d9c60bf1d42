//! Call slots: type, mutability, and reference category.
//!
//! This module provides [`Argument`], the description of one call slot, and
//! the central compatibility test that decides whether an actual argument may
//! be supplied where a target slot is expected. Every consumer of the
//! compatibility policy (the overload resolver, the value container, the
//! JSON decoder) goes through [`Argument::test`] so the gating logic is
//! defined exactly once.
//!
//! # Reference categories
//!
//! - [`RefKind::Owned`]: the slot holds or produces a value with no external
//!   alias.
//! - [`RefKind::Persistent`]: a long-lived addressable reference the callee
//!   may retain or mutate across calls.
//! - [`RefKind::Transient`]: a reference valid only for the duration of the
//!   call, signaling that the callee may consume the referent.

use std::fmt::{self, Display, Formatter};

use crate::reflect::Reflect;
use crate::registry::type_of;
use crate::type_info::TypeInfo;

/// Reference category of a call slot or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefKind {
    /// A value with no external alias.
    #[default]
    Owned,
    /// A long-lived addressable reference.
    Persistent,
    /// A call-duration reference; the callee may consume the referent.
    Transient,
}

/// Strength of a compatibility match between two signatures.
///
/// Ordered so that combining pairwise results is a plain minimum:
/// `None < Partial < Exact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Match {
    /// Incompatible.
    None,
    /// Compatible through an ancestor or registered conversion walk.
    Partial,
    /// Identical type with compatible categories, no relation walk needed.
    Exact,
}

/// One call slot: target type, mutability, reference category.
#[derive(Clone, Copy, PartialEq)]
pub struct Argument {
    ty: &'static TypeInfo,
    mutable: bool,
    kind: RefKind,
}

impl Argument {
    /// Build a slot from explicit parts.
    pub fn new(ty: &'static TypeInfo, mutable: bool, kind: RefKind) -> Self {
        Self { ty, mutable, kind }
    }

    /// An owned, mutable slot of type `T`.
    pub fn owned<T: Reflect>() -> Self {
        Self::new(type_of::<T>(), true, RefKind::Owned)
    }

    /// A persistent, mutable reference slot of type `T`.
    pub fn persistent<T: Reflect>() -> Self {
        Self::new(type_of::<T>(), true, RefKind::Persistent)
    }

    /// A transient, mutable reference slot of type `T`.
    pub fn transient<T: Reflect>() -> Self {
        Self::new(type_of::<T>(), true, RefKind::Transient)
    }

    /// Make the slot read-only.
    pub fn readonly(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// The slot's target type.
    #[inline]
    pub fn ty(&self) -> &'static TypeInfo {
        self.ty
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    #[inline]
    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// Whether the slot targets the void/no-result type.
    pub fn is_void(&self) -> bool {
        self.ty.is_void()
    }

    /// Whether the slot targets the universal dynamic-value type.
    pub fn is_dynamic(&self) -> bool {
        self.ty.is_dynamic()
    }

    /// Decide whether this actual argument may be supplied where `target` is
    /// expected.
    ///
    /// The gates run in a fixed order:
    /// 1. Escape hatch: either side dynamic-valued is compatible
    ///    unconditionally.
    /// 2. Mutability, skipped only for owned targets: a read-only actual
    ///    never satisfies a mutable target.
    /// 3. A mutable persistent target requires a mutable, addressable,
    ///    non-transient actual; a read-only persistent target adds no
    ///    category constraint.
    /// 4. A transient target must not silently alias a persistent reference.
    /// 5. Surviving the gates, the type relation decides the strength:
    ///    identity is [`Match::Exact`], an ancestor or registered conversion
    ///    is [`Match::Partial`].
    pub fn test(&self, target: &Argument) -> Match {
        let identical = self.ty.hash() == target.ty.hash();

        if self.is_dynamic() || target.is_dynamic() {
            return if identical { Match::Exact } else { Match::Partial };
        }

        if target.kind != RefKind::Owned && !self.mutable && target.mutable {
            return Match::None;
        }

        match target.kind {
            RefKind::Persistent => {
                if target.mutable && !(self.mutable && self.kind == RefKind::Persistent) {
                    return Match::None;
                }
            }
            RefKind::Transient => {
                if self.kind == RefKind::Persistent {
                    return Match::None;
                }
            }
            RefKind::Owned => {}
        }

        if identical {
            Match::Exact
        } else if self.ty.is_convertible_to(target.ty) {
            Match::Partial
        } else {
            Match::None
        }
    }

    /// Printed form: `[readonly ]Name[ &persistent | &&transient]`.
    pub fn print(&self) -> String {
        let mut out = String::new();
        if !self.mutable {
            out.push_str("readonly ");
        }
        out.push_str(self.ty.name());
        match self.kind {
            RefKind::Owned => {}
            RefKind::Persistent => out.push_str(" &persistent"),
            RefKind::Transient => out.push_str(" &&transient"),
        }
        out
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Argument({})", self.print())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn identity_is_exact() {
        let a = Argument::owned::<i64>();
        assert_eq!(a.test(&a), Match::Exact);
    }

    #[test]
    fn unrelated_types_never_match() {
        let int = Argument::owned::<i64>();
        let float = Argument::owned::<f64>();
        assert_eq!(int.test(&float), Match::None);
    }

    #[test]
    fn owned_target_skips_mutability_gate() {
        // A read-only owned actual still satisfies a mutable owned target.
        let readonly = Argument::owned::<i64>().readonly();
        let target = Argument::owned::<i64>();
        assert_eq!(readonly.test(&target), Match::Exact);
    }

    #[test]
    fn readonly_never_widens_to_mutable_reference() {
        let readonly = Argument::persistent::<i64>().readonly();
        let target = Argument::persistent::<i64>();
        assert_eq!(readonly.test(&target), Match::None);
    }

    #[test]
    fn readonly_persistent_target_accepts_owned() {
        let owned = Argument::owned::<i64>();
        let target = Argument::persistent::<i64>().readonly();
        assert_eq!(owned.test(&target), Match::Exact);
    }

    #[test]
    fn mutable_persistent_target_rejects_transient() {
        let transient = Argument::transient::<i64>();
        let target = Argument::persistent::<i64>();
        assert_eq!(transient.test(&target), Match::None);
    }

    #[test]
    fn transient_target_rejects_persistent() {
        let persistent = Argument::persistent::<i64>();
        let target = Argument::transient::<i64>();
        assert_eq!(persistent.test(&target), Match::None);

        let owned = Argument::owned::<i64>();
        assert_eq!(owned.test(&target), Match::Exact);
    }

    #[test]
    fn dynamic_escape_hatch() {
        let dynamic = Argument::owned::<Value>();
        let int = Argument::owned::<i64>();
        assert_eq!(dynamic.test(&int), Match::Partial);
        assert_eq!(int.test(&dynamic), Match::Partial);
        assert_eq!(dynamic.test(&dynamic), Match::Exact);
    }

    #[test]
    fn printed_forms() {
        assert_eq!(Argument::owned::<i64>().print(), "int");
        assert_eq!(Argument::owned::<i64>().readonly().print(), "readonly int");
        assert_eq!(Argument::persistent::<i64>().print(), "int &persistent");
        assert_eq!(
            Argument::persistent::<String>().readonly().print(),
            "readonly string &persistent"
        );
        assert_eq!(Argument::transient::<f64>().print(), "float &&transient");
    }

    #[test]
    fn match_ordering_supports_min_combining() {
        assert!(Match::None < Match::Partial);
        assert!(Match::Partial < Match::Exact);
        assert_eq!(Match::Exact.min(Match::Partial), Match::Partial);
    }
}
