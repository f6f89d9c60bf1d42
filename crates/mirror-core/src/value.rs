//! Type-erased value container with runtime access discipline.
//!
//! A [`Value`] holds one instance together with its declared type, its
//! mutability, and its reference category. Every access re-derives, at call
//! time, the discipline a static type system would enforce at compile time:
//!
//! - [`get`](Value::get): trusted access for callers that already know
//!   compatibility holds; panics on misuse.
//! - [`cast`](Value::cast) / [`cast_mut`](Value::cast_mut): guarded
//!   references aliasing the live storage (declared type or ancestors only).
//! - [`copy`](Value::copy): defensive copy through any value-producing
//!   relation (identity, ancestor, or registered conversion).
//! - [`take`](Value::take): destructive move; the source transitions to the
//!   empty state regardless of its prior category.
//!
//! # Storage and lifetimes
//!
//! Owned storage lives inside the `Value`. Borrowed storage (persistent or
//! transient) is a raw pointer to external memory: the borrow constructors
//! are `unsafe fn` and their contract (the referent must outlive the
//! `Value`) is caller discipline, deliberately not tracked.

use std::any::Any;
use std::fmt;

use crate::argument::{Argument, RefKind};
use crate::error::{AccessError, CallError};
use crate::function::signature_of;
use crate::reflect::Reflect;
use crate::registry::type_of;
use crate::type_hash::TypeHash;
use crate::type_info::TypeInfo;

enum Storage {
    Empty,
    Owned(Box<dyn Any>),
    Borrowed(*mut dyn Any),
}

/// Type-erased holder of one instance, its declared type, and its
/// mutability/reference category.
pub struct Value {
    ty: &'static TypeInfo,
    mutable: bool,
    kind: RefKind,
    storage: Storage,
}

impl Value {
    /// An empty value of the void type.
    ///
    /// This is the terminal state reached by destructive extraction and the
    /// default-constructed state.
    pub fn new() -> Self {
        Self {
            ty: type_of::<()>(),
            mutable: false,
            kind: RefKind::Owned,
            storage: Storage::Empty,
        }
    }

    /// Take ownership of an instance.
    pub fn own<T: Reflect>(instance: T) -> Self {
        Self {
            ty: type_of::<T>(),
            mutable: true,
            kind: RefKind::Owned,
            storage: Storage::Owned(Box::new(instance)),
        }
    }

    /// Borrow an instance as a read-only persistent reference.
    ///
    /// # Safety
    ///
    /// The referent must outlive the returned `Value` and every value
    /// aliased from it. The container does not track the borrow.
    pub unsafe fn from_ref<T: Reflect>(instance: &T) -> Self {
        let view: &dyn Any = instance;
        Self {
            ty: type_of::<T>(),
            mutable: false,
            kind: RefKind::Persistent,
            storage: Storage::Borrowed(view as *const dyn Any as *mut dyn Any),
        }
    }

    /// Borrow an instance as a mutable persistent reference.
    ///
    /// # Safety
    ///
    /// The referent must outlive the returned `Value` and must not be
    /// accessed through any other path while the `Value` is live.
    pub unsafe fn from_mut<T: Reflect>(instance: &mut T) -> Self {
        let view: &mut dyn Any = instance;
        Self {
            ty: type_of::<T>(),
            mutable: true,
            kind: RefKind::Persistent,
            storage: Storage::Borrowed(view as *mut dyn Any),
        }
    }

    /// Borrow an instance as a transient (call-duration, consumable)
    /// reference.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_mut`](Self::from_mut); additionally the
    /// callee may transfer the referent's contents out, leaving its default
    /// value behind.
    pub unsafe fn transient<T: Reflect>(instance: &mut T) -> Self {
        let view: &mut dyn Any = instance;
        Self {
            ty: type_of::<T>(),
            mutable: true,
            kind: RefKind::Transient,
            storage: Storage::Borrowed(view as *mut dyn Any),
        }
    }

    /// Internal assembly from a descriptor and freshly produced storage.
    pub(crate) fn from_owned_parts(ty: &'static TypeInfo, instance: Box<dyn Any>) -> Self {
        Self {
            ty,
            mutable: true,
            kind: RefKind::Owned,
            storage: Storage::Owned(instance),
        }
    }

    // ==========================================================================
    // Identity
    // ==========================================================================

    /// The declared type.
    #[inline]
    pub fn ty(&self) -> &'static TypeInfo {
        self.ty
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Reference category. Meaningless for empty values; check
    /// [`is_void`](Self::is_void) first.
    #[inline]
    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// Whether this value is in the empty state.
    pub fn is_void(&self) -> bool {
        matches!(self.storage, Storage::Empty)
    }

    /// The call-slot shape of this value, for compatibility testing.
    pub fn as_argument(&self) -> Argument {
        Argument::new(self.ty, self.mutable, self.kind)
    }

    fn view(&self) -> Option<&dyn Any> {
        match &self.storage {
            Storage::Empty => None,
            Storage::Owned(boxed) => Some(&**boxed),
            // Valid under the borrow constructors' contract.
            Storage::Borrowed(ptr) => Some(unsafe { &**ptr }),
        }
    }

    fn view_mut(&mut self) -> Option<&mut dyn Any> {
        match &mut self.storage {
            Storage::Empty => None,
            Storage::Owned(boxed) => Some(&mut **boxed),
            Storage::Borrowed(ptr) => Some(unsafe { &mut **ptr }),
        }
    }

    /// Walk the parent chain from the declared type, projecting the storage
    /// view at each hop, until `target` is reached.
    fn find_view(&self, target: TypeHash) -> Option<&dyn Any> {
        let mut ty = self.ty;
        let mut view = self.view()?;
        loop {
            if ty.hash() == target {
                return Some(view);
            }
            let link = ty.parent_link()?;
            view = link.apply_ref(view);
            ty = link.target();
        }
    }

    fn find_view_mut(&mut self, target: TypeHash) -> Option<&mut dyn Any> {
        let mut ty = self.ty;
        let mut view = self.view_mut()?;
        loop {
            if ty.hash() == target {
                return Some(view);
            }
            let link = ty.parent_link()?;
            view = link.apply_mut(view);
            ty = link.target();
        }
    }

    fn clear(&mut self) {
        self.ty = type_of::<()>();
        self.mutable = false;
        self.kind = RefKind::Owned;
        self.storage = Storage::Empty;
    }

    // ==========================================================================
    // Trusted access
    // ==========================================================================

    /// Raw reference access for trusted call paths that already know the
    /// compatibility assumptions hold.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not the declared type or one of its ancestors, or if
    /// the value is empty. Untrusted callers use [`cast`](Self::cast).
    pub fn get<T: Reflect>(&self) -> &T {
        match self.cast::<T>() {
            Ok(reference) => reference,
            Err(err) => panic!("untested value access: {err}"),
        }
    }

    // ==========================================================================
    // Guarded cast
    // ==========================================================================

    /// Whether [`cast`](Self::cast) would succeed for `T`.
    pub fn is_castable<T: Reflect>(&self) -> bool {
        !self.is_void() && self.ty.has_ancestor(T::type_hash())
    }

    /// Whether [`cast_mut`](Self::cast_mut) would succeed for `T`.
    pub fn is_castable_mut<T: Reflect>(&self) -> bool {
        self.mutable && self.is_castable::<T>()
    }

    /// A read-only reference aliasing the live storage, viewed as `T`.
    ///
    /// `T` must be the declared type or one of its ancestors; registered
    /// conversions are value-producing and never cast.
    pub fn cast<T: Reflect>(&self) -> Result<&T, AccessError> {
        if self.is_void() {
            return Err(AccessError::Empty);
        }
        self.find_view(T::type_hash())
            .and_then(|view| view.downcast_ref::<T>())
            .ok_or(AccessError::NotCastable {
                held: self.ty.name(),
                requested: T::type_name(),
            })
    }

    /// A mutable reference aliasing the live storage, viewed as `T`.
    pub fn cast_mut<T: Reflect>(&mut self) -> Result<&mut T, AccessError> {
        if self.is_void() {
            return Err(AccessError::Empty);
        }
        if !self.mutable {
            return Err(AccessError::NotMutable {
                held: self.ty.name(),
                requested: T::type_name(),
            });
        }
        let held = self.ty.name();
        self.find_view_mut(T::type_hash())
            .and_then(|view| view.downcast_mut::<T>())
            .ok_or(AccessError::NotCastable {
                held,
                requested: T::type_name(),
            })
    }

    // ==========================================================================
    // Defensive copy
    // ==========================================================================

    /// Whether [`copy`](Self::copy) would succeed for `T`.
    pub fn is_copiable<T: Reflect>(&self) -> bool {
        let target = T::type_hash();
        let mut ty = self.ty;
        if self.is_void() {
            return false;
        }
        loop {
            if ty.hash() == target {
                return ty.is_duplicable();
            }
            if ty.conversion_to(target).is_some() {
                return true;
            }
            match ty.parent() {
                Some(parent) => ty = parent,
                None => return false,
            }
        }
    }

    /// Produce a fresh owned value of type `T` from this one.
    ///
    /// `T` must be reachable through a value-producing relation: the declared
    /// type itself or an ancestor (both requiring `T`'s duplication
    /// capability), or a registered conversion from any type on the chain.
    /// Copying never requires mutability.
    pub fn copy<T: Reflect>(&self) -> Result<Value, AccessError> {
        let target = T::type_hash();
        let not_copiable = AccessError::NotCopiable {
            held: self.ty.name(),
            requested: T::type_name(),
        };

        let mut ty = self.ty;
        let mut view = self.view().ok_or(AccessError::Empty)?;
        loop {
            if ty.hash() == target {
                let duplicate = ty.duplicate(view).ok_or(not_copiable)?;
                return Ok(Value::from_owned_parts(ty, duplicate));
            }
            if let Some(conversion) = ty.conversion_to(target) {
                return Ok(Value::from_owned_parts(
                    conversion.target(),
                    conversion.apply(view),
                ));
            }
            match ty.parent_link() {
                Some(link) => {
                    view = link.apply_ref(view);
                    ty = link.target();
                }
                None => return Err(not_copiable),
            }
        }
    }

    // ==========================================================================
    // Destructive move
    // ==========================================================================

    /// Whether [`take`](Self::take) would succeed for `T`.
    pub fn is_movable<T: Reflect>(&self) -> bool {
        if self.is_void() || !self.mutable {
            return false;
        }
        let target = T::type_hash();
        let mut ty = self.ty;
        loop {
            if ty.hash() == target {
                return ty.is_transferable();
            }
            if ty.conversion_to(target).is_some() {
                return self.ty.is_transferable();
            }
            match ty.parent() {
                Some(parent) => ty = parent,
                None => return false,
            }
        }
    }

    /// Extract the instance into a fresh owned value of type `T`, leaving
    /// this value empty regardless of its prior category.
    ///
    /// `T` must be reachable through the same value-producing relation as
    /// [`copy`](Self::copy), with the transfer capability in place of
    /// duplication. Borrowed referents are left holding their type's default
    /// value.
    pub fn take<T: Reflect>(&mut self) -> Result<Value, AccessError> {
        let target = T::type_hash();
        let not_movable = AccessError::NotMovable {
            held: self.ty.name(),
            requested: T::type_name(),
        };

        if self.is_void() {
            return Err(AccessError::Empty);
        }
        if !self.mutable || !self.is_movable::<T>() {
            return Err(not_movable);
        }

        // The relation was vetted above; transfer through the matching view.
        let extracted = {
            let mut ty = self.ty;
            let mut view = self.view_mut().ok_or(AccessError::Empty)?;
            loop {
                if ty.hash() == target {
                    break ty.transfer(view).map(|boxed| (ty, boxed));
                }
                if let Some(conversion) = ty.conversion_to(target) {
                    break Some((conversion.target(), conversion.apply(view)));
                }
                match ty.parent_link() {
                    Some(link) => {
                        view = link.apply_mut(view);
                        ty = link.target();
                    }
                    None => break None,
                }
            }
        };

        match extracted {
            Some((ty, boxed)) => {
                self.clear();
                Ok(Value::from_owned_parts(ty, boxed))
            }
            None => Err(not_movable),
        }
    }

    /// Unwrap an owned value into its concrete instance.
    ///
    /// Succeeds only for owned storage whose declared type is exactly `T`.
    pub fn into_concrete<T: Reflect>(self) -> Result<T, AccessError> {
        match self.storage {
            Storage::Owned(boxed) => match boxed.downcast::<T>() {
                Ok(concrete) => Ok(*concrete),
                Err(_) => Err(AccessError::NotCastable {
                    held: self.ty.name(),
                    requested: T::type_name(),
                }),
            },
            Storage::Borrowed(_) => Err(AccessError::NotMovable {
                held: self.ty.name(),
                requested: T::type_name(),
            }),
            Storage::Empty => Err(AccessError::Empty),
        }
    }

    // ==========================================================================
    // In-place assignment
    // ==========================================================================

    /// Overwrite the live storage with a new instance of the declared type.
    pub fn assign<T: Reflect>(&mut self, instance: T) -> Result<(), AccessError> {
        if self.is_void() {
            return Err(AccessError::Empty);
        }
        if !self.mutable {
            return Err(AccessError::NotMutable {
                held: self.ty.name(),
                requested: T::type_name(),
            });
        }
        if self.ty.hash() != T::type_hash() {
            return Err(AccessError::NotAssignable {
                held: self.ty.name(),
                requested: T::type_name(),
            });
        }
        let held = self.ty.name();
        let slot = self
            .view_mut()
            .and_then(|view| view.downcast_mut::<T>())
            .ok_or(AccessError::NotAssignable {
                held,
                requested: T::type_name(),
            })?;
        *slot = instance;
        Ok(())
    }

    /// Apply the declared type's nullable capability.
    pub fn set_null(&mut self) -> Result<(), AccessError> {
        if self.is_void() {
            return Err(AccessError::Empty);
        }
        if !self.mutable {
            return Err(AccessError::NotMutable {
                held: self.ty.name(),
                requested: "null",
            });
        }
        let ty = self.ty;
        let view = self.view_mut().ok_or(AccessError::Empty)?;
        if ty.set_null(view) {
            Ok(())
        } else {
            Err(AccessError::NotNullable { ty: ty.name() })
        }
    }

    // ==========================================================================
    // Member invocation
    // ==========================================================================

    /// Resolve `name` through the declared type's member table (with parent
    /// fallback) against the supplied arguments, then invoke the candidate.
    ///
    /// The receiver is prepended as a persistent reference slot inheriting
    /// this value's mutability; the expected return slot is the dynamic type
    /// so any candidate return is acceptable.
    pub fn call(&mut self, name: &str, mut args: Vec<Value>) -> Result<Value, CallError> {
        let ty = self.ty;
        let overloads = ty.member(name).ok_or_else(|| CallError::UnknownMember {
            ty: ty.name(),
            member: name.to_string(),
        })?;

        let mut slots = Vec::with_capacity(args.len() + 1);
        slots.push(self.alias());
        slots.append(&mut args);

        let expected_ret = Argument::owned::<Value>();
        let shapes: Vec<Argument> = slots.iter().map(Value::as_argument).collect();

        let candidate =
            overloads
                .resolve(&expected_ret, &shapes)
                .ok_or_else(|| CallError::NoMatchingOverload {
                    member: name.to_string(),
                    signature: signature_of(&expected_ret, &shapes),
                })?;

        candidate.invoke(&mut slots)
    }

    /// A persistent reference value aliasing this value's storage, used as
    /// the receiver slot during member invocation. Valid for the duration of
    /// the call only.
    fn alias(&mut self) -> Value {
        let ptr: *mut dyn Any = match &mut self.storage {
            Storage::Empty => return Value::new(),
            Storage::Owned(boxed) => &mut **boxed,
            Storage::Borrowed(ptr) => *ptr,
        };
        Value {
            ty: self.ty,
            mutable: self.mutable,
            kind: RefKind::Persistent,
            storage: Storage::Borrowed(ptr),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_void() {
            return write!(f, "Value(void)");
        }
        write!(f, "Value({})", self.as_argument().print())
    }
}

impl Reflect for Value {
    fn type_name() -> &'static str {
        "dynamic"
    }

    fn describe() -> crate::type_info::TypeBuilder<Value> {
        use crate::type_info::{TypeBuilder, TypeTraits};
        TypeBuilder::new(TypeTraits::DYNAMIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_value_is_void() {
        let value = Value::new();
        assert!(value.is_void());
        assert_eq!(value.ty().name(), "void");
        assert_eq!(Value::default().ty(), value.ty());
    }

    #[test]
    fn owned_value_access() {
        let mut value = Value::own(10i64);
        assert!(!value.is_void());
        assert!(value.is_mutable());
        assert_eq!(value.kind(), RefKind::Owned);
        assert_eq!(*value.get::<i64>(), 10);

        assert!(value.is_copiable::<i64>());
        assert_eq!(*value.copy::<i64>().unwrap().get::<i64>(), 10);

        assert!(value.is_castable::<i64>());
        assert!(value.is_castable_mut::<i64>());
        *value.cast_mut::<i64>().unwrap() = 11;
        assert_eq!(*value.cast::<i64>().unwrap(), 11);

        assert!(value.is_movable::<i64>());
        let moved = value.take::<i64>().unwrap();
        assert_eq!(*moved.get::<i64>(), 11);
        assert!(value.is_void());
    }

    #[test]
    fn readonly_borrow_refuses_mutation() {
        let source = 10i64;
        let mut value = unsafe { Value::from_ref(&source) };

        assert!(!value.is_mutable());
        assert_eq!(value.kind(), RefKind::Persistent);
        assert_eq!(*value.get::<i64>(), 10);

        assert!(value.is_castable::<i64>());
        assert!(!value.is_castable_mut::<i64>());
        assert!(matches!(
            value.cast_mut::<i64>(),
            Err(AccessError::NotMutable { .. })
        ));

        assert!(value.is_copiable::<i64>());
        assert!(!value.is_movable::<i64>());
        assert!(matches!(
            value.take::<i64>(),
            Err(AccessError::NotMovable { .. })
        ));
    }

    #[test]
    fn mutable_borrow_aliases_storage() {
        let mut source = 10i64;
        {
            let mut value = unsafe { Value::from_mut(&mut source) };
            assert!(value.is_mutable());
            *value.cast_mut::<i64>().unwrap() = 42;
        }
        assert_eq!(source, 42);
    }

    #[test]
    fn take_from_borrow_leaves_default_residue() {
        let mut source = 42i64;
        {
            let mut value = unsafe { Value::transient(&mut source) };
            let moved = value.take::<i64>().unwrap();
            assert_eq!(*moved.get::<i64>(), 42);
            assert!(value.is_void());
        }
        assert_eq!(source, 0);
    }

    #[test]
    fn unrelated_type_is_rejected_everywhere() {
        let value = Value::own(10i64);
        assert!(!value.is_castable::<String>());
        assert!(!value.is_copiable::<String>());
        assert!(matches!(
            value.cast::<String>(),
            Err(AccessError::NotCastable { .. })
        ));
        assert!(matches!(
            value.copy::<String>(),
            Err(AccessError::NotCopiable { .. })
        ));
    }

    #[test]
    fn assign_overwrites_in_place() {
        let mut value = Value::own(1i64);
        value.assign(7i64).unwrap();
        assert_eq!(*value.get::<i64>(), 7);

        assert!(matches!(
            value.assign("seven".to_string()),
            Err(AccessError::NotAssignable { .. })
        ));
    }

    #[test]
    fn set_null_requires_capability() {
        let mut int = Value::own(1i64);
        assert!(matches!(
            int.set_null(),
            Err(AccessError::NotNullable { .. })
        ));

        let mut opt = Value::own(Some(1i64));
        opt.set_null().unwrap();
        assert_eq!(*opt.get::<Option<i64>>(), None);
    }

    #[test]
    fn empty_value_rejects_access() {
        let mut value = Value::new();
        assert!(matches!(value.cast::<i64>(), Err(AccessError::Empty)));
        assert!(matches!(value.copy::<i64>(), Err(AccessError::Empty)));
        assert!(matches!(value.take::<i64>(), Err(AccessError::Empty)));
    }

    #[test]
    fn list_push_through_member_table() {
        let mut list = Value::own(Vec::<i64>::new());
        list.call("push", vec![Value::own(1i64)]).unwrap();
        list.call("push", vec![Value::own(2i64)]).unwrap();
        assert_eq!(list.get::<Vec<i64>>().as_slice(), &[1, 2]);
    }

    #[test]
    fn call_unknown_member_fails() {
        let mut list = Value::own(Vec::<i64>::new());
        let err = list.call("shove", vec![]).unwrap_err();
        assert!(matches!(err, CallError::UnknownMember { .. }));
    }

    #[test]
    fn call_with_wrong_shape_fails() {
        let mut list = Value::own(Vec::<i64>::new());
        let err = list
            .call("push", vec![Value::own("one".to_string())])
            .unwrap_err();
        assert!(matches!(err, CallError::NoMatchingOverload { .. }));
    }
}
