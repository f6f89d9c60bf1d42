//! Runtime type descriptors.
//!
//! This module provides [`TypeInfo`], the runtime descriptor for one named
//! type: identity, optional single parent, kind-classification flags,
//! capability thunks, registered conversions, and the member table.
//!
//! Descriptors are declared through [`TypeBuilder`] and interned by the
//! registry as `&'static TypeInfo`. Registration runs in two phases: the
//! shell (identity, capabilities, relations) is interned first, then the
//! deferred member table is populated: member signatures may reference
//! their own receiver type, so they can only be built once the shell is
//! reachable through the registry. Once both phases complete a descriptor is
//! never mutated again.
//!
//! # Inheritance and conversions
//!
//! Single inheritance is modeled as composition plus projection: a parent
//! link carries thunks that project a child view onto its embedded parent.
//! Non-hierarchical conversions are value-producing only and are never
//! walked more than one hop from the chain.
//!
//! # Example
//!
//! ```
//! use mirror_core::{Reflect, TypeBuilder, TypeTraits, type_of};
//!
//! #[derive(Clone, Default)]
//! struct Point { x: i64, y: i64 }
//!
//! impl Reflect for Point {
//!     fn type_name() -> &'static str { "Point" }
//!     fn describe() -> TypeBuilder<Point> {
//!         TypeBuilder::new(TypeTraits::empty())
//!             .constructible()
//!             .duplicable()
//!             .transferable()
//!             .members(|table| {
//!                 table.field("x", |p: &Point| &p.x, |p, v| p.x = v)?;
//!                 table.field("y", |p: &Point| &p.y, |p, v| p.y = v)
//!             })
//!     }
//! }
//!
//! let ty = type_of::<Point>();
//! assert_eq!(ty.name(), "Point");
//! assert!(ty.has_member("x"));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::argument::Argument;
use crate::error::{AccessError, RegistrationError};
use crate::function::{Function, NativeFn};
use crate::overloads::Overloads;
use crate::reflect::Reflect;
use crate::registry::type_of;
use crate::type_hash::TypeHash;
use crate::value::Value;

bitflags! {
    /// Kind-classification flags for a type.
    ///
    /// These drive the type-directed dispatch in consumers (notably the JSON
    /// decoder) without requiring knowledge of the concrete Rust type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeTraits: u16 {
        /// The void/no-result type.
        const VOID = 1 << 0;
        /// The universal dynamic-value type (compatibility escape hatch).
        const DYNAMIC = 1 << 1;
        /// Accepts null assignment.
        const NULLABLE = 1 << 2;
        /// Boolean-kinded.
        const BOOLEAN = 1 << 3;
        /// Integer-kinded (backed by `i64`).
        const INTEGER = 1 << 4;
        /// Float-kinded (backed by `f64`).
        const FLOAT = 1 << 5;
        /// String-kinded.
        const STRING = 1 << 6;
        /// List-kinded; carries a contained element type.
        const LIST = 1 << 7;
    }
}

impl TypeTraits {
    /// The primitive kinds (boolean, integer, float).
    pub const PRIMITIVE: TypeTraits = TypeTraits::BOOLEAN
        .union(TypeTraits::INTEGER)
        .union(TypeTraits::FLOAT);
}

type ConstructFn = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;
type DuplicateFn = Box<dyn Fn(&dyn Any) -> Box<dyn Any> + Send + Sync>;
type TransferFn = Box<dyn Fn(&mut dyn Any) -> Box<dyn Any> + Send + Sync>;
type SetNullFn = Box<dyn Fn(&mut dyn Any) + Send + Sync>;
type UpcastRefFn = Box<dyn for<'a> Fn(&'a dyn Any) -> (&'a dyn Any) + Send + Sync>;
type UpcastMutFn = Box<dyn for<'a> Fn(&'a mut dyn Any) -> (&'a mut dyn Any) + Send + Sync>;
type ProduceFn = Box<dyn Fn(&dyn Any) -> Box<dyn Any> + Send + Sync>;
type PopulateFn =
    Box<dyn FnOnce() -> Result<FxHashMap<String, Overloads>, RegistrationError> + Send>;

/// Link to a type's single parent.
///
/// Carries the projection thunks that reinterpret a live instance as its
/// embedded parent, the runtime stand-in for pointer upcasting.
pub struct ParentLink {
    target: &'static TypeInfo,
    upcast_ref: UpcastRefFn,
    upcast_mut: UpcastMutFn,
}

impl ParentLink {
    /// The parent descriptor.
    #[inline]
    pub fn target(&self) -> &'static TypeInfo {
        self.target
    }

    /// Project a shared view onto the parent portion.
    #[inline]
    pub fn apply_ref<'a>(&self, view: &'a dyn Any) -> &'a dyn Any {
        (self.upcast_ref)(view)
    }

    /// Project a mutable view onto the parent portion.
    #[inline]
    pub fn apply_mut<'a>(&self, view: &'a mut dyn Any) -> &'a mut dyn Any {
        (self.upcast_mut)(view)
    }
}

/// A registered value-producing conversion to an unrelated type.
pub struct Conversion {
    target: &'static TypeInfo,
    produce: ProduceFn,
}

impl Conversion {
    /// The conversion target descriptor.
    #[inline]
    pub fn target(&self) -> &'static TypeInfo {
        self.target
    }

    /// Produce a fresh instance of the target type from a source view.
    #[inline]
    pub fn apply(&self, view: &dyn Any) -> Box<dyn Any> {
        (self.produce)(view)
    }
}

/// Runtime descriptor of one named type.
pub struct TypeInfo {
    name: &'static str,
    hash: TypeHash,
    traits: TypeTraits,
    parent: Option<ParentLink>,
    conversions: Vec<Conversion>,
    members: OnceLock<FxHashMap<String, Overloads>>,
    contained: Option<&'static TypeInfo>,
    construct: Option<ConstructFn>,
    duplicate: Option<DuplicateFn>,
    transfer: Option<TransferFn>,
    set_null: Option<SetNullFn>,
}

impl TypeInfo {
    /// The type's unique identifier.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type's identity hash.
    #[inline]
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// Kind-classification flags.
    #[inline]
    pub fn traits(&self) -> TypeTraits {
        self.traits
    }

    /// The parent descriptor, if any.
    pub fn parent(&self) -> Option<&'static TypeInfo> {
        self.parent.as_ref().map(|link| link.target)
    }

    /// The parent link with its projection thunks.
    pub fn parent_link(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Registered conversions out of this type.
    pub fn conversions(&self) -> &[Conversion] {
        &self.conversions
    }

    /// The contained element type for list-kinded types.
    pub fn contained(&self) -> Option<&'static TypeInfo> {
        self.contained
    }

    // ==========================================================================
    // Kind predicates
    // ==========================================================================

    pub fn is_void(&self) -> bool {
        self.traits.contains(TypeTraits::VOID)
    }

    pub fn is_dynamic(&self) -> bool {
        self.traits.contains(TypeTraits::DYNAMIC)
    }

    pub fn is_nullable(&self) -> bool {
        self.traits.contains(TypeTraits::NULLABLE)
    }

    pub fn is_boolean(&self) -> bool {
        self.traits.contains(TypeTraits::BOOLEAN)
    }

    pub fn is_integer(&self) -> bool {
        self.traits.contains(TypeTraits::INTEGER)
    }

    pub fn is_float(&self) -> bool {
        self.traits.contains(TypeTraits::FLOAT)
    }

    pub fn is_string(&self) -> bool {
        self.traits.contains(TypeTraits::STRING)
    }

    pub fn is_list(&self) -> bool {
        self.traits.contains(TypeTraits::LIST)
    }

    pub fn is_primitive(&self) -> bool {
        self.traits.intersects(TypeTraits::PRIMITIVE)
    }

    // ==========================================================================
    // Capabilities
    // ==========================================================================

    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    pub fn is_duplicable(&self) -> bool {
        self.duplicate.is_some()
    }

    pub fn is_transferable(&self) -> bool {
        self.transfer.is_some()
    }

    /// Default-construct an owned value of this type.
    pub fn construct(&'static self) -> Result<Value, AccessError> {
        match &self.construct {
            Some(make) => Ok(Value::from_owned_parts(self, make())),
            None => Err(AccessError::NotConstructible { ty: self.name }),
        }
    }

    /// Duplicate a live instance viewed as this type.
    pub(crate) fn duplicate(&self, view: &dyn Any) -> Option<Box<dyn Any>> {
        self.duplicate.as_ref().map(|dup| dup(view))
    }

    /// Transfer a live instance viewed as this type out of its storage.
    pub(crate) fn transfer(&self, view: &mut dyn Any) -> Option<Box<dyn Any>> {
        self.transfer.as_ref().map(|take| take(view))
    }

    /// Apply the nullable capability to a live instance.
    pub(crate) fn set_null(&self, view: &mut dyn Any) -> bool {
        match &self.set_null {
            Some(clear) => {
                clear(view);
                true
            }
            None => false,
        }
    }

    // ==========================================================================
    // Relations
    // ==========================================================================

    /// Whether this type is nominally convertible to `target`: identity, any
    /// ancestor on the parent chain, or a conversion registered on any type
    /// of the walked chain (one hop, never transitive).
    pub fn is_convertible_to(&self, target: &TypeInfo) -> bool {
        let mut current = self;
        loop {
            if current.hash == target.hash {
                return true;
            }
            if current.conversion_to(target.hash).is_some() {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `target` appears on this type's parent chain (identity
    /// included). Conversions do not count: this is the aliasing relation.
    pub fn has_ancestor(&self, target: TypeHash) -> bool {
        let mut current = self;
        loop {
            if current.hash == target {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// A conversion registered on this type (not its ancestors) to `target`.
    pub(crate) fn conversion_to(&self, target: TypeHash) -> Option<&Conversion> {
        self.conversions.iter().find(|c| c.target.hash == target)
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    fn member_map(&self) -> Option<&FxHashMap<String, Overloads>> {
        self.members.get()
    }

    /// Look up a member's overload set, falling back through the parent
    /// chain: a member declared on a parent is visible on the child.
    pub fn member(&self, name: &str) -> Option<&Overloads> {
        if let Some(overloads) = self.member_map().and_then(|map| map.get(name)) {
            return Some(overloads);
        }
        self.parent().and_then(|parent| parent.member(name))
    }

    /// Whether a member with that name exists on this type or an ancestor.
    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Iterate over the members declared directly on this type.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Overloads)> {
        self.member_map()
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Install the populated member table. Second-phase registration; a
    /// racing duplicate is discarded.
    pub(crate) fn install_members(&self, members: FxHashMap<String, Overloads>) {
        let _ = self.members.set(members);
    }

    /// Render the descriptor for diagnostics: identity, parent, and every
    /// member signature, one per line.
    pub fn print(&self) -> String {
        let mut out = format!("type {}\n", self.name);
        if let Some(parent) = self.parent() {
            out.push_str(&format!("  parent: {}\n", parent.name()));
        }
        let mut names: Vec<&str> = self.members().map(|(name, _)| name).collect();
        names.sort_unstable();
        for name in names {
            if let Some(overloads) = self.member(name) {
                out.push_str(&format!("  {}:\n", name));
                out.push_str(&overloads.print(4));
            }
        }
        out
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .field("traits", &self.traits)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Declares a [`TypeInfo`] descriptor, parameterized by the concrete kind.
///
/// Capability thunks are registered against the concrete type so the erased
/// storage can be operated on without compile-time knowledge downstream.
/// Member declaration is deferred: the closure handed to
/// [`members`](Self::members) runs after the shell has been interned, so
/// member signatures may freely reference the receiver type itself.
pub struct TypeBuilder<T: Reflect> {
    info: TypeInfo,
    populate: Option<PopulateFn>,
    _kind: std::marker::PhantomData<fn(T)>,
}

impl<T: Reflect> TypeBuilder<T> {
    /// Start a descriptor for `T` with the given kind flags.
    pub fn new(traits: TypeTraits) -> Self {
        Self {
            info: TypeInfo {
                name: T::type_name(),
                hash: T::type_hash(),
                traits,
                parent: None,
                conversions: Vec::new(),
                members: OnceLock::new(),
                contained: None,
                construct: None,
                duplicate: None,
                transfer: None,
                set_null: None,
            },
            populate: None,
            _kind: std::marker::PhantomData,
        }
    }

    /// Enable default construction.
    pub fn constructible(mut self) -> Self
    where
        T: Default,
    {
        self.info.construct = Some(Box::new(|| Box::new(T::default()) as Box<dyn Any>));
        self
    }

    /// Enable duplication (defensive copies).
    pub fn duplicable(mut self) -> Self
    where
        T: Clone,
    {
        self.info.duplicate = Some(Box::new(|view: &dyn Any| {
            Box::new(downcast_view::<T>(view).clone()) as Box<dyn Any>
        }));
        self
    }

    /// Enable destructive transfer out of live storage. The residue left
    /// behind is the type's default value.
    pub fn transferable(mut self) -> Self
    where
        T: Default,
    {
        self.info.transfer = Some(Box::new(|view: &mut dyn Any| {
            Box::new(std::mem::take(downcast_view_mut::<T>(view))) as Box<dyn Any>
        }));
        self
    }

    /// Enable null assignment through the given reset thunk.
    pub fn nullable(mut self, clear: fn(&mut T)) -> Self {
        self.info.traits |= TypeTraits::NULLABLE;
        self.info.set_null = Some(Box::new(move |view: &mut dyn Any| {
            clear(downcast_view_mut::<T>(view));
        }));
        self
    }

    /// Declare `P` as the single parent, with projections onto the embedded
    /// parent portion of a live instance.
    pub fn parent<P: Reflect>(mut self, up_ref: fn(&T) -> &P, up_mut: fn(&mut T) -> &mut P) -> Self {
        self.info.parent = Some(ParentLink {
            target: type_of::<P>(),
            upcast_ref: Box::new(move |view: &dyn Any| up_ref(downcast_view::<T>(view)) as &dyn Any),
            upcast_mut: Box::new(move |view: &mut dyn Any| {
                up_mut(downcast_view_mut::<T>(view)) as &mut dyn Any
            }),
        });
        self
    }

    /// Register a value-producing conversion to the unrelated type `U`.
    pub fn converts_to<U: Reflect>(mut self, produce: fn(&T) -> U) -> Self {
        self.info.conversions.push(Conversion {
            target: type_of::<U>(),
            produce: Box::new(move |view: &dyn Any| {
                Box::new(produce(downcast_view::<T>(view))) as Box<dyn Any>
            }),
        });
        self
    }

    /// Declare the contained element type for a list-kinded descriptor.
    pub fn contains<E: Reflect>(mut self) -> Self {
        self.info.contained = Some(type_of::<E>());
        self
    }

    /// Declare the member table.
    ///
    /// The closure runs once, after the shell has been interned; an
    /// ambiguous overload pair aborts the registration.
    pub fn members<F>(mut self, populate: F) -> Self
    where
        F: FnOnce(&mut MemberTable<T>) -> Result<(), RegistrationError> + Send + 'static,
    {
        self.populate = Some(Box::new(move || {
            let mut table = MemberTable::new();
            populate(&mut table)?;
            Ok(table.map)
        }));
        self
    }

    /// Split into the shell descriptor and the deferred member population.
    pub(crate) fn into_parts(self) -> (TypeInfo, Option<PopulateFn>) {
        (self.info, self.populate)
    }
}

/// Member table under population for receiver type `T`.
///
/// Supplied to the closure given to [`TypeBuilder::members`]; every addition
/// enforces the no-ambiguity invariant.
pub struct MemberTable<T: Reflect> {
    map: FxHashMap<String, Overloads>,
    _kind: std::marker::PhantomData<fn(T)>,
}

impl<T: Reflect> MemberTable<T> {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            _kind: std::marker::PhantomData,
        }
    }

    /// Add a member function under its own name.
    pub fn add(&mut self, function: Function) -> Result<(), RegistrationError> {
        self.map
            .entry(function.name().to_string())
            .or_insert_with(|| Overloads::new(function.name()))
            .add(function)
    }

    /// Register a plain data field as a getter/setter overload pair under
    /// the field's name: the getter returns a read-only persistent
    /// reference, the setter consumes an owned value.
    pub fn field<F: Reflect>(
        &mut self,
        name: &str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Result<(), RegistrationError> {
        let getter = Function::new(
            name,
            Argument::persistent::<F>().readonly(),
            vec![Argument::persistent::<T>().readonly()],
        )
        .with_callable(NativeFn::new(move |args: &mut [Value]| {
            let receiver = args[0].cast::<T>()?;
            // The reference aliases the receiver's storage; validity follows
            // the receiver's own lifetime contract.
            Ok(unsafe { Value::from_ref(get(receiver)) })
        }));
        self.add(getter)?;

        let setter = Function::new(
            name,
            Argument::owned::<()>(),
            vec![Argument::persistent::<T>(), Argument::owned::<F>()],
        )
        .with_callable(NativeFn::new(move |args: &mut [Value]| {
            let (receiver, rest) = args.split_at_mut(1);
            let item = rest[0].take::<F>()?.into_concrete::<F>()?;
            set(receiver[0].cast_mut::<T>()?, item);
            Ok(Value::new())
        }));
        self.add(setter)
    }
}

/// Downcast an erased view to the concrete type a thunk was registered for.
///
/// The registry only ever applies a thunk to storage of the type it was
/// registered on, so a failure here is a wiring bug, not a user error.
fn downcast_view<T: 'static>(view: &dyn Any) -> &T {
    match view.downcast_ref::<T>() {
        Some(concrete) => concrete,
        None => panic!("type thunk applied to foreign storage"),
    }
}

fn downcast_view_mut<T: 'static>(view: &mut dyn Any) -> &mut T {
    match view.downcast_mut::<T>() {
        Some(concrete) => concrete,
        None => panic!("type thunk applied to foreign storage"),
    }
}
