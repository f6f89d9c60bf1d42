//! Unified error types for the reflection core.
//!
//! Each phase gets its own error enum and all of them convert into the
//! top-level [`ReflectError`] wrapper:
//!
//! ```text
//! ReflectError (top-level wrapper)
//! ├── RegistrationError - member/overload registration errors
//! ├── AccessError       - checked value-container access violations
//! └── CallError         - member resolution and invocation errors
//! ```
//!
//! All errors are raised synchronously at the point of violation and
//! propagate to the caller unmodified; there is no retry or recovery path
//! inside the core.

use thiserror::Error;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating a type descriptor's member table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// Two overloads of the same member are mutually exact-compatible.
    ///
    /// The offending function is not added; the member table keeps its
    /// previous state.
    #[error("<{name}, {candidate}> is ambiguous with <{name}, {existing}>")]
    AmbiguousOverload {
        name: String,
        candidate: String,
        existing: String,
    },
}

// ============================================================================
// Access Errors
// ============================================================================

/// Checked access against a value container failed.
///
/// Raised when a cast/copy/move/assign is requested against a value whose
/// category, mutability, or capability flags forbid it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    /// The requested type is not the declared type or one of its ancestors.
    #[error("can't cast <{held}> to <{requested}>")]
    NotCastable {
        held: &'static str,
        requested: &'static str,
    },

    /// A mutable reference was requested from a read-only value.
    #[error("can't cast read-only <{held}> to mutable <{requested}>")]
    NotMutable {
        held: &'static str,
        requested: &'static str,
    },

    /// The requested type is not reachable through a value-producing
    /// relation, or lacks the duplication capability.
    #[error("can't copy <{held}> as <{requested}>")]
    NotCopiable {
        held: &'static str,
        requested: &'static str,
    },

    /// The value is read-only, or the requested type is not reachable
    /// through a value-producing relation, or lacks the transfer capability.
    #[error("can't move <{held}> as <{requested}>")]
    NotMovable {
        held: &'static str,
        requested: &'static str,
    },

    /// Assignment into storage of a different declared type.
    #[error("can't assign <{requested}> into <{held}>")]
    NotAssignable {
        held: &'static str,
        requested: &'static str,
    },

    /// The type lacks the default-construction capability.
    #[error("can't construct <{ty}>")]
    NotConstructible { ty: &'static str },

    /// Null was assigned to a type without the nullable capability.
    #[error("can't assign null to non-nullable <{ty}>")]
    NotNullable { ty: &'static str },

    /// The value is empty (moved-out or default-constructed).
    #[error("value is empty")]
    Empty,
}

// ============================================================================
// Call Errors
// ============================================================================

/// Member resolution or invocation failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// No member with that name on the type or any of its ancestors.
    #[error("unknown member <{member}> on <{ty}>")]
    UnknownMember { ty: &'static str, member: String },

    /// No overload of the member accepts the supplied call shape.
    #[error("no overload of <{member}> matches {signature}")]
    NoMatchingOverload { member: String, signature: String },

    /// The resolved candidate carries no native implementation.
    #[error("member <{member}> has no native implementation")]
    NotCallable { member: String },

    /// An access check failed while marshalling arguments or results.
    #[error(transparent)]
    Access(#[from] AccessError),
}

// ============================================================================
// Top-Level Wrapper
// ============================================================================

/// Top-level error wrapper for callers that don't need per-phase handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReflectError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Call(#[from] CallError),
}
