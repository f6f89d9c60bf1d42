//! Operation signatures and their native implementations.
//!
//! A [`Function`] is one named operation: a return [`Argument`] plus an
//! ordered parameter list, optionally backed by a [`NativeFn`]. Two functions
//! compare through a directional compatibility test, not equality: `f.test(g)`
//! asks whether `f` may stand in for a call shaped like `g`.

use std::fmt;
use std::sync::Arc;

use crate::argument::{Argument, Match};
use crate::error::CallError;
use crate::value::Value;

/// Type-erased native implementation of a member function.
///
/// Wraps any callable over a mutable argument slice, allowing implementations
/// of different shapes to be stored uniformly in a member table. The inner
/// callable is wrapped in `Arc` so overload sets stay cloneable.
pub struct NativeFn {
    inner: Arc<dyn Fn(&mut [Value]) -> Result<Value, CallError> + Send + Sync>,
}

impl NativeFn {
    /// Create a new `NativeFn` from a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut [Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Call this native function with the given argument slots.
    ///
    /// Slot 0 is the receiver for member functions. The callable may consume
    /// argument slots (leaving them empty) as its signature allows.
    pub fn call(&self, args: &mut [Value]) -> Result<Value, CallError> {
        (self.inner)(args)
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

/// One named operation signature: return slot plus ordered parameters.
#[derive(Clone)]
pub struct Function {
    name: String,
    ret: Argument,
    params: Vec<Argument>,
    callable: Option<NativeFn>,
}

impl Function {
    /// Create a signature with no implementation attached.
    pub fn new(name: impl Into<String>, ret: Argument, params: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            ret,
            params,
            callable: None,
        }
    }

    /// Attach a native implementation.
    pub fn with_callable(mut self, callable: NativeFn) -> Self {
        self.callable = Some(callable);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ret(&self) -> &Argument {
        &self.ret
    }

    #[inline]
    pub fn params(&self) -> &[Argument] {
        &self.params
    }

    /// Whether a native implementation is attached.
    pub fn is_callable(&self) -> bool {
        self.callable.is_some()
    }

    /// Whether a candidate's return slot `value` is acceptable where `target`
    /// is expected. A void candidate return is always acceptable (the result
    /// is discarded); otherwise the test runs in the producer direction:
    /// returning places a value into the caller's slot.
    pub fn test_return(&self, value: &Argument, target: &Argument) -> Match {
        if value.is_void() {
            Match::Exact
        } else {
            target.test(value)
        }
    }

    /// Pairwise argument compatibility, same index for index. Arity mismatch
    /// is [`Match::None`]; otherwise the result is the weakest pair.
    pub fn test_arguments(&self, values: &[Argument], targets: &[Argument]) -> Match {
        if values.len() != targets.len() {
            return Match::None;
        }

        let mut strength = Match::Exact;
        for (value, target) in values.iter().zip(targets.iter()) {
            strength = strength.min(value.test(target));
            if strength == Match::None {
                return Match::None;
            }
        }
        strength
    }

    /// Whether this function may stand in for a call shaped like `other`:
    /// its return must be producible into `other`'s return slot and its
    /// parameters must accept `other`'s arguments in declaration order.
    pub fn test(&self, other: &Function) -> Match {
        self.test_return(&other.ret, &self.ret)
            .min(self.test_arguments(&other.params, &self.params))
    }

    /// Invoke the attached native implementation.
    ///
    /// Compatibility is the resolver's responsibility; invocation trusts the
    /// slots it is given.
    pub fn invoke(&self, args: &mut [Value]) -> Result<Value, CallError> {
        match &self.callable {
            Some(callable) => callable.call(args),
            None => Err(CallError::NotCallable {
                member: self.name.clone(),
            }),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}: {})", self.name, signature(self))
    }
}

/// Render a signature as `RetSpec(ParamSpec, ParamSpec, ...)`.
///
/// Used for diagnostics and ambiguity errors; not meant to be re-parsed.
pub fn signature(function: &Function) -> String {
    signature_of(function.ret(), function.params())
}

/// Render a call shape from explicit parts.
pub fn signature_of(ret: &Argument, params: &[Argument]) -> String {
    let mut out = String::new();
    out.push_str(&ret.print());
    out.push('(');
    for (index, param) in params.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(&param.print());
    }
    out.push(')');
    out
}
