//! Ambiguity-free overload sets.
//!
//! An [`Overloads`] is the per-name collection of [`Function`]s in a member
//! table. Registration enforces the no-ambiguity invariant: no two members
//! may be mutually exact-compatible. Resolution is a linear scan in
//! registration order; ties between partial matches are not ranked further
//! (the first structural match wins).

use crate::argument::{Argument, Match};
use crate::error::RegistrationError;
use crate::function::{signature, Function};

/// Named, ambiguity-free set of function overloads.
#[derive(Debug, Clone)]
pub struct Overloads {
    name: String,
    members: Vec<Function>,
}

impl Overloads {
    /// Create an empty overload set for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered overloads in registration order.
    pub fn members(&self) -> &[Function] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add an overload.
    ///
    /// Fails with [`RegistrationError::AmbiguousOverload`] if the candidate
    /// is exact-compatible with an existing member; the set is unchanged on
    /// failure.
    pub fn add(&mut self, function: Function) -> Result<(), RegistrationError> {
        for existing in &self.members {
            if function.test(existing) == Match::Exact {
                return Err(RegistrationError::AmbiguousOverload {
                    name: self.name.clone(),
                    candidate: signature(&function),
                    existing: signature(existing),
                });
            }
        }
        self.members.push(function);
        Ok(())
    }

    /// Whether some member can stand in for a call shaped like `function`,
    /// at any non-`None` strength.
    pub fn test(&self, function: &Function) -> bool {
        self.members
            .iter()
            .any(|member| member.test(function) != Match::None)
    }

    /// Convenience form of [`test`](Self::test): builds a transient call
    /// shape from a return slot and argument list and delegates.
    pub fn test_call(&self, ret: &Argument, args: &[Argument]) -> bool {
        self.resolve(ret, args).is_some()
    }

    /// Resolve a call shape to the first member matching at any non-`None`
    /// strength, in registration order.
    pub fn resolve(&self, ret: &Argument, args: &[Argument]) -> Option<&Function> {
        let probe = Function::new(self.name.clone(), *ret, args.to_vec());
        self.members
            .iter()
            .find(|member| member.test(&probe) != Match::None)
    }

    /// Render every member signature, one per line, indented.
    pub fn print(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = String::new();
        for member in &self.members {
            out.push_str(&pad);
            out.push_str(&signature(member));
            out.push('\n');
        }
        out
    }
}
