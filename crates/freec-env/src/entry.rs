//! Environment entries.
//!
//! Entries are immutable once created. Top-level entries are registered
//! before any body is converted so mutual dependencies resolve; scoped
//! entries (type variables, lambda- and pattern-bound variables) live in a
//! frame that is popped when the binding construct ends.

use freec_ir::{QName, Type};

/// The two independent scopes of the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Type constructors, type synonyms, type variables.
    Type,
    /// Data constructors, functions, variables.
    Value,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Type => write!(f, "type"),
            Scope::Value => write!(f, "value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A data type constructor.
    Data { arity: usize },
    /// A type synonym with its expansion.
    TypeSyn {
        arity: usize,
        type_args: Vec<String>,
        body: Type,
    },
    /// A locally bound type variable.
    TypeVar,
    /// A data constructor and its smart constructor.
    Con {
        arity: usize,
        arg_types: Vec<Type>,
        return_type: Option<Type>,
        smart_target: String,
    },
    /// A function.
    Func {
        arity: usize,
        type_args: Vec<String>,
        arg_types: Vec<Type>,
        return_type: Option<Type>,
        partial: bool,
    },
    /// A locally bound variable. `pure` marks the structurally-decreasing
    /// binder of a fixpoint, the one variable that is not lifted into the
    /// free monad.
    Var { pure: bool },
}

impl EntryKind {
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            EntryKind::Data { .. } | EntryKind::TypeSyn { .. } | EntryKind::TypeVar => Scope::Type,
            EntryKind::Con { .. } | EntryKind::Func { .. } | EntryKind::Var { .. } => Scope::Value,
        }
    }

    /// What to call this entry in diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            EntryKind::Data { .. } => "type constructor",
            EntryKind::TypeSyn { .. } => "type synonym",
            EntryKind::TypeVar => "type variable",
            EntryKind::Con { .. } => "constructor",
            EntryKind::Func { .. } => "function",
            EntryKind::Var { .. } => "value",
        }
    }
}

/// One entry of the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Original name, qualified with the defining module where there is one.
    pub original: QName,
    /// The Gallina identifier this entry renders to. Unique per module.
    pub target: String,
    pub kind: EntryKind,
}

impl Entry {
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.kind.scope()
    }

    /// Arity of a callable entry; `None` for variables and type variables.
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            EntryKind::Data { arity }
            | EntryKind::TypeSyn { arity, .. }
            | EntryKind::Con { arity, .. }
            | EntryKind::Func { arity, .. } => Some(*arity),
            EntryKind::TypeVar | EntryKind::Var { .. } => None,
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self.kind, EntryKind::Func { partial: true, .. })
    }

    #[must_use]
    pub fn is_pure_var(&self) -> bool {
        matches!(self.kind, EntryKind::Var { pure: true })
    }
}
