//! Types - first-order types with prenex type variables.
//!
//! All types have kind `*`. Type constructors are applied via `App`; the
//! function arrow is its own node so the lifter can treat argument and
//! result positions specially.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use freec_common::Span;

use crate::name::QName;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// A type variable, e.g. `a`.
    Var(Span, String),
    /// A type constructor, e.g. `Integer` or `Tree`.
    Con(Span, QName),
    /// Type application, e.g. `Tree a`.
    App(Span, Box<Type>, Box<Type>),
    /// The function arrow, e.g. `a -> b`.
    Func(Span, Box<Type>, Box<Type>),
}

impl Type {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Type::Var(span, _)
            | Type::Con(span, _)
            | Type::App(span, _, _)
            | Type::Func(span, _, _) => *span,
        }
    }

    pub fn app(lhs: Type, rhs: Type) -> Type {
        let span = lhs.span().merge(rhs.span());
        Type::App(span, Box::new(lhs), Box::new(rhs))
    }

    pub fn func(arg: Type, res: Type) -> Type {
        let span = arg.span().merge(res.span());
        Type::Func(span, Box::new(arg), Box::new(res))
    }

    /// Split an application chain into its head and argument list.
    ///
    /// `Tree a b` yields `(Tree, [a, b])`; a non-application yields itself
    /// with no arguments.
    #[must_use]
    pub fn app_spine(&self) -> (&Type, Vec<&Type>) {
        let mut head = self;
        let mut args = Vec::new();
        while let Type::App(_, lhs, rhs) = head {
            args.push(rhs.as_ref());
            head = lhs;
        }
        args.reverse();
        (head, args)
    }

    /// Split `a -> b -> c` into `([a, b], c)`.
    #[must_use]
    pub fn arrow_spine(&self) -> (Vec<&Type>, &Type) {
        let mut args = Vec::new();
        let mut res = self;
        while let Type::Func(_, arg, rest) = res {
            args.push(arg.as_ref());
            res = rest;
        }
        (args, res)
    }

    /// Substitute type variables by the given mapping.
    #[must_use]
    pub fn subst(&self, map: &FxHashMap<String, Type>) -> Type {
        match self {
            Type::Var(_, ident) => match map.get(ident) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            Type::Con(_, _) => self.clone(),
            Type::App(span, lhs, rhs) => Type::App(
                *span,
                Box::new(lhs.subst(map)),
                Box::new(rhs.subst(map)),
            ),
            Type::Func(span, arg, res) => Type::Func(
                *span,
                Box::new(arg.subst(map)),
                Box::new(res.subst(map)),
            ),
        }
    }

    /// Collect every type-constructor name referenced in this type.
    pub fn collect_cons<'a>(&'a self, out: &mut Vec<&'a QName>) {
        match self {
            Type::Var(_, _) => {}
            Type::Con(_, name) => out.push(name),
            Type::App(_, lhs, rhs) => {
                lhs.collect_cons(out);
                rhs.collect_cons(out);
            }
            Type::Func(_, arg, res) => {
                arg.collect_cons(out);
                res.collect_cons(out);
            }
        }
    }

    /// Collect free type-variable identifiers in first-occurrence order.
    pub fn collect_vars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Type::Var(_, ident) => {
                if !out.contains(&ident.as_str()) {
                    out.push(ident);
                }
            }
            Type::Con(_, _) => {}
            Type::App(_, lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Type::Func(_, arg, res) => {
                arg.collect_vars(out);
                res.collect_vars(out);
            }
        }
    }
}

/// A type-variable binder in a declaration head or schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeVarDecl {
    pub span: Span,
    pub ident: String,
}

impl TypeVarDecl {
    pub fn new(span: Span, ident: impl Into<String>) -> Self {
        TypeVarDecl {
            span,
            ident: ident.into(),
        }
    }
}

/// A prenex type schema: `forall a b. body`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub span: Span,
    pub type_args: Vec<TypeVarDecl>,
    pub body: Type,
}

impl TypeSchema {
    pub fn new(span: Span, type_args: Vec<TypeVarDecl>, body: Type) -> Self {
        TypeSchema {
            span,
            type_args,
            body,
        }
    }

    /// Schema with no bound variables.
    pub fn monotype(body: Type) -> Self {
        TypeSchema {
            span: body.span(),
            type_args: Vec::new(),
            body,
        }
    }
}

#[cfg(test)]
#[path = "tests/types.rs"]
mod tests;
