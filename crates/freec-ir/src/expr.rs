//! Expressions and one-level patterns.
//!
//! `case` alternatives are flat: a constructor pattern applied to variable
//! patterns only. The parser desugars everything deeper or reports it as
//! unsupported, so the passes never see nested patterns.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use freec_common::Span;

use crate::name::QName;
use crate::types::Type;

/// A variable pattern. Wildcards are freshened into variables by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarPat {
    pub span: Span,
    pub ident: String,
}

impl VarPat {
    pub fn new(span: Span, ident: impl Into<String>) -> Self {
        VarPat {
            span,
            ident: ident.into(),
        }
    }
}

/// A constructor pattern head in a `case` alternative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConPat {
    pub span: Span,
    pub name: QName,
}

/// A `case` alternative: constructor pattern, variable patterns, right-hand side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alt {
    pub span: Span,
    pub con: ConPat,
    pub pats: SmallVec<[VarPat; 4]>,
    pub rhs: Expr,
}

/// An expression node: span, optional inferred type, and the node itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub span: Span,
    /// Filled by inference where the backend needs it; `None` otherwise.
    pub ty: Option<Box<Type>>,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// A variable or function reference.
    Var(QName),
    /// A data constructor reference.
    Con(QName),
    App(Box<Expr>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Case(Box<Expr>, Vec<Alt>),
    Lambda(Vec<VarPat>, Box<Expr>),
    IntLiteral(i64),
    Undefined,
    /// `error "message"`.
    ErrorExpr(String),
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Expr {
            span,
            ty: None,
            kind,
        }
    }

    pub fn var(span: Span, name: QName) -> Self {
        Expr::new(span, ExprKind::Var(name))
    }

    pub fn con(span: Span, name: QName) -> Self {
        Expr::new(span, ExprKind::Con(name))
    }

    pub fn app(func: Expr, arg: Expr) -> Self {
        let span = func.span.merge(arg.span);
        Expr::new(span, ExprKind::App(Box::new(func), Box::new(arg)))
    }

    /// Apply `func` to `args` left to right.
    pub fn apply(func: Expr, args: Vec<Expr>) -> Self {
        args.into_iter().fold(func, Expr::app)
    }

    pub fn int(span: Span, value: i64) -> Self {
        Expr::new(span, ExprKind::IntLiteral(value))
    }

    /// Split an application chain into its head and argument list, by value.
    #[must_use]
    pub fn unfold_app(self) -> (Expr, Vec<Expr>) {
        let mut head = self;
        let mut args = Vec::new();
        while let ExprKind::App(func, arg) = head.kind {
            args.push(*arg);
            head = *func;
        }
        args.reverse();
        (head, args)
    }

    /// Borrowing variant of [`Expr::unfold_app`].
    #[must_use]
    pub fn app_spine(&self) -> (&Expr, Vec<&Expr>) {
        let mut head = self;
        let mut args = Vec::new();
        while let ExprKind::App(func, arg) = &head.kind {
            args.push(arg.as_ref());
            head = func;
        }
        args.reverse();
        (head, args)
    }

    /// Free variable identifiers in first-occurrence order.
    ///
    /// Only unqualified `Var` references count; qualified references always
    /// name a top-level entity, never a local binder.
    #[must_use]
    pub fn free_vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut bound = Vec::new();
        self.collect_free_vars(&mut bound, &mut out);
        out
    }

    fn collect_free_vars(&self, bound: &mut Vec<String>, out: &mut Vec<String>) {
        match &self.kind {
            ExprKind::Var(name) => {
                if name.module.is_none() {
                    let ident = name.name.as_str();
                    if !bound.iter().any(|b| b == ident) && !out.iter().any(|o| o == ident) {
                        out.push(ident.to_string());
                    }
                }
            }
            ExprKind::Con(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::Undefined
            | ExprKind::ErrorExpr(_) => {}
            ExprKind::App(func, arg) => {
                func.collect_free_vars(bound, out);
                arg.collect_free_vars(bound, out);
            }
            ExprKind::If(cond, then, els) => {
                cond.collect_free_vars(bound, out);
                then.collect_free_vars(bound, out);
                els.collect_free_vars(bound, out);
            }
            ExprKind::Case(scrutinee, alts) => {
                scrutinee.collect_free_vars(bound, out);
                for alt in alts {
                    let depth = bound.len();
                    bound.extend(alt.pats.iter().map(|p| p.ident.clone()));
                    alt.rhs.collect_free_vars(bound, out);
                    bound.truncate(depth);
                }
            }
            ExprKind::Lambda(pats, body) => {
                let depth = bound.len();
                bound.extend(pats.iter().map(|p| p.ident.clone()));
                body.collect_free_vars(bound, out);
                bound.truncate(depth);
            }
        }
    }

    /// Substitute free variables by the given mapping.
    ///
    /// Shadowing binders stop the substitution for their subtree. Callers
    /// that substitute open terms must alpha-rename the replacement's
    /// binders first (see [`Expr::alpha_rename`]); this function does not
    /// rename on its own.
    #[must_use]
    pub fn subst(&self, map: &FxHashMap<String, Expr>) -> Expr {
        if map.is_empty() {
            return self.clone();
        }
        let kind = match &self.kind {
            ExprKind::Var(name) => {
                if name.module.is_none()
                    && let Some(replacement) = map.get(name.name.as_str())
                {
                    return replacement.clone();
                }
                self.kind.clone()
            }
            ExprKind::Con(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::Undefined
            | ExprKind::ErrorExpr(_) => self.kind.clone(),
            ExprKind::App(func, arg) => {
                ExprKind::App(Box::new(func.subst(map)), Box::new(arg.subst(map)))
            }
            ExprKind::If(cond, then, els) => ExprKind::If(
                Box::new(cond.subst(map)),
                Box::new(then.subst(map)),
                Box::new(els.subst(map)),
            ),
            ExprKind::Case(scrutinee, alts) => {
                let scrutinee = Box::new(scrutinee.subst(map));
                let alts = alts
                    .iter()
                    .map(|alt| {
                        let inner = without_bound(map, alt.pats.iter().map(|p| p.ident.as_str()));
                        Alt {
                            span: alt.span,
                            con: alt.con.clone(),
                            pats: alt.pats.clone(),
                            rhs: alt.rhs.subst(&inner),
                        }
                    })
                    .collect();
                ExprKind::Case(scrutinee, alts)
            }
            ExprKind::Lambda(pats, body) => {
                let inner = without_bound(map, pats.iter().map(|p| p.ident.as_str()));
                ExprKind::Lambda(pats.clone(), Box::new(body.subst(&inner)))
            }
        };
        Expr {
            span: self.span,
            ty: self.ty.clone(),
            kind,
        }
    }

    /// Rename every binder in this expression with the supplied fresh-name
    /// source, rewriting bound occurrences consistently.
    ///
    /// After renaming, all binders are distinct from anything the fresh-name
    /// source can ever have produced before, so a subsequent [`Expr::subst`]
    /// cannot capture.
    #[must_use]
    pub fn alpha_rename(&self, fresh: &mut dyn FnMut(&str) -> String) -> Expr {
        self.alpha_rename_under(&FxHashMap::default(), fresh)
    }

    fn alpha_rename_under(
        &self,
        renaming: &FxHashMap<String, String>,
        fresh: &mut dyn FnMut(&str) -> String,
    ) -> Expr {
        let kind = match &self.kind {
            ExprKind::Var(name) => {
                if name.module.is_none()
                    && let Some(new_ident) = renaming.get(name.name.as_str())
                {
                    ExprKind::Var(QName::ident(new_ident.clone()))
                } else {
                    self.kind.clone()
                }
            }
            ExprKind::Con(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::Undefined
            | ExprKind::ErrorExpr(_) => self.kind.clone(),
            ExprKind::App(func, arg) => ExprKind::App(
                Box::new(func.alpha_rename_under(renaming, fresh)),
                Box::new(arg.alpha_rename_under(renaming, fresh)),
            ),
            ExprKind::If(cond, then, els) => ExprKind::If(
                Box::new(cond.alpha_rename_under(renaming, fresh)),
                Box::new(then.alpha_rename_under(renaming, fresh)),
                Box::new(els.alpha_rename_under(renaming, fresh)),
            ),
            ExprKind::Case(scrutinee, alts) => {
                let scrutinee = Box::new(scrutinee.alpha_rename_under(renaming, fresh));
                let alts = alts
                    .iter()
                    .map(|alt| {
                        let mut inner = renaming.clone();
                        let pats = alt
                            .pats
                            .iter()
                            .map(|p| {
                                let new_ident = fresh(&p.ident);
                                inner.insert(p.ident.clone(), new_ident.clone());
                                VarPat::new(p.span, new_ident)
                            })
                            .collect();
                        Alt {
                            span: alt.span,
                            con: alt.con.clone(),
                            pats,
                            rhs: alt.rhs.alpha_rename_under(&inner, fresh),
                        }
                    })
                    .collect();
                ExprKind::Case(scrutinee, alts)
            }
            ExprKind::Lambda(pats, body) => {
                let mut inner = renaming.clone();
                let pats = pats
                    .iter()
                    .map(|p| {
                        let new_ident = fresh(&p.ident);
                        inner.insert(p.ident.clone(), new_ident.clone());
                        VarPat::new(p.span, new_ident)
                    })
                    .collect();
                ExprKind::Lambda(pats, Box::new(body.alpha_rename_under(&inner, fresh)))
            }
        };
        Expr {
            span: self.span,
            ty: self.ty.clone(),
            kind,
        }
    }

    /// Collect every `Var` and `Con` name referenced in this expression.
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a QName>) {
        match &self.kind {
            ExprKind::Var(name) | ExprKind::Con(name) => out.push(name),
            ExprKind::IntLiteral(_) | ExprKind::Undefined | ExprKind::ErrorExpr(_) => {}
            ExprKind::App(func, arg) => {
                func.collect_refs(out);
                arg.collect_refs(out);
            }
            ExprKind::If(cond, then, els) => {
                cond.collect_refs(out);
                then.collect_refs(out);
                els.collect_refs(out);
            }
            ExprKind::Case(scrutinee, alts) => {
                scrutinee.collect_refs(out);
                for alt in alts {
                    out.push(&alt.con.name);
                    alt.rhs.collect_refs(out);
                }
            }
            ExprKind::Lambda(_, body) => body.collect_refs(out),
        }
    }
}

fn without_bound<'a>(
    map: &FxHashMap<String, Expr>,
    bound: impl Iterator<Item = &'a str>,
) -> FxHashMap<String, Expr> {
    let mut inner = map.clone();
    for ident in bound {
        inner.remove(ident);
    }
    inner
}

#[cfg(test)]
#[path = "tests/expr.rs"]
mod tests;
