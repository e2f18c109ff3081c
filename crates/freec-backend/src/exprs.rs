//! Expression lifting.
//!
//! Every emitted term has type `Free Shape Pos t*` for some `t`. Known
//! functions and constructors apply directly (their parameters are already
//! monadic); everything else goes through `>>=`. Bind generation
//! short-circuits over `pure`, so the decreasing-argument binder of a
//! fixpoint (the one pure variable) turns a `case` into a plain `match`.

use std::sync::Arc;

use freec_common::{Result, Span};
use freec_env::{Entry, EntryKind, Scope};
use freec_ir::{Alt, Expr, ExprKind};

use freec_env::renamer::{FRESH_ARG_PREFIX, FRESH_FUNC_PREFIX};

use crate::context::{Converter, PARTIAL_ARG, POS, SHAPE};
use crate::gallina::{Binder, Equation, Term};

impl Converter<'_> {
    pub fn convert_expr(&mut self, expr: &Expr) -> Result<Term> {
        let (head, args) = expr.app_spine();
        let mut arg_terms = Vec::with_capacity(args.len());
        for arg in &args {
            arg_terms.push(self.convert_expr(arg)?);
        }

        match &head.kind {
            ExprKind::Con(name) => {
                let entry = self.resolve(Scope::Value, name, head.span, "constructor")?;
                self.convert_callable(&entry, arg_terms, head.span)
            }
            ExprKind::Var(name) => {
                let entry = self.resolve(Scope::Value, name, head.span, "function or variable")?;
                match &entry.kind {
                    EntryKind::Var { pure } => {
                        let base = if *pure {
                            Term::pure(Term::qualid(entry.target.clone()))
                        } else {
                            Term::qualid(entry.target.clone())
                        };
                        self.apply_monadic(base, arg_terms)
                    }
                    EntryKind::Func { .. } | EntryKind::Con { .. } => {
                        self.convert_callable(&entry, arg_terms, head.span)
                    }
                    _ => Err(self.fatal(
                        head.span,
                        format!("'{name}' is not a value-level name"),
                    )),
                }
            }
            ExprKind::If(cond, then, els) => {
                let cond_term = self.convert_expr(cond)?;
                let prefix = bind_prefix(&cond_term);
                let branches = self.bind(cond_term, &prefix, |cx, cond_value| {
                    let then_term = cx.convert_expr(then)?;
                    let else_term = cx.convert_expr(els)?;
                    Ok(Term::Match(
                        Box::new(cond_value),
                        vec![
                            Equation {
                                con: "true".to_string(),
                                args: Vec::new(),
                                rhs: then_term,
                            },
                            Equation {
                                con: "false".to_string(),
                                args: Vec::new(),
                                rhs: else_term,
                            },
                        ],
                    ))
                })?;
                self.apply_monadic(branches, arg_terms)
            }
            ExprKind::Case(scrutinee, alts) => {
                let scrutinee_term = self.convert_expr(scrutinee)?;
                let prefix = bind_prefix(&scrutinee_term);
                let matched = self.bind(scrutinee_term, &prefix, |cx, value| {
                    let mut equations = Vec::with_capacity(alts.len());
                    for alt in alts {
                        equations.push(cx.convert_alt(alt)?);
                    }
                    Ok(Term::Match(Box::new(value), equations))
                })?;
                self.apply_monadic(matched, arg_terms)
            }
            ExprKind::Lambda(pats, body) => {
                let lambda = self.with_scope(|cx| {
                    let mut targets = Vec::with_capacity(pats.len());
                    for pat in pats {
                        targets.push(cx.bind_value_var(&pat.ident, pat.span, false)?);
                    }
                    let mut term = cx.convert_expr(body)?;
                    for target in targets.into_iter().rev() {
                        term = Term::pure(Term::Fun(
                            vec![Binder::untyped(target)],
                            Box::new(term),
                        ));
                    }
                    Ok(term)
                })?;
                self.apply_monadic(lambda, arg_terms)
            }
            ExprKind::IntLiteral(value) => {
                self.apply_monadic(Term::pure(Term::Int(*value)), arg_terms)
            }
            ExprKind::Undefined => {
                let term = Term::app(
                    Term::qualid("undefined"),
                    vec![
                        Term::qualid(SHAPE),
                        Term::qualid(POS),
                        Term::qualid(PARTIAL_ARG),
                    ],
                );
                self.apply_monadic(term, arg_terms)
            }
            ExprKind::ErrorExpr(message) => {
                let term = Term::app(
                    Term::qualid("error"),
                    vec![
                        Term::qualid(SHAPE),
                        Term::qualid(POS),
                        Term::qualid(PARTIAL_ARG),
                        Term::Str(message.clone()),
                    ],
                );
                self.apply_monadic(term, arg_terms)
            }
            ExprKind::App(_, _) => unreachable!("app_spine returns a non-application head"),
        }
    }

    /// A call to a function or constructor entry: eta-expand to full arity,
    /// pass the generic (and `Partial`) arguments, unwrap the decreasing
    /// argument when the callee is a recursive helper, and feed any
    /// remaining arguments through `>>=`.
    fn convert_callable(
        &mut self,
        entry: &Arc<Entry>,
        mut arg_terms: Vec<Term>,
        span: Span,
    ) -> Result<Term> {
        let arity = entry.arity().unwrap_or(0);

        if arg_terms.len() < arity {
            // Eta-expansion: fresh binders up to arity, wrapped in `pure`
            // lambdas. Only this outermost call is expanded.
            let missing: Vec<String> = (arg_terms.len()..arity)
                .map(|_| self.fresh(FRESH_ARG_PREFIX))
                .collect();
            arg_terms.extend(missing.iter().map(|name| Term::qualid(name.clone())));
            let mut term = self.emit_call(entry, arg_terms, span)?;
            for name in missing.into_iter().rev() {
                term = Term::pure(Term::Fun(vec![Binder::untyped(name)], Box::new(term)));
            }
            return Ok(term);
        }

        let rest = arg_terms.split_off(arity);
        let call = self.emit_call(entry, arg_terms, span)?;
        self.apply_monadic(call, rest)
    }

    /// Emit a fully applied call.
    fn emit_call(
        &mut self,
        entry: &Arc<Entry>,
        mut arg_terms: Vec<Term>,
        span: Span,
    ) -> Result<Term> {
        let mut generic = vec![Term::qualid(SHAPE), Term::qualid(POS)];
        if entry.is_partial() {
            generic.push(Term::qualid(PARTIAL_ARG));
        }

        let head = match &entry.kind {
            EntryKind::Con { .. } => Term::qualid(self.smart_ref(entry)),
            _ => Term::qualid(self.entry_ref(entry)),
        };

        let dec = self.env.dec_arg(&entry.original);
        match dec {
            None => {
                generic.extend(arg_terms);
                Ok(Term::app(head, generic))
            }
            Some(position) => {
                // Recursive helper: the decreasing argument passes as a raw
                // value, so it must be unwrapped first.
                if position >= arg_terms.len() {
                    return Err(self.fatal(span, "recursive call drops its decreasing argument"));
                }
                let dec_term = arg_terms[position].clone();
                let prefix = bind_prefix(&dec_term);
                self.bind(dec_term, &prefix, |_cx, opened| {
                    arg_terms[position] = opened;
                    generic.extend(arg_terms);
                    Ok(Term::app(head, generic))
                })
            }
        }
    }

    /// Apply a monadic function value to arguments, one `>>=` per argument.
    fn apply_monadic(&mut self, mut term: Term, args: Vec<Term>) -> Result<Term> {
        for arg in args {
            term = self.bind(term, FRESH_FUNC_PREFIX, |_cx, func| {
                Ok(Term::app(func, vec![arg]))
            })?;
        }
        Ok(term)
    }

    /// `lhs >>= (fun v => build(v))`, short-circuiting when `lhs` is
    /// already `pure x`.
    pub fn bind(
        &mut self,
        lhs: Term,
        prefix: &str,
        build: impl FnOnce(&mut Self, Term) -> Result<Term>,
    ) -> Result<Term> {
        if let Some(inner) = lhs.as_pure() {
            let inner = inner.clone();
            return build(self, inner);
        }
        let var = self.fresh(prefix);
        let rhs = build(self, Term::qualid(var.clone()))?;
        Ok(Term::Bind(Box::new(lhs), var, Box::new(rhs)))
    }

    fn convert_alt(&mut self, alt: &Alt) -> Result<Equation> {
        let entry = self.resolve(Scope::Value, &alt.con.name, alt.con.span, "constructor")?;
        let EntryKind::Con { arity, .. } = &entry.kind else {
            return Err(self.fatal(
                alt.con.span,
                format!("'{}' is not a constructor", alt.con.name),
            ));
        };
        if alt.pats.len() != *arity {
            return Err(self.fatal(
                alt.con.span,
                format!(
                    "constructor '{}' expects {arity} argument{} in this pattern, found {}",
                    alt.con.name,
                    if *arity == 1 { "" } else { "s" },
                    alt.pats.len()
                ),
            ));
        }

        let con = self.entry_ref(&entry);
        self.with_scope(|cx| {
            let mut args = Vec::with_capacity(alt.pats.len());
            for pat in &alt.pats {
                args.push(cx.bind_value_var(&pat.ident, pat.span, false)?);
            }
            let rhs = cx.convert_expr(&alt.rhs)?;
            Ok(Equation { con, args, rhs })
        })
    }

    /// Bind a value variable in the current scope and return its target.
    pub fn bind_value_var(&mut self, ident: &str, span: Span, pure: bool) -> Result<String> {
        let name = freec_ir::Name::ident(ident.to_string());
        let qname = freec_ir::QName::unqualified(name.clone());
        if self.env.bound_in_innermost(Scope::Value, &qname) {
            return Err(self.fatal(span, format!("conflicting definitions for '{ident}'")));
        }
        let entry = self.env.define_local(&name, EntryKind::Var { pure });
        Ok(entry.target.clone())
    }
}

/// Prefix for a generated bind variable: the bound value's own name when
/// it is a plain variable reference, the fresh-argument prefix otherwise.
fn bind_prefix(term: &Term) -> String {
    match term {
        Term::Qualid(name) => name
            .rsplit('.')
            .next()
            .unwrap_or(FRESH_ARG_PREFIX)
            .to_string(),
        _ => FRESH_ARG_PREFIX.to_string(),
    }
}
