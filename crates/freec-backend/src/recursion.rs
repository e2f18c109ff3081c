//! Recursion transformation.
//!
//! Coq's guard checker wants a `Fixpoint` whose body matches on the
//! decreasing argument at the top level. The source body may match on it
//! at several nested positions instead, so each outermost `case` on the
//! decreasing argument moves into its own helper function (closing over
//! the variables in scope), the original function becomes a non-recursive
//! driver, and calls back into the SCC inside helper bodies are replaced
//! by the drivers' right-hand sides. After that, the helpers are genuinely
//! structurally recursive and the drivers are plain definitions.

use rustc_hash::FxHashMap;

use freec_common::Span;
use freec_ir::{Alt, DeclIdent, Expr, ExprKind, FuncDecl, Name, QName, VarPat};

use crate::context::Converter;

/// A helper extracted from one member of a recursive SCC.
pub struct Helper {
    pub decl: FuncDecl,
    /// Index of the decreasing argument within the helper's parameters.
    pub dec_index: usize,
    /// Index of the SCC member the helper was extracted from.
    pub parent: usize,
    /// For each helper parameter, the parent parameter it captures, when
    /// the captured variable is a parameter and not a local binder. Used
    /// to type the helper's binders from the parent's signature.
    pub captured_params: Vec<Option<usize>>,
    /// Whether the extracted `case` was the whole function body, in which
    /// case the helper's return type is the parent's.
    pub at_root: bool,
}

pub struct TransformedScc {
    pub helpers: Vec<Helper>,
    pub drivers: Vec<FuncDecl>,
}

/// Split a recursive SCC into structurally recursive helpers plus
/// non-recursive drivers.
pub fn transform_recursive_scc(
    cx: &mut Converter<'_>,
    funcs: &[FuncDecl],
    dec_indices: &[usize],
) -> TransformedScc {
    let mut helpers = Vec::new();
    let mut drivers = Vec::with_capacity(funcs.len());

    for (member, func) in funcs.iter().enumerate() {
        let dec_ident = func.args[dec_indices[member]].ident.clone();
        let mut in_scope: Vec<String> = func.args.iter().map(|a| a.ident.clone()).collect();
        let mut extractor = Extractor {
            dec_ident: &dec_ident,
            parent: member,
            parent_name: func.ident.name.as_str().to_string(),
            parent_arity: func.arity(),
            helper_seq: 0,
            helpers: &mut helpers,
        };
        let body = extractor.extract(&func.body, true, true, &mut in_scope);
        drivers.push(FuncDecl {
            body,
            ..func.clone()
        });
    }

    // Driver expansion: replace SCC member calls inside helper bodies by
    // the member's (rewritten) right-hand side. Driver bodies contain no
    // SCC calls anymore, so a single level of expansion suffices.
    let driver_map: FxHashMap<&Name, &FuncDecl> = drivers
        .iter()
        .map(|driver| (&driver.ident.name, driver))
        .collect();
    let inlined: Vec<Expr> = helpers
        .iter()
        .map(|helper| {
            let mut shadowed = Vec::new();
            inline_members(cx, &helper.decl.body, &driver_map, &mut shadowed)
        })
        .collect();
    for (helper, body) in helpers.iter_mut().zip(inlined) {
        helper.decl.body = body;
    }

    TransformedScc { helpers, drivers }
}

struct Extractor<'a> {
    dec_ident: &'a str,
    parent: usize,
    parent_name: String,
    parent_arity: usize,
    helper_seq: u32,
    helpers: &'a mut Vec<Helper>,
}

impl Extractor<'_> {
    /// Rewrite `expr`, replacing each outermost `case` on the decreasing
    /// argument with a call to a fresh helper.
    fn extract(
        &mut self,
        expr: &Expr,
        at_root: bool,
        dec_active: bool,
        in_scope: &mut Vec<String>,
    ) -> Expr {
        if dec_active
            && let ExprKind::Case(scrutinee, _) = &expr.kind
            && is_var_named(scrutinee, self.dec_ident)
        {
            return self.extract_helper(expr, at_root, in_scope);
        }

        let kind = match &expr.kind {
            ExprKind::Var(_)
            | ExprKind::Con(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::Undefined
            | ExprKind::ErrorExpr(_) => expr.kind.clone(),
            ExprKind::App(func, arg) => ExprKind::App(
                Box::new(self.extract(func, false, dec_active, in_scope)),
                Box::new(self.extract(arg, false, dec_active, in_scope)),
            ),
            ExprKind::If(cond, then, els) => ExprKind::If(
                Box::new(self.extract(cond, false, dec_active, in_scope)),
                Box::new(self.extract(then, false, dec_active, in_scope)),
                Box::new(self.extract(els, false, dec_active, in_scope)),
            ),
            ExprKind::Case(scrutinee, alts) => {
                let scrutinee = Box::new(self.extract(scrutinee, false, dec_active, in_scope));
                let alts = alts
                    .iter()
                    .map(|alt| {
                        let depth = in_scope.len();
                        let mut inner_active = dec_active;
                        for pat in &alt.pats {
                            in_scope.push(pat.ident.clone());
                            if pat.ident == self.dec_ident {
                                inner_active = false;
                            }
                        }
                        let rhs = self.extract(&alt.rhs, false, inner_active, in_scope);
                        in_scope.truncate(depth);
                        Alt {
                            span: alt.span,
                            con: alt.con.clone(),
                            pats: alt.pats.clone(),
                            rhs,
                        }
                    })
                    .collect();
                ExprKind::Case(scrutinee, alts)
            }
            ExprKind::Lambda(pats, body) => {
                let depth = in_scope.len();
                let mut inner_active = dec_active;
                for pat in pats {
                    in_scope.push(pat.ident.clone());
                    if pat.ident == self.dec_ident {
                        inner_active = false;
                    }
                }
                let body = self.extract(body, false, inner_active, in_scope);
                in_scope.truncate(depth);
                ExprKind::Lambda(pats.clone(), Box::new(body))
            }
        };
        Expr {
            span: expr.span,
            ty: expr.ty.clone(),
            kind,
        }
    }

    /// Move `expr` (a `case` on the decreasing argument) into a helper and
    /// return the replacing call.
    fn extract_helper(&mut self, expr: &Expr, at_root: bool, in_scope: &mut Vec<String>) -> Expr {
        // The captured closure: free variables of the subexpression that
        // are locally in scope, in first-occurrence order.
        let captured: Vec<String> = expr
            .free_vars()
            .into_iter()
            .filter(|ident| in_scope.contains(ident))
            .collect();
        let dec_index = captured
            .iter()
            .position(|ident| ident == self.dec_ident)
            .expect("scrutinee is free in the extracted case");

        // A captured variable refers to a parent parameter when its nearest
        // enclosing binder is one (the first `parent_arity` scope entries).
        let captured_params: Vec<Option<usize>> = captured
            .iter()
            .map(|ident| {
                let nearest = in_scope.iter().rposition(|bound| bound == ident);
                nearest.filter(|&index| index < self.parent_arity)
            })
            .collect();

        let helper_name = format!("#{}_{}", self.parent_name, self.helper_seq);
        self.helper_seq += 1;

        let args: Vec<VarPat> = captured
            .iter()
            .map(|ident| VarPat::new(Span::dummy(), ident.clone()))
            .collect();
        self.helpers.push(Helper {
            decl: FuncDecl {
                span: expr.span,
                ident: DeclIdent::new(expr.span, Name::ident(helper_name.clone())),
                type_args: Vec::new(),
                args,
                body: expr.clone(),
                return_type: None,
            },
            dec_index,
            parent: self.parent,
            captured_params,
            at_root,
        });

        let call_args: Vec<Expr> = captured
            .into_iter()
            .map(|ident| Expr::var(Span::dummy(), QName::ident(ident)))
            .collect();
        Expr::apply(
            Expr::var(expr.span, QName::ident(helper_name)),
            call_args,
        )
    }
}

/// Replace calls to SCC members with the member's driver body, renaming
/// the driver's binders and substituting its parameters by the call's
/// arguments. Under-applied calls wrap the residue in a lambda.
fn inline_members(
    cx: &mut Converter<'_>,
    expr: &Expr,
    drivers: &FxHashMap<&Name, &FuncDecl>,
    shadowed: &mut Vec<String>,
) -> Expr {
    let (head, args) = expr.app_spine();
    if let ExprKind::Var(name) = &head.kind
        && cx.is_local_name(name)
        && !shadowed.iter().any(|s| s == name.name.as_str())
        && let Some(driver) = drivers.get(&name.name)
    {
        let driver = *driver;
        let inlined_args: Vec<Expr> = args
            .iter()
            .map(|arg| inline_members(cx, arg, drivers, shadowed))
            .collect();
        let renamed = driver.body.alpha_rename(&mut |_| cx.fresh_internal("i"));

        let arity = driver.arity();
        let mut subst = FxHashMap::default();
        let mut residual_pats = Vec::new();
        for (position, param) in driver.args.iter().enumerate() {
            match inlined_args.get(position) {
                Some(arg) => {
                    subst.insert(param.ident.clone(), arg.clone());
                }
                None => {
                    let fresh = cx.fresh_internal("e");
                    residual_pats.push(VarPat::new(Span::dummy(), fresh.clone()));
                    subst.insert(
                        param.ident.clone(),
                        Expr::var(Span::dummy(), QName::ident(fresh)),
                    );
                }
            }
        }
        let mut body = renamed.subst(&subst);
        if !residual_pats.is_empty() {
            body = Expr::new(
                expr.span,
                ExprKind::Lambda(residual_pats, Box::new(body)),
            );
        }
        let extra: Vec<Expr> = inlined_args.into_iter().skip(arity).collect();
        return Expr::apply(body, extra);
    }

    let kind = match &expr.kind {
        ExprKind::Var(_)
        | ExprKind::Con(_)
        | ExprKind::IntLiteral(_)
        | ExprKind::Undefined
        | ExprKind::ErrorExpr(_) => expr.kind.clone(),
        ExprKind::App(func, arg) => ExprKind::App(
            Box::new(inline_members(cx, func, drivers, shadowed)),
            Box::new(inline_members(cx, arg, drivers, shadowed)),
        ),
        ExprKind::If(cond, then, els) => ExprKind::If(
            Box::new(inline_members(cx, cond, drivers, shadowed)),
            Box::new(inline_members(cx, then, drivers, shadowed)),
            Box::new(inline_members(cx, els, drivers, shadowed)),
        ),
        ExprKind::Case(scrutinee, alts) => {
            let scrutinee = Box::new(inline_members(cx, scrutinee, drivers, shadowed));
            let alts = alts
                .iter()
                .map(|alt| {
                    let depth = shadowed.len();
                    shadowed.extend(alt.pats.iter().map(|p| p.ident.clone()));
                    let rhs = inline_members(cx, &alt.rhs, drivers, shadowed);
                    shadowed.truncate(depth);
                    Alt {
                        span: alt.span,
                        con: alt.con.clone(),
                        pats: alt.pats.clone(),
                        rhs,
                    }
                })
                .collect();
            ExprKind::Case(scrutinee, alts)
        }
        ExprKind::Lambda(pats, body) => {
            let depth = shadowed.len();
            shadowed.extend(pats.iter().map(|p| p.ident.clone()));
            let body = inline_members(cx, body, drivers, shadowed);
            shadowed.truncate(depth);
            ExprKind::Lambda(pats.clone(), Box::new(body))
        }
    };
    Expr {
        span: expr.span,
        ty: expr.ty.clone(),
        kind,
    }
}

fn is_var_named(expr: &Expr, ident: &str) -> bool {
    matches!(
        &expr.kind,
        ExprKind::Var(name) if name.module.is_none() && name.name.as_str() == ident
    )
}

#[cfg(test)]
#[path = "tests/recursion.rs"]
mod tests;
