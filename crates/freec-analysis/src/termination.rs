//! Termination analysis - finding decreasing arguments.
//!
//! For a recursive SCC of functions, enumerate every tuple of argument
//! indices and keep the first one under which every recursive call in
//! every body shrinks the chosen argument. "Shrinks" is syntactic: the
//! argument at the decreasing position must be a variable bound by a
//! `case` on the caller's decreasing argument (or on a variable already
//! known to be smaller).

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use freec_common::{Diagnostic, Reporter, Result};
use freec_ir::{Expr, ExprKind, FuncDecl, Name};

/// Find a decreasing-argument index for every member of a recursive SCC.
///
/// Returns one index per function, in the order given. Fatal if no tuple
/// of argument positions passes the structural-descent check.
pub fn find_decreasing_args(
    funcs: &[&FuncDecl],
    module: Option<&str>,
    file: &str,
    reporter: &mut Reporter,
) -> Result<Vec<usize>> {
    let scc: FxHashMap<&Name, usize> = funcs
        .iter()
        .enumerate()
        .map(|(position, func)| (&func.ident.name, position))
        .collect();

    let arities: Vec<usize> = funcs.iter().map(|f| f.arity()).collect();
    if arities.contains(&0) {
        // A nullary member can never decrease anything.
        let first = funcs[0];
        return Err(reporter.report_fatal(Diagnostic::error(
            file,
            first.ident.span,
            format!(
                "cannot determine a decreasing argument for '{}'",
                first.ident.name
            ),
        )));
    }

    // Odometer enumeration; lexicographic order makes "lowest tuple wins"
    // the enumeration order itself.
    let mut tuple = vec![0usize; funcs.len()];
    loop {
        if tuple_passes(funcs, &scc, &tuple, module) {
            debug!(?tuple, "decreasing arguments found");
            return Ok(tuple);
        }
        let mut position = funcs.len();
        loop {
            if position == 0 {
                let first = funcs[0];
                return Err(reporter.report_fatal(Diagnostic::error(
                    file,
                    first.ident.span,
                    format!(
                        "cannot determine a decreasing argument for '{}'",
                        first.ident.name
                    ),
                )));
            }
            position -= 1;
            tuple[position] += 1;
            if tuple[position] < arities[position] {
                break;
            }
            tuple[position] = 0;
        }
    }
}

fn tuple_passes(
    funcs: &[&FuncDecl],
    scc: &FxHashMap<&Name, usize>,
    tuple: &[usize],
    module: Option<&str>,
) -> bool {
    funcs.iter().enumerate().all(|(position, func)| {
        let dec_ident = &func.args[tuple[position]].ident;
        let checker = Checker { scc, tuple, module };
        checker.check(
            &func.body,
            Some(dec_ident.as_str()),
            &FxHashSet::default(),
        )
    })
}

struct Checker<'a> {
    scc: &'a FxHashMap<&'a Name, usize>,
    tuple: &'a [usize],
    module: Option<&'a str>,
}

impl Checker<'_> {
    /// Index into the SCC if this expression references a member.
    fn scc_member(&self, expr: &Expr) -> Option<usize> {
        let ExprKind::Var(name) = &expr.kind else {
            return None;
        };
        let local = match &name.module {
            None => true,
            Some(m) => Some(m.as_str()) == self.module,
        };
        if local { self.scc.get(&name.name).copied() } else { None }
    }

    /// Check one expression. `dec` is the caller's decreasing variable
    /// (`None` once shadowed); `smaller` holds the variables known to be
    /// structurally smaller than it.
    fn check(&self, expr: &Expr, dec: Option<&str>, smaller: &FxHashSet<String>) -> bool {
        match &expr.kind {
            // A bare reference to an SCC member is a call we cannot verify.
            ExprKind::Var(_) => self.scc_member(expr).is_none(),
            ExprKind::Con(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::Undefined
            | ExprKind::ErrorExpr(_) => true,
            ExprKind::App(_, _) => {
                let (head, args) = expr.app_spine();
                if let Some(member) = self.scc_member(head) {
                    let dec_position = self.tuple[member];
                    // The decreasing position must be present and hold a
                    // variable that is already smaller.
                    let decreases = args.get(dec_position).is_some_and(|arg| {
                        matches!(
                            &arg.kind,
                            ExprKind::Var(name)
                                if name.module.is_none()
                                    && smaller.contains(name.name.as_str())
                        )
                    });
                    decreases && args.iter().all(|arg| self.check(arg, dec, smaller))
                } else {
                    self.check(head, dec, smaller)
                        && args.iter().all(|arg| self.check(arg, dec, smaller))
                }
            }
            ExprKind::If(cond, then, els) => {
                self.check(cond, dec, smaller)
                    && self.check(then, dec, smaller)
                    && self.check(els, dec, smaller)
            }
            ExprKind::Case(scrutinee, alts) => {
                if !self.check(scrutinee, dec, smaller) {
                    return false;
                }
                // A case on the decreasing variable (or on something
                // already smaller) makes the bound pattern variables
                // smaller in each alternative.
                let extends = matches!(
                    &scrutinee.kind,
                    ExprKind::Var(name)
                        if name.module.is_none()
                            && (Some(name.name.as_str()) == dec
                                || smaller.contains(name.name.as_str()))
                );
                alts.iter().all(|alt| {
                    let mut inner_smaller = smaller.clone();
                    let mut inner_dec = dec;
                    for pat in &alt.pats {
                        inner_smaller.remove(&pat.ident);
                        if Some(pat.ident.as_str()) == inner_dec {
                            inner_dec = None;
                        }
                    }
                    if extends {
                        for pat in &alt.pats {
                            inner_smaller.insert(pat.ident.clone());
                        }
                    }
                    self.check(&alt.rhs, inner_dec, &inner_smaller)
                })
            }
            ExprKind::Lambda(pats, body) => {
                let mut inner_smaller = smaller.clone();
                let mut inner_dec = dec;
                for pat in pats {
                    inner_smaller.remove(&pat.ident);
                    if Some(pat.ident.as_str()) == inner_dec {
                        inner_dec = None;
                    }
                }
                self.check(body, inner_dec, &inner_smaller)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/termination.rs"]
mod tests;
