use rustc_hash::FxHashMap;
use smallvec::smallvec;

use super::*;
use freec_common::Span;

fn var(ident: &str) -> Expr {
    Expr::var(Span::dummy(), QName::ident(ident))
}

fn lambda(pats: &[&str], body: Expr) -> Expr {
    let pats = pats
        .iter()
        .map(|p| VarPat::new(Span::dummy(), *p))
        .collect();
    Expr::new(Span::dummy(), ExprKind::Lambda(pats, Box::new(body)))
}

fn case_on(scrutinee: Expr, con: &str, pats: &[&str], rhs: Expr) -> Expr {
    let alt = Alt {
        span: Span::dummy(),
        con: ConPat {
            span: Span::dummy(),
            name: QName::ident(con),
        },
        pats: pats
            .iter()
            .map(|p| VarPat::new(Span::dummy(), *p))
            .collect::<Vec<_>>()
            .into(),
        rhs,
    };
    Expr::new(
        Span::dummy(),
        ExprKind::Case(Box::new(scrutinee), vec![alt]),
    )
}

#[test]
fn unfold_app_returns_spine() {
    let expr = Expr::apply(var("f"), vec![var("x"), var("y")]);
    let (head, args) = expr.unfold_app();
    assert_eq!(head, var("f"));
    assert_eq!(args, vec![var("x"), var("y")]);
}

#[test]
fn free_vars_in_first_occurrence_order() {
    let expr = Expr::apply(var("f"), vec![var("y"), var("x"), var("y")]);
    assert_eq!(expr.free_vars(), vec!["f", "y", "x"]);
}

#[test]
fn free_vars_skip_lambda_bound() {
    let expr = lambda(&["x"], Expr::apply(var("f"), vec![var("x"), var("y")]));
    assert_eq!(expr.free_vars(), vec!["f", "y"]);
}

#[test]
fn free_vars_skip_case_bound() {
    let expr = case_on(var("xs"), "Cons", &["y", "ys"], var("ys"));
    assert_eq!(expr.free_vars(), vec!["xs"]);
}

#[test]
fn subst_replaces_free_occurrences() {
    let expr = Expr::apply(var("f"), vec![var("x")]);
    let mut map = FxHashMap::default();
    map.insert("x".to_string(), var("z"));
    assert_eq!(expr.subst(&map), Expr::apply(var("f"), vec![var("z")]));
}

#[test]
fn subst_respects_shadowing() {
    let expr = lambda(&["x"], var("x"));
    let mut map = FxHashMap::default();
    map.insert("x".to_string(), var("z"));
    assert_eq!(expr.subst(&map), expr);
}

#[test]
fn alpha_rename_renames_binders_and_uses() {
    let expr = lambda(&["x"], Expr::apply(var("x"), vec![var("y")]));
    let mut counter = 0;
    let renamed = expr.alpha_rename(&mut |prefix| {
        counter += 1;
        format!("{prefix}_{counter}")
    });
    let ExprKind::Lambda(pats, body) = &renamed.kind else {
        panic!("expected lambda");
    };
    assert_eq!(pats[0].ident, "x_1");
    let (head, args) = body.app_spine();
    assert_eq!(head, &var("x_1"));
    assert_eq!(args, vec![&var("y")]);
}

#[test]
fn collect_refs_includes_case_constructors() {
    let expr = case_on(var("xs"), "Cons", &["y", "ys"], var("g"));
    let mut refs = Vec::new();
    expr.collect_refs(&mut refs);
    let names: Vec<String> = refs.iter().map(|r| r.to_string()).collect();
    assert_eq!(names, vec!["xs", "Cons", "g"]);
}

#[test]
fn smallvec_alt_pats() {
    let alt_pats: smallvec::SmallVec<[VarPat; 4]> = smallvec![VarPat::new(Span::dummy(), "a")];
    assert_eq!(alt_pats.len(), 1);
}
