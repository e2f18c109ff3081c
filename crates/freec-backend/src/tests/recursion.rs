use freec_common::Reporter;
use freec_env::Environment;
use freec_ir::{ExprKind, Module};

use super::*;
use crate::context::Converter;

fn parse(source: &str) -> Module {
    let mut reporter = Reporter::new();
    let tokens = freec_scanner::scan("test.hs", source, &mut reporter).expect("scan");
    freec_parser::parse_module("test.hs", &tokens, &mut reporter).expect("parse")
}

fn transform(source: &str, dec_indices: &[usize]) -> TransformedScc {
    let module = parse(source);
    let mut reporter = Reporter::new();
    let mut cx = Converter::new(Environment::new(), "test.hs", None, &mut reporter);
    transform_recursive_scc(&mut cx, &module.func_decls, dec_indices)
}

const LENGTH: &str = "\
length xs = case xs of
  [] -> 0
  y : ys -> length ys
";

#[test]
fn root_case_becomes_one_helper() {
    let result = transform(LENGTH, &[0]);
    assert_eq!(result.helpers.len(), 1);
    assert_eq!(result.drivers.len(), 1);

    let helper = &result.helpers[0];
    assert_eq!(helper.parent, 0);
    assert_eq!(helper.dec_index, 0);
    assert!(helper.at_root);
    assert_eq!(helper.decl.arity(), 1);
    assert_eq!(helper.captured_params, vec![Some(0)]);
}

#[test]
fn driver_calls_the_helper() {
    let result = transform(LENGTH, &[0]);
    let driver = &result.drivers[0];
    let (head, args) = driver.body.app_spine();
    let ExprKind::Var(name) = &head.kind else {
        panic!("driver body must call the helper");
    };
    assert!(name.name.as_str().starts_with('#'));
    assert_eq!(args.len(), 1);
}

#[test]
fn recursive_call_is_inlined_to_the_helper() {
    let result = transform(LENGTH, &[0]);
    let helper = &result.helpers[0];
    // Inside the helper, the `length ys` call has been replaced by the
    // driver's right-hand side, i.e. a call to the helper itself.
    let mut refs = Vec::new();
    helper.decl.body.collect_refs(&mut refs);
    assert!(
        refs.iter().all(|name| name.name.as_str() != "length"),
        "helper still calls the driver: {refs:?}"
    );
    assert!(
        refs.iter()
            .any(|name| name.name.as_str() == helper.decl.ident.name.as_str()),
        "helper does not call itself: {refs:?}"
    );
}

#[test]
fn nested_case_is_not_at_root() {
    let source = "\
sum2 xs = f (case xs of
              [] -> 0
              y : ys -> sum2 ys)
";
    let result = transform(source, &[0]);
    assert_eq!(result.helpers.len(), 1);
    assert!(!result.helpers[0].at_root);
}

#[test]
fn captured_closure_includes_other_locals() {
    // `n` is in scope at the extracted case and used inside it.
    let source = "\
go n xs = case xs of
  [] -> n
  y : ys -> go n ys
";
    let result = transform(source, &[1]);
    let helper = &result.helpers[0];
    assert_eq!(helper.decl.arity(), 2);
    let params: Vec<&str> = helper.decl.args.iter().map(|a| a.ident.as_str()).collect();
    assert!(params.contains(&"n"));
    assert!(params.contains(&"xs"));
    assert_eq!(helper.dec_index, params.iter().position(|p| *p == "xs").unwrap());
    assert_eq!(helper.captured_params.len(), 2);
    assert!(helper.captured_params.iter().all(Option::is_some));
}

#[test]
fn mutual_recursion_produces_one_helper_per_member() {
    let source = "\
even n = case n of
  Zero -> True
  Succ m -> odd m
odd n = case n of
  Zero -> False
  Succ m -> even m
";
    let result = transform(source, &[0, 0]);
    assert_eq!(result.helpers.len(), 2);
    assert_eq!(result.helpers[0].parent, 0);
    assert_eq!(result.helpers[1].parent, 1);

    // After inlining, even's helper calls odd's helper directly.
    let mut refs = Vec::new();
    result.helpers[0].decl.body.collect_refs(&mut refs);
    let odd_helper = result.helpers[1].decl.ident.name.as_str();
    assert!(refs.iter().any(|name| name.name.as_str() == odd_helper));
}

#[test]
fn shadowed_decreasing_argument_is_not_extracted() {
    // The inner lambda rebinds xs; its case must stay where it is.
    let source = "\
f xs = case xs of
  [] -> \\xs -> case xs of
                 [] -> 0
                 y : ys -> 0
  z : zs -> 0
";
    let result = transform(source, &[0]);
    // Only the outer case is extracted; the shadowed one stays inside the
    // helper body unchanged.
    assert_eq!(result.helpers.len(), 1);
    let helper = &result.helpers[0];
    let ExprKind::Case(_, alts) = &helper.decl.body.kind else {
        panic!("helper body is the extracted case");
    };
    let ExprKind::Lambda(_, lambda_body) = &alts[0].rhs.kind else {
        panic!("first alternative holds the lambda");
    };
    assert!(matches!(lambda_body.kind, ExprKind::Case(_, _)));
}
