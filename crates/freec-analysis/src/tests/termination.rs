use freec_common::Reporter;
use freec_ir::{FuncDecl, Module};

use super::*;

fn parse(source: &str) -> Module {
    let mut reporter = Reporter::new();
    let tokens = freec_scanner::scan("test.hs", source, &mut reporter).expect("scan");
    freec_parser::parse_module("test.hs", &tokens, &mut reporter).expect("parse")
}

fn analyze(source: &str, names: &[&str]) -> Result<Vec<usize>> {
    let module = parse(source);
    let funcs: Vec<&FuncDecl> = names
        .iter()
        .map(|name| {
            module
                .func_decls
                .iter()
                .find(|f| f.ident.name.as_str() == *name)
                .expect("function present")
        })
        .collect();
    let mut reporter = Reporter::new();
    find_decreasing_args(&funcs, module.name.as_deref(), "test.hs", &mut reporter)
}

#[test]
fn length_decreases_on_its_list() {
    let source = "length xs = case xs of\n  [] -> 0\n  y : ys -> 1 + length ys\n";
    assert_eq!(analyze(source, &["length"]).unwrap(), vec![0]);
}

#[test]
fn non_decreasing_call_is_rejected() {
    // Passing the scrutinee itself instead of the tail must fail.
    let source = "length xs = case xs of\n  [] -> 0\n  y : ys -> 1 + length xs\n";
    assert!(analyze(source, &["length"]).is_err());
}

#[test]
fn second_argument_can_be_the_decreasing_one() {
    let source = "drop n xs = case xs of\n  [] -> []\n  y : ys -> drop n ys\n";
    assert_eq!(analyze(source, &["drop"]).unwrap(), vec![1]);
}

#[test]
fn lowest_index_tuple_wins() {
    // Both arguments decrease; index 0 must be chosen.
    let source = "zipWeird xs ys = case xs of\n  [] -> []\n  a : as -> case ys of\n             [] -> []\n             b : bs -> zipWeird as bs\n";
    assert_eq!(analyze(source, &["zipWeird"]).unwrap(), vec![0]);
}

#[test]
fn mutual_even_odd() {
    let source = "\
data Nat = Zero | Succ Nat
even n = case n of
  Zero -> True
  Succ m -> odd m
odd n = case n of
  Zero -> False
  Succ m -> even m
";
    assert_eq!(analyze(source, &["even", "odd"]).unwrap(), vec![0, 0]);
}

#[test]
fn nested_case_extends_smaller() {
    // ys is smaller than xs; casing on ys makes its tail smaller too.
    let source = "f xs = case xs of\n  [] -> 0\n  y : ys -> case ys of\n             [] -> 0\n             z : zs -> f zs\n";
    assert_eq!(analyze(source, &["f"]).unwrap(), vec![0]);
}

#[test]
fn case_on_other_variable_does_not_extend() {
    // Casing on `other` must not make its pattern variables smaller.
    let source = "f xs other = case other of\n  z : zs -> f zs other\n  [] -> 0\n";
    assert!(analyze(source, &["f"]).is_err());
}

#[test]
fn shadowed_smaller_variable_is_removed() {
    // The lambda rebinds ys, so the inner call does not decrease.
    let source = "f xs = case xs of\n  [] -> id\n  y : ys -> \\ys -> f ys\n";
    assert!(analyze(source, &["f"]).is_err());
}

#[test]
fn bare_recursive_reference_is_rejected() {
    let source = "f xs = case xs of\n  [] -> 0\n  y : ys -> apply f ys\n";
    assert!(analyze(source, &["f"]).is_err());
}

#[test]
fn under_applied_recursive_call_is_rejected() {
    let source = "f a xs = case xs of\n  [] -> 0\n  y : ys -> apply (f a) ys\n";
    assert!(analyze(source, &["f"]).is_err());
}

#[test]
fn nullary_member_is_fatal() {
    let source = "loop = loop\n";
    assert!(analyze(source, &["loop"]).is_err());
}

#[test]
fn error_points_at_first_declaration() {
    let module = parse("f xs = f xs\n");
    let funcs: Vec<&FuncDecl> = module.func_decls.iter().collect();
    let mut reporter = Reporter::new();
    let result = find_decreasing_args(&funcs, None, "test.hs", &mut reporter);
    assert!(result.is_err());
    let diagnostic = reporter.diagnostics().last().unwrap();
    assert!(diagnostic.message.contains("decreasing argument"));
    assert_eq!(diagnostic.span, module.func_decls[0].ident.span);
}
