use freec_common::Reporter;
use freec_ir::{ExprKind, Module, Name, QName, TypeDecl};
use freec_scanner::scan;

use super::*;

fn parse(source: &str) -> Module {
    let mut reporter = Reporter::new();
    let tokens = scan("test.hs", source, &mut reporter).expect("scan failed");
    parse_module("test.hs", &tokens, &mut reporter).expect("parse failed")
}

fn parse_err(source: &str) -> String {
    let mut reporter = Reporter::new();
    let tokens = scan("test.hs", source, &mut reporter).expect("scan failed");
    let result = parse_module("test.hs", &tokens, &mut reporter);
    assert!(result.is_err(), "expected a parse error");
    reporter.diagnostics().last().unwrap().message.clone()
}

#[test]
fn module_header_and_import() {
    let module = parse("module M where\nimport Prelude\nx :: Integer\nx = 1\n");
    assert_eq!(module.name.as_deref(), Some("M"));
    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.imports[0].module, "Prelude");
    assert_eq!(module.type_sigs.len(), 1);
    assert_eq!(module.func_decls.len(), 1);
}

#[test]
fn headerless_module_has_no_name() {
    let module = parse("x = 1\n");
    assert_eq!(module.name, None);
    assert_eq!(module.coq_name(), "Main");
}

#[test]
fn signature_collects_type_vars_in_order() {
    let module = parse("const :: a -> b -> a\nconst x y = x\n");
    let sig = &module.type_sigs[0];
    assert_eq!(sig.name, Name::ident("const"));
    let vars: Vec<&str> = sig.schema.type_args.iter().map(|v| v.ident.as_str()).collect();
    assert_eq!(vars, vec!["a", "b"]);
}

#[test]
fn grouped_signature_expands_to_each_name() {
    let module = parse("f, g :: Integer\nf = 1\ng = 2\n");
    assert_eq!(module.type_sigs.len(), 2);
    assert_eq!(module.type_sigs[0].name, Name::ident("f"));
    assert_eq!(module.type_sigs[1].name, Name::ident("g"));
}

#[test]
fn data_declaration() {
    let module = parse("data Tree a = Leaf a | Branch (Forest a)\n");
    let TypeDecl::Data(data) = &module.type_decls[0] else {
        panic!("expected a data declaration");
    };
    assert_eq!(data.ident.name, Name::ident("Tree"));
    assert_eq!(data.type_args.len(), 1);
    assert_eq!(data.cons.len(), 2);
    assert_eq!(data.cons[0].fields.len(), 1);
    assert_eq!(data.cons[1].fields.len(), 1);
}

#[test]
fn type_synonym_declaration() {
    let module = parse("type Forest a = [Tree a]\n");
    let TypeDecl::Syn(syn) = &module.type_decls[0] else {
        panic!("expected a type synonym");
    };
    assert_eq!(syn.ident.name, Name::ident("Forest"));
    assert_eq!(syn.type_args.len(), 1);
}

#[test]
fn case_with_cons_pattern() {
    let module = parse("length xs = case xs of\n  [] -> 0\n  y : ys -> 1\n");
    let func = &module.func_decls[0];
    let ExprKind::Case(_, alts) = &func.body.kind else {
        panic!("expected a case body");
    };
    assert_eq!(alts.len(), 2);
    assert_eq!(alts[0].con.name, QName::symbol("[]"));
    assert_eq!(alts[1].con.name, QName::symbol(":"));
    assert_eq!(alts[1].pats.len(), 2);
}

#[test]
fn operator_precedence_and_associativity() {
    // 1 + 2 * 3 parses as 1 + (2 * 3).
    let module = parse("f = 1 + 2 * 3\n");
    let body = &module.func_decls[0].body;
    let (head, args) = body.app_spine();
    assert_eq!(head.kind, ExprKind::Var(QName::symbol("+")));
    assert_eq!(args.len(), 2);
    let (inner_head, inner_args) = args[1].app_spine();
    assert_eq!(inner_head.kind, ExprKind::Var(QName::symbol("*")));
    assert_eq!(inner_args.len(), 2);
}

#[test]
fn cons_is_right_associative_constructor() {
    let module = parse("f = 1 : 2 : []\n");
    let body = &module.func_decls[0].body;
    let (head, args) = body.app_spine();
    assert_eq!(head.kind, ExprKind::Con(QName::symbol(":")));
    let (tail_head, _) = args[1].app_spine();
    assert_eq!(tail_head.kind, ExprKind::Con(QName::symbol(":")));
}

#[test]
fn list_literal_desugars_to_cons_chain() {
    let module = parse("f = [1, 2]\n");
    let body = &module.func_decls[0].body;
    let (head, args) = body.app_spine();
    assert_eq!(head.kind, ExprKind::Con(QName::symbol(":")));
    let (_, tail_args) = args[1].app_spine();
    assert_eq!(tail_args.len(), 2);
}

#[test]
fn lambda_and_if() {
    let module = parse("f = \\x y -> if x then y else 0\n");
    let ExprKind::Lambda(pats, body) = &module.func_decls[0].body.kind else {
        panic!("expected a lambda");
    };
    assert_eq!(pats.len(), 2);
    assert!(matches!(body.kind, ExprKind::If(_, _, _)));
}

#[test]
fn undefined_and_error_are_special() {
    let module = parse("f = undefined\ng = error \"boom\"\n");
    assert!(matches!(module.func_decls[0].body.kind, ExprKind::Undefined));
    assert!(matches!(
        &module.func_decls[1].body.kind,
        ExprKind::ErrorExpr(msg) if msg == "boom"
    ));
}

#[test]
fn multi_equation_desugars_to_case() {
    let module = parse("head (x : _) = x\nhead [] = undefined\n");
    assert_eq!(module.func_decls.len(), 1);
    let func = &module.func_decls[0];
    assert_eq!(func.ident.name, Name::ident("head"));
    assert_eq!(func.arity(), 1);
    let ExprKind::Case(scrutinee, alts) = &func.body.kind else {
        panic!("expected a desugared case");
    };
    assert!(matches!(&scrutinee.kind, ExprKind::Var(name) if name.name.as_str() == func.args[0].ident));
    assert_eq!(alts.len(), 2);
    assert_eq!(alts[0].con.name, QName::symbol(":"));
    assert_eq!(alts[1].con.name, QName::symbol("[]"));
}

#[test]
fn multi_equation_substitutes_canonical_args() {
    // The second argument is named differently per equation; both bodies
    // must refer to the same canonical argument afterwards.
    let module = parse("f [] a = a\nf (x : xs) b = b\n");
    let func = &module.func_decls[0];
    let ExprKind::Case(_, alts) = &func.body.kind else {
        panic!("expected a desugared case");
    };
    let canonical = &func.args[1].ident;
    for alt in alts {
        assert!(
            matches!(&alt.rhs.kind, ExprKind::Var(name) if name.name.as_str() == *canonical),
            "alternative body was not renamed: {:?}",
            alt.rhs
        );
    }
}

#[test]
fn operator_binding_name() {
    let module = parse("(+++) :: a -> a -> a\n(+++) x y = x\n");
    assert_eq!(module.type_sigs[0].name, Name::symbol("+++"));
    assert_eq!(module.func_decls[0].ident.name, Name::symbol("+++"));
}

#[test]
fn unsupported_let_is_fatal() {
    assert!(parse_err("f = let x = 1 in x\n").contains("'let' construct is not supported"));
}

#[test]
fn unknown_infix_operator_is_fatal() {
    assert!(parse_err("f = x +++ y\n").contains("no fixed fixity"));
}

#[test]
fn bare_variable_alternative_is_fatal() {
    let message = parse_err("f x = case x of\n  y -> y\n");
    assert!(message.contains("variable patterns are not supported"));
}

#[test]
fn nested_pattern_is_fatal() {
    let message = parse_err("f (x : (y : ys)) = x\n");
    assert!(message.contains("nested patterns"));
}

#[test]
fn arity_mismatch_between_equations_is_fatal() {
    let message = parse_err("f [] = 1\nf x y = 2\n");
    assert!(message.contains("different numbers of arguments"));
}

#[test]
fn matching_on_two_columns_is_fatal() {
    let message = parse_err("f [] [] = 1\nf (x:xs) (y:ys) = 2\n");
    assert!(message.contains("more than one argument"));
}

#[test]
fn type_class_context_is_fatal() {
    assert!(parse_err("f :: Eq a => a -> a\nf x = x\n").contains("type-class contexts"));
}

#[test]
fn import_list_is_fatal() {
    assert!(parse_err("import M (f)\n").contains("import lists are not supported"));
}

#[test]
fn wildcards_become_fresh_variables() {
    let module = parse("f _ _ = 1\n");
    let func = &module.func_decls[0];
    assert_eq!(func.arity(), 2);
    assert_ne!(func.args[0].ident, func.args[1].ident);
    assert!(func.args[0].ident.starts_with('#'));
}

#[test]
fn pair_expression_and_pattern() {
    let module = parse("swap p = case p of\n  (a, b) -> (b, a)\n");
    let ExprKind::Case(_, alts) = &module.func_decls[0].body.kind else {
        panic!("expected case");
    };
    assert_eq!(alts[0].con.name, QName::symbol("(,)"));
    assert_eq!(alts[0].pats.len(), 2);
    let (head, args) = alts[0].rhs.app_spine();
    assert_eq!(head.kind, ExprKind::Con(QName::symbol("(,)")));
    assert_eq!(args.len(), 2);
}
