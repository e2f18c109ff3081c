use freec_common::Reporter;

use super::*;
use crate::lexer::Lexer;
use crate::token::TokenKind;

fn layout_kinds(source: &str) -> Vec<TokenKind> {
    let mut reporter = Reporter::new();
    let raw = Lexer::new("test.hs", source)
        .run(&mut reporter)
        .expect("lexing failed");
    apply_layout(source, raw)
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn headerless_file_opens_implicit_block() {
    let kinds = layout_kinds("x = y\nz = w\n");
    assert_eq!(kinds[0], TokenKind::VLBrace);
    assert!(kinds.contains(&TokenKind::VSemi));
    assert_eq!(kinds[kinds.len() - 2], TokenKind::VRBrace);
    assert_eq!(kinds[kinds.len() - 1], TokenKind::Eof);
}

#[test]
fn module_header_opens_block_after_where() {
    let kinds = layout_kinds("module M where\nx = y\n");
    let where_at = kinds.iter().position(|k| *k == TokenKind::Where).unwrap();
    assert_eq!(kinds[where_at + 1], TokenKind::VLBrace);
}

#[test]
fn of_block_collects_alternatives() {
    let source = "f = case xs of\n  [] -> a\n  y -> b\n";
    let kinds = layout_kinds(source);
    let of_at = kinds.iter().position(|k| *k == TokenKind::Of).unwrap();
    assert_eq!(kinds[of_at + 1], TokenKind::VLBrace);
    // One virtual semi between the two alternatives.
    let semis: Vec<_> = kinds[of_at..]
        .iter()
        .filter(|k| **k == TokenKind::VSemi)
        .collect();
    assert_eq!(semis.len(), 1);
}

#[test]
fn dedent_closes_of_block() {
    let source = "f = case xs of\n  [] -> a\ng = b\n";
    let kinds = layout_kinds(source);
    // The `g` declaration must be preceded by the closing of the of-block
    // and a separator in the top-level block.
    let g_at = kinds
        .iter()
        .position(|k| *k == TokenKind::VarId("g".into()))
        .unwrap();
    assert_eq!(kinds[g_at - 2], TokenKind::VRBrace);
    assert_eq!(kinds[g_at - 1], TokenKind::VSemi);
}

#[test]
fn paren_closes_inline_of_block() {
    let source = "f = (case xs of [] -> a) \ng = b\n";
    let kinds = layout_kinds(source);
    let rparen_at = kinds.iter().position(|k| *k == TokenKind::RParen).unwrap();
    assert_eq!(kinds[rparen_at - 1], TokenKind::VRBrace);
}

#[test]
fn explicit_braces_suppress_layout() {
    let source = "f = case xs of { [] -> a ; y -> b }\n";
    let kinds = layout_kinds(source);
    assert!(kinds.contains(&TokenKind::LBrace));
    assert!(kinds.contains(&TokenKind::Semi));
    assert!(!kinds.contains(&TokenKind::VSemi) || kinds[0] == TokenKind::VLBrace);
}
