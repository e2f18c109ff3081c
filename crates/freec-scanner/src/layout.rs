//! Layout - inserting virtual braces and semicolons.
//!
//! The Haskell report's layout algorithm, restricted to the subset: implicit
//! blocks open after `where` and `of` (and at the start of a headerless
//! file). A token on a fresh line closes every implicit context indented
//! deeper than it and separates items at the same indentation. A closing
//! bracket that belongs outside an implicit context closes that context
//! first, which is what makes `(case x of ...)` work on one line.

use freec_common::{LineMap, Span};

use crate::token::{Token, TokenKind};

#[derive(Clone, Copy, Debug)]
enum Context {
    Explicit,
    /// Implicit context: indentation column, bracket depth at open time.
    Implicit(usize, usize),
}

/// Rewrite a raw token stream into one with virtual `{` `;` `}` tokens.
#[must_use]
pub fn apply_layout(source: &str, tokens: Vec<Token>) -> Vec<Token> {
    let map = LineMap::build(source);
    let mut out = Vec::with_capacity(tokens.len() + 8);
    let mut contexts: Vec<Context> = Vec::new();
    let mut bracket_depth = 0usize;
    let mut expect_block = false;
    let mut last_line = usize::MAX;

    for (index, token) in tokens.iter().enumerate() {
        let (line, col) = map.position(token.span.start);

        if token.kind == TokenKind::Eof {
            while let Some(Context::Implicit(_, _)) = contexts.last() {
                contexts.pop();
                out.push(Token::new(TokenKind::VRBrace, Span::at(token.span.start)));
            }
            out.push(token.clone());
            break;
        }

        // A headerless file opens an implicit top-level block at its first
        // token, unless the file opens with `module` or an explicit brace.
        if index == 0 && !matches!(token.kind, TokenKind::Module | TokenKind::LBrace) {
            contexts.push(Context::Implicit(col, bracket_depth));
            out.push(Token::new(TokenKind::VLBrace, Span::at(token.span.start)));
            last_line = line;
        }

        if expect_block {
            expect_block = false;
            if token.kind != TokenKind::LBrace {
                contexts.push(Context::Implicit(col, bracket_depth));
                out.push(Token::new(TokenKind::VLBrace, Span::at(token.span.start)));
            }
            last_line = line;
        } else if line != last_line {
            loop {
                match contexts.last() {
                    Some(Context::Implicit(ctx_col, _)) if col < *ctx_col => {
                        contexts.pop();
                        out.push(Token::new(TokenKind::VRBrace, Span::at(token.span.start)));
                    }
                    Some(Context::Implicit(ctx_col, _)) if col == *ctx_col => {
                        out.push(Token::new(TokenKind::VSemi, Span::at(token.span.start)));
                        break;
                    }
                    _ => break,
                }
            }
            last_line = line;
        }

        match &token.kind {
            TokenKind::Where | TokenKind::Of => {
                expect_block = true;
                out.push(token.clone());
            }
            TokenKind::LBrace => {
                contexts.push(Context::Explicit);
                out.push(token.clone());
            }
            TokenKind::RBrace => {
                if matches!(contexts.last(), Some(Context::Explicit)) {
                    contexts.pop();
                }
                out.push(token.clone());
            }
            TokenKind::LParen | TokenKind::LBracket => {
                bracket_depth += 1;
                out.push(token.clone());
            }
            TokenKind::RParen | TokenKind::RBracket => {
                // Close implicit contexts opened inside this bracket pair.
                while let Some(Context::Implicit(_, ctx_depth)) = contexts.last() {
                    if bracket_depth > *ctx_depth {
                        break;
                    }
                    contexts.pop();
                    out.push(Token::new(TokenKind::VRBrace, Span::at(token.span.start)));
                }
                bracket_depth = bracket_depth.saturating_sub(1);
                out.push(token.clone());
            }
            _ => out.push(token.clone()),
        }
    }

    out
}

#[cfg(test)]
#[path = "tests/layout.rs"]
mod tests;
