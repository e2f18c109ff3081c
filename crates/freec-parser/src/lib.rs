//! Parser for the Haskell-98 subset accepted by freec.
//!
//! Consumes the layout-processed token stream from `freec-scanner` and
//! produces `freec_ir::Module` values. The parser is the boundary that
//! guarantees the "simplified AST" contract of the pipeline: one-level
//! patterns, no guards, no where-clauses, no sections. Constructs outside
//! the subset are fatal diagnostics, never silent pass-through.

mod decls;
mod exprs;
pub mod ops;
mod types;

use freec_common::{Diagnostic, Fatal, Reporter, Result, Span};
use freec_ir::Module;
use freec_scanner::{Token, TokenKind};

/// Parse one source file into an IR module.
pub fn parse_module(file: &str, tokens: &[Token], reporter: &mut Reporter) -> Result<Module> {
    Parser::new(file, tokens, reporter).module()
}

pub(crate) struct Parser<'a> {
    file: &'a str,
    tokens: &'a [Token],
    pos: usize,
    reporter: &'a mut Reporter,
    /// Counter for internal binder names (wildcards, desugared arguments).
    /// The `#` prefix keeps them outside the source identifier space.
    internal_counter: u32,
}

impl<'a> Parser<'a> {
    fn new(file: &'a str, tokens: &'a [Token], reporter: &'a mut Reporter) -> Self {
        Parser {
            file,
            tokens,
            pos: 0,
            reporter,
            internal_counter: 0,
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    pub(crate) fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn peek_at(&self, ahead: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + ahead)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or_else(Span::dummy, |t| t.span)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it matches.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            return true;
        }
        false
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<Span> {
        if self.peek() == kind {
            return Ok(self.advance().span);
        }
        Err(self.error_here(format!(
            "expected {} {context}, found {}",
            kind.describe(),
            self.peek().describe()
        )))
    }

    pub(crate) fn error_here(&mut self, message: impl Into<String>) -> Fatal {
        let span = self.peek_span();
        self.error_at(span, message)
    }

    pub(crate) fn error_at(&mut self, span: Span, message: impl Into<String>) -> Fatal {
        self.reporter
            .report_fatal(Diagnostic::error(self.file, span, message))
    }

    /// Reject reserved words outside the subset with a pointed message.
    pub(crate) fn check_unsupported(&mut self) -> Result<()> {
        if let TokenKind::Unsupported(word) = self.peek() {
            let word = word.clone();
            return Err(self.error_here(format!("the '{word}' construct is not supported")));
        }
        Ok(())
    }

    /// Fresh internal binder name; `#` keeps it out of the source namespace.
    pub(crate) fn internal_name(&mut self, prefix: &str) -> String {
        let name = format!("#{prefix}{}", self.internal_counter);
        self.internal_counter += 1;
        name
    }

    // =========================================================================
    // Blocks - explicit or layout-inserted braces
    // =========================================================================

    pub(crate) fn open_block(&mut self, context: &str) -> Result<bool> {
        match self.peek() {
            TokenKind::LBrace => {
                self.advance();
                Ok(true)
            }
            TokenKind::VLBrace => {
                self.advance();
                Ok(false)
            }
            _ => Err(self.error_here(format!(
                "expected {context}, found {}",
                self.peek().describe()
            ))),
        }
    }

    pub(crate) fn block_sep(&mut self) -> bool {
        matches!(self.peek(), TokenKind::Semi | TokenKind::VSemi)
    }

    pub(crate) fn close_block(&mut self, explicit: bool, context: &str) -> Result<()> {
        let closer = if explicit {
            TokenKind::RBrace
        } else {
            TokenKind::VRBrace
        };
        self.expect(&closer, context)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests;
