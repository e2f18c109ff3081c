//! Lexer for the Haskell-98 subset accepted by freec.
//!
//! This crate provides:
//! - `TokenKind` / `Token` - the token vocabulary
//! - `Lexer` - source text to raw token stream
//! - `layout` - the layout pass inserting virtual braces and semicolons
//! - `scan` - the combined entry point used by the parser

pub mod layout;
pub mod lexer;
pub mod token;

pub use layout::apply_layout;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use freec_common::{Reporter, Result};

/// Scan `source`, apply the layout algorithm, and return the token stream
/// the parser consumes. `file` names the source for diagnostics.
pub fn scan(file: &str, source: &str, reporter: &mut Reporter) -> Result<Vec<Token>> {
    let raw = Lexer::new(file, source).run(reporter)?;
    Ok(apply_layout(source, raw))
}
