//! Type parsing.

use freec_common::{Result, Span};
use freec_ir::{Name, QName, Type};
use freec_scanner::TokenKind;

use crate::Parser;

/// Built-in name of the list type constructor.
pub(crate) const LIST_TYCON: &str = "[]";
/// Built-in name of the pair type constructor.
pub(crate) const PAIR_TYCON: &str = "(,)";

impl Parser<'_> {
    /// A full type: `btype -> btype -> ...`, right associative.
    pub(crate) fn type_expr(&mut self) -> Result<Type> {
        let lhs = self.btype()?;
        if self.eat(&TokenKind::Arrow) {
            let rhs = self.type_expr()?;
            return Ok(Type::func(lhs, rhs));
        }
        if *self.peek() == TokenKind::FatArrow {
            return Err(self.error_here("type-class contexts are not supported"));
        }
        Ok(lhs)
    }

    /// A type application chain: `Tree a b`.
    fn btype(&mut self) -> Result<Type> {
        let head = match self.atype()? {
            Some(ty) => ty,
            None => {
                return Err(self.error_here(format!(
                    "expected a type, found {}",
                    self.peek().describe()
                )));
            }
        };
        let mut ty = head;
        while let Some(arg) = self.atype()? {
            ty = Type::app(ty, arg);
        }
        Ok(ty)
    }

    /// An atomic type, or `None` when the next token cannot start one.
    /// Constructor fields are atomic too; applications there must be
    /// parenthesized, matching Haskell's grammar.
    pub(crate) fn atype(&mut self) -> Result<Option<Type>> {
        let span = self.peek_span();
        let ty = match self.peek().clone() {
            TokenKind::VarId(ident) => {
                self.advance();
                Type::Var(span, ident)
            }
            TokenKind::ConId(ident) => {
                self.advance();
                Type::Con(span, QName::ident(ident))
            }
            TokenKind::QConId(module, ident) => {
                self.advance();
                Type::Con(span, QName::qualified(module, Name::Ident(ident)))
            }
            TokenKind::LBracket => {
                self.advance();
                let elem = self.type_expr()?;
                let end = self.expect(&TokenKind::RBracket, "to close the list type")?;
                let con = Type::Con(Span::new(span.start, end.end), QName::symbol(LIST_TYCON));
                Type::app(con, elem)
            }
            TokenKind::LParen => {
                self.advance();
                let first = self.type_expr()?;
                if self.eat(&TokenKind::Comma) {
                    let second = self.type_expr()?;
                    let end = self.expect(&TokenKind::RParen, "to close the pair type")?;
                    let con =
                        Type::Con(Span::new(span.start, end.end), QName::symbol(PAIR_TYCON));
                    Type::app(Type::app(con, first), second)
                } else {
                    self.expect(&TokenKind::RParen, "to close the parenthesized type")?;
                    first
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(ty))
    }
}
