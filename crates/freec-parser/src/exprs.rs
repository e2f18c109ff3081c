//! Expression parsing.

use freec_common::{Result, Span};
use freec_ir::{Alt, ConPat, Expr, ExprKind, Name, QName, VarPat};
use freec_scanner::TokenKind;

use crate::ops::{Assoc, fixity};
use crate::types::{LIST_TYCON, PAIR_TYCON};
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn expr(&mut self) -> Result<Expr> {
        self.op_expr(0)
    }

    /// Precedence climbing over the fixed operator table.
    fn op_expr(&mut self, min_prec: u8) -> Result<Expr> {
        let mut lhs = self.app_expr()?;
        loop {
            let TokenKind::Sym(sym) = self.peek() else {
                return Ok(lhs);
            };
            let sym = sym.clone();
            let span = self.peek_span();
            let Some((prec, assoc)) = fixity(&sym) else {
                return Err(self.error_at(
                    span,
                    format!(
                        "operator '{sym}' has no fixed fixity; write it applied as '({sym}) x y'"
                    ),
                ));
            };
            if prec < min_prec {
                return Ok(lhs);
            }
            self.advance();
            let next_min = match assoc {
                Assoc::Left | Assoc::None => prec + 1,
                Assoc::Right => prec,
            };
            let rhs = self.op_expr(next_min)?;
            if assoc == Assoc::None
                && let TokenKind::Sym(next) = self.peek()
                && fixity(next).is_some_and(|(p, _)| p == prec)
            {
                return Err(self.error_here(format!(
                    "cannot chain non-associative operator '{sym}'"
                )));
            }
            let op = if sym == ":" {
                Expr::con(span, QName::symbol(sym))
            } else {
                Expr::var(span, QName::symbol(sym))
            };
            lhs = Expr::apply(op, vec![lhs, rhs]);
        }
    }

    /// An application chain, or one of the special forms that extend to the
    /// end of the expression (`if`, `case`, lambda).
    fn app_expr(&mut self) -> Result<Expr> {
        self.check_unsupported()?;
        match self.peek() {
            TokenKind::If => self.if_expr(),
            TokenKind::Case => self.case_expr(),
            TokenKind::Backslash => self.lambda_expr(),
            _ => {
                let head = match self.aexpr()? {
                    Some(expr) => expr,
                    None => {
                        return Err(self.error_here(format!(
                            "expected an expression, found {}",
                            self.peek().describe()
                        )));
                    }
                };
                let mut expr = head;
                while let Some(arg) = self.aexpr()? {
                    expr = Expr::app(expr, arg);
                }
                Ok(expr)
            }
        }
    }

    /// An atomic expression, or `None` when the next token cannot start one.
    fn aexpr(&mut self) -> Result<Option<Expr>> {
        let span = self.peek_span();
        let expr = match self.peek().clone() {
            TokenKind::VarId(ident) => {
                self.advance();
                match ident.as_str() {
                    "undefined" => Expr::new(span, ExprKind::Undefined),
                    "error" => self.error_call(span)?,
                    _ => Expr::var(span, QName::ident(ident)),
                }
            }
            TokenKind::QVarId(module, ident) => {
                self.advance();
                Expr::var(span, QName::qualified(module, Name::Ident(ident)))
            }
            TokenKind::ConId(ident) => {
                self.advance();
                Expr::con(span, QName::ident(ident))
            }
            TokenKind::QConId(module, ident) => {
                self.advance();
                Expr::con(span, QName::qualified(module, Name::Ident(ident)))
            }
            TokenKind::IntLit(value) => {
                self.advance();
                Expr::int(span, value)
            }
            TokenKind::StringLit(_) => {
                return Err(self.error_here(
                    "string literals are only supported as the argument of 'error'",
                ));
            }
            TokenKind::LParen => {
                self.advance();
                self.paren_expr(span)?
            }
            TokenKind::LBracket => {
                self.advance();
                self.list_expr(span)?
            }
            _ => return Ok(None),
        };
        Ok(Some(expr))
    }

    /// `error "message"`.
    fn error_call(&mut self, start: Span) -> Result<Expr> {
        if let TokenKind::StringLit(message) = self.peek().clone() {
            let end = self.advance().span;
            return Ok(Expr::new(
                start.merge(end),
                ExprKind::ErrorExpr(message),
            ));
        }
        Err(self.error_here("'error' must be applied to a string literal"))
    }

    /// The rest of a parenthesized form: operator reference, pair, or group.
    fn paren_expr(&mut self, start: Span) -> Result<Expr> {
        // `(+)` and `(:)` reference an operator as a function.
        if let TokenKind::Sym(sym) = self.peek().clone()
            && *self.peek_at(1) == TokenKind::RParen
        {
            self.advance();
            let end = self.advance().span;
            let span = start.merge(end);
            let expr = if sym == ":" {
                Expr::con(span, QName::symbol(sym))
            } else {
                Expr::var(span, QName::symbol(sym))
            };
            return Ok(expr);
        }
        let first = self.expr()?;
        if self.eat(&TokenKind::Comma) {
            let second = self.expr()?;
            let end = self.expect(&TokenKind::RParen, "to close the pair")?;
            let con = Expr::con(start.merge(end), QName::symbol(PAIR_TYCON));
            return Ok(Expr::apply(con, vec![first, second]));
        }
        self.expect(&TokenKind::RParen, "to close the parenthesized expression")?;
        Ok(first)
    }

    /// `[]` or a bracketed list literal, desugared to a cons chain.
    fn list_expr(&mut self, start: Span) -> Result<Expr> {
        if *self.peek() == TokenKind::RBracket {
            let end = self.advance().span;
            return Ok(Expr::con(start.merge(end), QName::symbol(LIST_TYCON)));
        }
        let mut elems = vec![self.expr()?];
        while self.eat(&TokenKind::Comma) {
            elems.push(self.expr()?);
        }
        let end = self.expect(&TokenKind::RBracket, "to close the list literal")?;
        let span = start.merge(end);
        let mut expr = Expr::con(span, QName::symbol(LIST_TYCON));
        for elem in elems.into_iter().rev() {
            let cons = Expr::con(elem.span, QName::symbol(":"));
            expr = Expr::apply(cons, vec![elem, expr]);
        }
        Ok(expr)
    }

    fn if_expr(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::If, "")?;
        let cond = self.expr()?;
        self.expect(&TokenKind::Then, "after the condition")?;
        let then = self.expr()?;
        self.expect(&TokenKind::Else, "after the then-branch")?;
        let els = self.expr()?;
        let span = start.merge(els.span);
        Ok(Expr::new(
            span,
            ExprKind::If(Box::new(cond), Box::new(then), Box::new(els)),
        ))
    }

    fn lambda_expr(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::Backslash, "")?;
        let mut pats = Vec::new();
        loop {
            let span = self.peek_span();
            match self.peek().clone() {
                TokenKind::VarId(ident) => {
                    self.advance();
                    pats.push(VarPat::new(span, ident));
                }
                TokenKind::Underscore => {
                    self.advance();
                    let name = self.internal_name("w");
                    pats.push(VarPat::new(span, name));
                }
                TokenKind::Arrow if !pats.is_empty() => break,
                _ => {
                    return Err(self.error_here(
                        "lambda arguments must be variable patterns",
                    ));
                }
            }
        }
        self.expect(&TokenKind::Arrow, "after the lambda arguments")?;
        let body = self.expr()?;
        let span = start.merge(body.span);
        Ok(Expr::new(span, ExprKind::Lambda(pats, Box::new(body))))
    }

    fn case_expr(&mut self) -> Result<Expr> {
        let start = self.expect(&TokenKind::Case, "")?;
        let scrutinee = self.expr()?;
        self.expect(&TokenKind::Of, "after the case scrutinee")?;
        let explicit = self.open_block("the case alternatives")?;
        let mut alts = vec![self.alt()?];
        while self.block_sep() {
            self.advance();
            if matches!(self.peek(), TokenKind::RBrace | TokenKind::VRBrace) {
                break;
            }
            alts.push(self.alt()?);
        }
        let end = self.peek_span();
        self.close_block(explicit, "to end the case alternatives")?;
        Ok(Expr::new(
            start.merge(end),
            ExprKind::Case(Box::new(scrutinee), alts),
        ))
    }

    fn alt(&mut self) -> Result<Alt> {
        let (con, pats) = self.alt_pattern()?;
        self.expect(&TokenKind::Arrow, "after the pattern")?;
        let rhs = self.expr()?;
        let span = con.span.merge(rhs.span);
        Ok(Alt {
            span,
            con,
            pats: pats.into(),
            rhs,
        })
    }

    /// A one-level alternative pattern: `C x y`, `x : xs`, `[]`, `(a, b)`.
    fn alt_pattern(&mut self) -> Result<(ConPat, Vec<VarPat>)> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::ConId(ident) => {
                self.advance();
                let con = ConPat {
                    span,
                    name: QName::ident(ident),
                };
                let pats = self.var_patterns()?;
                Ok((con, pats))
            }
            TokenKind::QConId(module, ident) => {
                self.advance();
                let con = ConPat {
                    span,
                    name: QName::qualified(module, Name::Ident(ident)),
                };
                let pats = self.var_patterns()?;
                Ok((con, pats))
            }
            TokenKind::LBracket => {
                self.advance();
                let end = self.expect(&TokenKind::RBracket, "to complete the '[]' pattern")?;
                let con = ConPat {
                    span: span.merge(end),
                    name: QName::symbol(LIST_TYCON),
                };
                Ok((con, Vec::new()))
            }
            TokenKind::VarId(_) | TokenKind::Underscore => {
                // Must be the left side of a cons pattern; a bare variable
                // alternative is not representable one level deep.
                let head = self.var_pattern()?;
                if *self.peek() == TokenKind::Sym(":".to_string()) {
                    let con_span = self.advance().span;
                    let tail = self.var_pattern()?;
                    let con = ConPat {
                        span: con_span,
                        name: QName::symbol(":"),
                    };
                    return Ok((con, vec![head, tail]));
                }
                Err(self.error_at(
                    span,
                    "variable patterns are not supported as case alternatives",
                ))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.alt_pattern_in_parens(span)?;
                Ok(inner)
            }
            _ => Err(self.error_here(format!(
                "expected a pattern, found {}",
                self.peek().describe()
            ))),
        }
    }

    /// `(x : xs)`, `(a, b)`, or a parenthesized alternative pattern.
    fn alt_pattern_in_parens(&mut self, start: Span) -> Result<(ConPat, Vec<VarPat>)> {
        if matches!(self.peek(), TokenKind::VarId(_) | TokenKind::Underscore) {
            let head = self.var_pattern()?;
            if *self.peek() == TokenKind::Sym(":".to_string()) {
                let con_span = self.advance().span;
                let tail = self.var_pattern()?;
                self.expect(&TokenKind::RParen, "to close the pattern")?;
                let con = ConPat {
                    span: con_span,
                    name: QName::symbol(":"),
                };
                return Ok((con, vec![head, tail]));
            }
            if self.eat(&TokenKind::Comma) {
                let second = self.var_pattern()?;
                let end = self.expect(&TokenKind::RParen, "to close the pair pattern")?;
                let con = ConPat {
                    span: start.merge(end),
                    name: QName::symbol(PAIR_TYCON),
                };
                return Ok((con, vec![head, second]));
            }
            return Err(self.error_here("unsupported pattern"));
        }
        let inner = self.alt_pattern()?;
        self.expect(&TokenKind::RParen, "to close the pattern")?;
        Ok(inner)
    }

    /// Zero or more variable patterns (constructor argument positions).
    pub(crate) fn var_patterns(&mut self) -> Result<Vec<VarPat>> {
        let mut pats = Vec::new();
        loop {
            match self.peek() {
                TokenKind::VarId(_) | TokenKind::Underscore => pats.push(self.var_pattern()?),
                TokenKind::ConId(_) | TokenKind::QConId(_, _) | TokenKind::LParen
                | TokenKind::LBracket => {
                    return Err(self.error_here(
                        "nested patterns are not supported; bind a variable and match again",
                    ));
                }
                _ => return Ok(pats),
            }
        }
    }

    pub(crate) fn var_pattern(&mut self) -> Result<VarPat> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::VarId(ident) => {
                self.advance();
                Ok(VarPat::new(span, ident))
            }
            TokenKind::Underscore => {
                self.advance();
                let name = self.internal_name("w");
                Ok(VarPat::new(span, name))
            }
            TokenKind::ConId(_)
            | TokenKind::QConId(_, _)
            | TokenKind::LParen
            | TokenKind::LBracket => Err(self.error_here(
                "nested patterns are not supported; bind a variable and match again",
            )),
            _ => Err(self.error_here(format!(
                "expected a variable pattern, found {}",
                self.peek().describe()
            ))),
        }
    }
}
