//! Declaration parsing and multi-equation desugaring.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use freec_common::{Result, Span};
use freec_ir::{
    Alt, ConDecl, ConPat, DataDecl, DeclIdent, Expr, ExprKind, FuncDecl, ImportDecl, Module,
    Name, QName, TypeDecl, TypeSig, TypeSchema, TypeSynDecl, TypeVarDecl, VarPat,
};
use freec_scanner::TokenKind;

use crate::types::{LIST_TYCON, PAIR_TYCON};
use crate::Parser;

/// A function-argument pattern before desugaring.
enum EqPat {
    Var(VarPat),
    Con {
        span: Span,
        name: QName,
        args: SmallVec<[VarPat; 4]>,
    },
}

/// One equation of a function binding.
struct Equation {
    span: Span,
    name: Name,
    name_span: Span,
    pats: Vec<EqPat>,
    rhs: Expr,
}

enum Item {
    Import(ImportDecl),
    Type(TypeDecl),
    Sig(Vec<TypeSig>),
    Eq(Equation),
}

impl Parser<'_> {
    pub(crate) fn module(&mut self) -> Result<Module> {
        let start = self.peek_span();
        let mut name = None;
        if self.eat(&TokenKind::Module) {
            match self.peek().clone() {
                TokenKind::ConId(module) => {
                    self.advance();
                    name = Some(module);
                }
                _ => return Err(self.error_here("expected a module name")),
            }
            self.expect(&TokenKind::Where, "after the module name")?;
        }
        let explicit = self.open_block("the module body")?;

        let mut items = Vec::new();
        loop {
            while self.block_sep() {
                self.advance();
            }
            if matches!(
                self.peek(),
                TokenKind::RBrace | TokenKind::VRBrace | TokenKind::Eof
            ) {
                break;
            }
            items.push(self.item()?);
            if self.block_sep() {
                continue;
            }
            break;
        }
        self.close_block(explicit, "to end the module body")?;
        self.expect(&TokenKind::Eof, "after the module body")?;

        self.assemble(start, name, items)
    }

    fn item(&mut self) -> Result<Item> {
        self.check_unsupported()?;
        match self.peek() {
            TokenKind::Import => {
                let start = self.advance().span;
                match self.peek().clone() {
                    TokenKind::ConId(module) => {
                        let end = self.advance().span;
                        if *self.peek() == TokenKind::LParen {
                            return Err(self
                                .error_here("import lists are not supported; import the whole module"));
                        }
                        Ok(Item::Import(ImportDecl {
                            span: start.merge(end),
                            module,
                        }))
                    }
                    _ => Err(self.error_here("expected a module name after 'import'")),
                }
            }
            TokenKind::Data => Ok(Item::Type(self.data_decl()?)),
            TokenKind::Type => Ok(Item::Type(self.type_syn_decl()?)),
            _ => self.sig_or_equation(),
        }
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    fn data_decl(&mut self) -> Result<TypeDecl> {
        let start = self.expect(&TokenKind::Data, "")?;
        let ident = self.con_decl_ident()?;
        let type_args = self.type_var_decls()?;
        self.expect(&TokenKind::Equals, "after the data type head")?;
        let mut cons = vec![self.con_decl()?];
        while self.eat(&TokenKind::Bar) {
            cons.push(self.con_decl()?);
        }
        let end = cons.last().map_or(start, |c| c.ident.span);
        Ok(TypeDecl::Data(DataDecl {
            span: start.merge(end),
            ident,
            type_args,
            cons,
        }))
    }

    fn con_decl(&mut self) -> Result<ConDecl> {
        let ident = self.con_decl_ident()?;
        let mut fields = Vec::new();
        while let Some(field) = self.atype()? {
            fields.push(field);
        }
        Ok(ConDecl { ident, fields })
    }

    fn type_syn_decl(&mut self) -> Result<TypeDecl> {
        let start = self.expect(&TokenKind::Type, "")?;
        let ident = self.con_decl_ident()?;
        let type_args = self.type_var_decls()?;
        self.expect(&TokenKind::Equals, "after the type synonym head")?;
        let body = self.type_expr()?;
        Ok(TypeDecl::Syn(TypeSynDecl {
            span: start.merge(body.span()),
            ident,
            type_args,
            body,
        }))
    }

    fn con_decl_ident(&mut self) -> Result<DeclIdent> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::ConId(ident) => {
                self.advance();
                Ok(DeclIdent::new(span, Name::Ident(ident)))
            }
            _ => Err(self.error_here(format!(
                "expected a constructor name, found {}",
                self.peek().describe()
            ))),
        }
    }

    fn type_var_decls(&mut self) -> Result<Vec<TypeVarDecl>> {
        let mut args = Vec::new();
        while let TokenKind::VarId(ident) = self.peek().clone() {
            let span = self.advance().span;
            args.push(TypeVarDecl::new(span, ident));
        }
        Ok(args)
    }

    // =========================================================================
    // Signatures and function equations
    // =========================================================================

    fn sig_or_equation(&mut self) -> Result<Item> {
        let (name, name_span) = self.binding_name()?;
        if matches!(self.peek(), TokenKind::Comma | TokenKind::DoubleColon) {
            return self.signature(name, name_span);
        }
        self.equation(name, name_span)
    }

    /// A binding name: a variable identifier or a parenthesized operator.
    fn binding_name(&mut self) -> Result<(Name, Span)> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::VarId(ident) => {
                self.advance();
                Ok((Name::Ident(ident), span))
            }
            TokenKind::LParen => {
                if let TokenKind::Sym(sym) = self.peek_at(1).clone()
                    && *self.peek_at(2) == TokenKind::RParen
                {
                    self.advance();
                    self.advance();
                    let end = self.advance().span;
                    return Ok((Name::Symbol(sym), span.merge(end)));
                }
                Err(self.error_here("pattern bindings are not supported"))
            }
            _ => Err(self.error_here(format!(
                "expected a declaration, found {}",
                self.peek().describe()
            ))),
        }
    }

    fn signature(&mut self, first: Name, first_span: Span) -> Result<Item> {
        let mut names = vec![(first, first_span)];
        while self.eat(&TokenKind::Comma) {
            names.push(self.binding_name()?);
        }
        self.expect(&TokenKind::DoubleColon, "in the type signature")?;
        let body = self.type_expr()?;

        // Haskell-98 signatures quantify implicitly; collect the free type
        // variables in first-occurrence order as the prenex binders.
        let mut vars = Vec::new();
        body.collect_vars(&mut vars);
        let type_args = vars
            .into_iter()
            .map(|v| TypeVarDecl::new(Span::dummy(), v))
            .collect::<Vec<_>>();

        let sigs = names
            .into_iter()
            .map(|(name, span)| TypeSig {
                span: span.merge(body.span()),
                name,
                schema: TypeSchema::new(body.span(), type_args.clone(), body.clone()),
            })
            .collect();
        Ok(Item::Sig(sigs))
    }

    fn equation(&mut self, name: Name, name_span: Span) -> Result<Item> {
        let mut pats = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Equals => break,
                TokenKind::VarId(_) | TokenKind::Underscore => {
                    pats.push(EqPat::Var(self.var_pattern()?));
                }
                TokenKind::ConId(_) | TokenKind::QConId(_, _) => {
                    // A bare constructor argument pattern is nullary;
                    // anything applied needs parentheses.
                    let span = self.peek_span();
                    let con_name = match self.advance().kind.clone() {
                        TokenKind::ConId(ident) => QName::ident(ident),
                        TokenKind::QConId(module, ident) => {
                            QName::qualified(module, Name::Ident(ident))
                        }
                        _ => unreachable!(),
                    };
                    pats.push(EqPat::Con {
                        span,
                        name: con_name,
                        args: SmallVec::new(),
                    });
                }
                TokenKind::LBracket => {
                    let start = self.advance().span;
                    let end =
                        self.expect(&TokenKind::RBracket, "to complete the '[]' pattern")?;
                    pats.push(EqPat::Con {
                        span: start.merge(end),
                        name: QName::symbol(LIST_TYCON),
                        args: SmallVec::new(),
                    });
                }
                TokenKind::LParen => {
                    let start = self.advance().span;
                    pats.push(self.eq_pat_in_parens(start)?);
                }
                _ => {
                    return Err(self.error_here(format!(
                        "expected an argument pattern or '=', found {}",
                        self.peek().describe()
                    )));
                }
            }
        }
        self.expect(&TokenKind::Equals, "before the function body")?;
        let rhs = self.expr()?;
        Ok(Item::Eq(Equation {
            span: name_span.merge(rhs.span),
            name,
            name_span,
            pats,
            rhs,
        }))
    }

    /// `(x : xs)`, `(a, b)`, or `(C x y)` in a function argument position.
    fn eq_pat_in_parens(&mut self, start: Span) -> Result<EqPat> {
        match self.peek().clone() {
            TokenKind::VarId(_) | TokenKind::Underscore => {
                let head = self.var_pattern()?;
                if *self.peek() == TokenKind::Sym(":".to_string()) {
                    let con_span = self.advance().span;
                    let tail = self.var_pattern()?;
                    self.expect(&TokenKind::RParen, "to close the pattern")?;
                    return Ok(EqPat::Con {
                        span: con_span,
                        name: QName::symbol(":"),
                        args: SmallVec::from_vec(vec![head, tail]),
                    });
                }
                if self.eat(&TokenKind::Comma) {
                    let second = self.var_pattern()?;
                    let end = self.expect(&TokenKind::RParen, "to close the pair pattern")?;
                    return Ok(EqPat::Con {
                        span: start.merge(end),
                        name: QName::symbol(PAIR_TYCON),
                        args: SmallVec::from_vec(vec![head, second]),
                    });
                }
                self.expect(&TokenKind::RParen, "to close the pattern")?;
                Ok(EqPat::Var(head))
            }
            TokenKind::ConId(ident) => {
                let con_span = self.advance().span;
                let args = self.var_patterns()?;
                let end = self.expect(&TokenKind::RParen, "to close the pattern")?;
                Ok(EqPat::Con {
                    span: con_span.merge(end),
                    name: QName::ident(ident),
                    args: args.into(),
                })
            }
            TokenKind::QConId(module, ident) => {
                let con_span = self.advance().span;
                let args = self.var_patterns()?;
                let end = self.expect(&TokenKind::RParen, "to close the pattern")?;
                Ok(EqPat::Con {
                    span: con_span.merge(end),
                    name: QName::qualified(module, Name::Ident(ident)),
                    args: args.into(),
                })
            }
            _ => Err(self.error_here("unsupported pattern")),
        }
    }

    // =========================================================================
    // Module assembly
    // =========================================================================

    fn assemble(
        &mut self,
        start: Span,
        name: Option<String>,
        items: Vec<Item>,
    ) -> Result<Module> {
        let mut imports = Vec::new();
        let mut type_decls = Vec::new();
        let mut type_sigs = Vec::new();
        let mut func_decls = Vec::new();

        let mut pending: Vec<Equation> = Vec::new();
        for item in items {
            if let Item::Eq(eq) = item {
                if pending.last().is_some_and(|prev| prev.name != eq.name) {
                    let group = std::mem::take(&mut pending);
                    func_decls.push(self.desugar_equations(group)?);
                }
                pending.push(eq);
                continue;
            }
            if !pending.is_empty() {
                let group = std::mem::take(&mut pending);
                func_decls.push(self.desugar_equations(group)?);
            }
            match item {
                Item::Import(import) => imports.push(import),
                Item::Type(decl) => type_decls.push(decl),
                Item::Sig(sigs) => type_sigs.extend(sigs),
                Item::Eq(_) => unreachable!(),
            }
        }
        if !pending.is_empty() {
            let group = std::mem::take(&mut pending);
            func_decls.push(self.desugar_equations(group)?);
        }

        Ok(Module {
            span: start,
            name,
            imports,
            type_decls,
            type_sigs,
            func_decls,
        })
    }

    /// Merge the equations of one function into a single `FuncDecl`,
    /// introducing a `case` on the one column that matches constructors.
    fn desugar_equations(&mut self, equations: Vec<Equation>) -> Result<FuncDecl> {
        let first = &equations[0];
        let name = first.name.clone();
        let name_span = first.name_span;
        let arity = first.pats.len();
        let span = equations
            .iter()
            .fold(first.span, |acc, eq| acc.merge(eq.span));

        for eq in &equations[1..] {
            if eq.pats.len() != arity {
                return Err(self.error_at(
                    eq.name_span,
                    format!("equations for '{name}' have different numbers of arguments"),
                ));
            }
        }

        // The single-equation, all-variable case needs no rewriting.
        if equations.len() == 1 && first.pats.iter().all(|p| matches!(p, EqPat::Var(_))) {
            let mut equations = equations;
            let eq = equations.pop().expect("one equation");
            let args = eq
                .pats
                .into_iter()
                .map(|p| match p {
                    EqPat::Var(v) => v,
                    EqPat::Con { .. } => unreachable!(),
                })
                .collect();
            return Ok(FuncDecl {
                span,
                ident: DeclIdent::new(name_span, eq.name),
                type_args: Vec::new(),
                args,
                body: eq.rhs,
                return_type: None,
            });
        }

        // Find the single column with constructor patterns.
        let mut con_columns = Vec::new();
        for col in 0..arity {
            if equations
                .iter()
                .any(|eq| matches!(eq.pats[col], EqPat::Con { .. }))
            {
                con_columns.push(col);
            }
        }
        let scrutinee_col = match con_columns.as_slice() {
            [] => {
                return Err(self.error_at(
                    name_span,
                    format!("'{name}' has more than one equation without constructor patterns"),
                ));
            }
            [col] => *col,
            _ => {
                return Err(self.error_at(
                    name_span,
                    format!(
                        "matching on more than one argument of '{name}' is not supported; \
                         use an explicit case expression"
                    ),
                ));
            }
        };

        // Canonical argument names; internal so no equation body can
        // accidentally capture them.
        let canonical: Vec<String> = (0..arity).map(|_| self.internal_name("x")).collect();
        let args: Vec<VarPat> = (0..arity)
            .map(|col| {
                let pat_span = match &first.pats[col] {
                    EqPat::Var(v) => v.span,
                    EqPat::Con { span, .. } => *span,
                };
                VarPat::new(pat_span, canonical[col].clone())
            })
            .collect();

        let mut alts = Vec::new();
        for eq in &equations {
            let EqPat::Con {
                span: con_span,
                name: con_name,
                args: con_args,
            } = &eq.pats[scrutinee_col]
            else {
                return Err(self.error_at(
                    eq.name_span,
                    format!(
                        "equation for '{name}' needs a constructor pattern in argument {}",
                        scrutinee_col + 1
                    ),
                ));
            };

            // Rename this equation's variable patterns to the canonical
            // argument names.
            let mut subst = FxHashMap::default();
            for (col, pat) in eq.pats.iter().enumerate() {
                if let EqPat::Var(v) = pat {
                    subst.insert(
                        v.ident.clone(),
                        Expr::var(v.span, QName::ident(canonical[col].clone())),
                    );
                }
            }
            let rhs = eq.rhs.subst(&subst);
            alts.push(Alt {
                span: eq.span,
                con: ConPat {
                    span: *con_span,
                    name: con_name.clone(),
                },
                pats: con_args.clone(),
                rhs,
            });
        }

        let scrutinee = Expr::var(
            args[scrutinee_col].span,
            QName::ident(canonical[scrutinee_col].clone()),
        );
        let body = Expr::new(
            span,
            ExprKind::Case(Box::new(scrutinee), alts),
        );
        Ok(FuncDecl {
            span,
            ident: DeclIdent::new(name_span, name),
            type_args: Vec::new(),
            args,
            body,
            return_type: None,
        })
    }
}
