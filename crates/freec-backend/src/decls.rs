//! Declaration conversion.
//!
//! Conversion is two-pass per SCC: every member's entry is registered
//! before any body converts, so mutually dependent declarations resolve.
//! Data declarations become one mutual `Inductive` with `Arguments`
//! sentences and smart constructors; type synonyms become parameterized
//! `Definition`s; recursive functions go through termination analysis and
//! the driver/helper split before emission.

use rustc_hash::FxHashMap;

use freec_analysis::find_decreasing_args;
use freec_common::{Result, Span};
use freec_env::renamer::{FRESH_ARG_PREFIX, sanitize};
use freec_env::{EntryKind, Scope};
use freec_ir::{
    DataDecl, Expr, ExprKind, FuncDecl, Name, QName, Type, TypeDecl, TypeSynDecl,
};

use crate::context::{Converter, PARTIAL_ARG, POS, SHAPE};
use crate::gallina::{Binder, FixBody, InductiveBody, InductiveCon, Sentence, Term};
use crate::recursion::transform_recursive_scc;

/// A function declaration with its signature distributed over the
/// argument list.
#[derive(Clone, Debug)]
pub struct FuncInfo {
    pub decl: FuncDecl,
    pub arg_types: Vec<Type>,
}

/// `(Shape : Type) (Pos : Shape -> Type)` plus the `Partial` instance
/// binder for partial functions.
fn generic_binders(partial: bool) -> Vec<Binder> {
    let mut binders = vec![
        Binder::explicit(SHAPE, Term::Sort),
        Binder::explicit(POS, Term::arrow(Term::qualid(SHAPE), Term::Sort)),
    ];
    if partial {
        binders.push(Binder::explicit(
            PARTIAL_ARG,
            Term::app(
                Term::qualid("Partial"),
                vec![Term::qualid(SHAPE), Term::qualid(POS)],
            ),
        ));
    }
    binders
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl Converter<'_> {
    // =========================================================================
    // Type declarations
    // =========================================================================

    /// Register entries for every declaration of a type component.
    pub fn register_type_component(&mut self, decls: &[&TypeDecl]) -> Result<()> {
        let module = self.module_name.clone();
        for decl in decls {
            match decl {
                TypeDecl::Data(data) => {
                    let kind = EntryKind::Data {
                        arity: data.type_args.len(),
                    };
                    if self
                        .env
                        .define_toplevel(module.as_deref(), &data.ident.name, kind, None)
                        .is_none()
                    {
                        return Err(self.fatal(
                            data.ident.span,
                            format!(
                                "duplicate declaration of type constructor '{}'",
                                data.ident.name
                            ),
                        ));
                    }

                    let mut return_type =
                        Type::Con(Span::dummy(), QName::unqualified(data.ident.name.clone()));
                    for var in &data.type_args {
                        return_type =
                            Type::app(return_type, Type::Var(Span::dummy(), var.ident.clone()));
                    }

                    for con in &data.cons {
                        // The smart constructor keeps the source spelling;
                        // the raw constructor is its lowercased twin.
                        let smart = self.env.claim_ident(&sanitize(&con.ident.name));
                        let raw = self.env.claim_ident(&lowercase_first(&smart));
                        let kind = EntryKind::Con {
                            arity: con.fields.len(),
                            arg_types: con.fields.clone(),
                            return_type: Some(return_type.clone()),
                            smart_target: smart,
                        };
                        if self
                            .env
                            .define_toplevel(module.as_deref(), &con.ident.name, kind, Some(raw))
                            .is_none()
                        {
                            return Err(self.fatal(
                                con.ident.span,
                                format!(
                                    "duplicate declaration of constructor '{}'",
                                    con.ident.name
                                ),
                            ));
                        }
                    }
                }
                TypeDecl::Syn(syn) => {
                    let kind = EntryKind::TypeSyn {
                        arity: syn.type_args.len(),
                        type_args: syn.type_args.iter().map(|v| v.ident.clone()).collect(),
                        body: syn.body.clone(),
                    };
                    if self
                        .env
                        .define_toplevel(module.as_deref(), &syn.ident.name, kind, None)
                        .is_none()
                    {
                        return Err(self.fatal(
                            syn.ident.span,
                            format!("duplicate declaration of type synonym '{}'", syn.ident.name),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Emit the sentences of one type component: a mutual `Inductive` for
    /// the data members, `Arguments` and smart constructors per data
    /// constructor, then the component's synonym definitions.
    pub fn convert_type_component(
        &mut self,
        decls: &[&TypeDecl],
        recursive: bool,
    ) -> Result<Vec<Sentence>> {
        let datas: Vec<&DataDecl> = decls
            .iter()
            .filter_map(|d| match d {
                TypeDecl::Data(data) => Some(data),
                TypeDecl::Syn(_) => None,
            })
            .collect();
        let syns: Vec<&TypeSynDecl> = decls
            .iter()
            .filter_map(|d| match d {
                TypeDecl::Syn(syn) => Some(syn),
                TypeDecl::Data(_) => None,
            })
            .collect();

        // Synonyms of a recursive component are emitted after the
        // inductive, so their occurrences in constructor fields must be
        // expanded away first.
        let expansion: FxHashMap<Name, (Vec<String>, Type)> = if recursive {
            syns.iter()
                .map(|syn| {
                    (
                        syn.ident.name.clone(),
                        (
                            syn.type_args.iter().map(|v| v.ident.clone()).collect(),
                            syn.body.clone(),
                        ),
                    )
                })
                .collect()
        } else {
            FxHashMap::default()
        };

        let mut bodies = Vec::new();
        let mut arguments = Vec::new();
        let mut smarts = Vec::new();

        for data in &datas {
            let data_entry = self.resolve(
                Scope::Type,
                &QName::unqualified(data.ident.name.clone()),
                data.ident.span,
                "type constructor",
            )?;
            self.with_scope(|cx| -> Result<()> {
                let tyvars = cx.bind_type_vars(&data.type_args)?;

                let mut params = generic_binders(false);
                for tyvar in &tyvars {
                    params.push(Binder::explicit(tyvar.clone(), Term::Sort));
                }

                let mut head_args = vec![Term::qualid(SHAPE), Term::qualid(POS)];
                head_args.extend(tyvars.iter().map(|t| Term::qualid(t.clone())));
                let head = Term::app(Term::qualid(data_entry.target.clone()), head_args);

                let mut cons = Vec::new();
                for con in &data.cons {
                    let con_entry = cx.resolve(
                        Scope::Value,
                        &QName::unqualified(con.ident.name.clone()),
                        con.ident.span,
                        "constructor",
                    )?;

                    let mut lifted_fields = Vec::with_capacity(con.fields.len());
                    for field in &con.fields {
                        let field = if recursive {
                            cx.expand_synonyms(field, &expansion)?
                        } else {
                            field.clone()
                        };
                        lifted_fields.push(cx.lift_type(&field)?);
                    }

                    let mut con_ty = head.clone();
                    for field in lifted_fields.iter().rev() {
                        con_ty = Term::arrow(field.clone(), con_ty);
                    }
                    cons.push(InductiveCon {
                        name: con_entry.target.clone(),
                        ty: con_ty,
                    });

                    let mut implicits = vec![SHAPE.to_string(), POS.to_string()];
                    implicits.extend(tyvars.iter().cloned());
                    arguments.push(Sentence::Arguments {
                        name: con_entry.target.clone(),
                        implicits,
                    });

                    // Smart constructor: same fields, result wrapped in
                    // `pure`, generic arguments fixed.
                    let mut smart_binders = generic_binders(false);
                    if !tyvars.is_empty() {
                        smart_binders.push(Binder::implicit(tyvars.clone(), Term::Sort));
                    }
                    let mut field_names = Vec::with_capacity(lifted_fields.len());
                    for field_ty in &lifted_fields {
                        let field_name = cx.fresh(FRESH_ARG_PREFIX);
                        smart_binders.push(Binder::explicit(field_name.clone(), field_ty.clone()));
                        field_names.push(field_name);
                    }
                    let raw_call = Term::app(
                        Term::qualid(con_entry.target.clone()),
                        field_names.into_iter().map(Term::Qualid).collect(),
                    );
                    let EntryKind::Con { smart_target, .. } = &con_entry.kind else {
                        unreachable!("constructor entry");
                    };
                    smarts.push(Sentence::Definition {
                        name: smart_target.clone(),
                        binders: smart_binders,
                        ret: Some(Term::app(
                            Term::qualid("Free"),
                            vec![Term::qualid(SHAPE), Term::qualid(POS), head.clone()],
                        )),
                        body: Term::pure(raw_call),
                    });
                }

                bodies.push(InductiveBody {
                    name: data_entry.target.clone(),
                    params,
                    cons,
                });
                Ok(())
            })?;
        }

        let mut sentences = Vec::new();
        if !bodies.is_empty() {
            sentences.push(Sentence::Inductive(bodies));
            sentences.extend(arguments);
            sentences.extend(smarts);
        }
        for syn in &syns {
            sentences.push(self.convert_synonym(syn)?);
        }
        Ok(sentences)
    }

    fn convert_synonym(&mut self, syn: &TypeSynDecl) -> Result<Sentence> {
        let entry = self.resolve(
            Scope::Type,
            &QName::unqualified(syn.ident.name.clone()),
            syn.ident.span,
            "type synonym",
        )?;
        self.with_scope(|cx| {
            let tyvars = cx.bind_type_vars(&syn.type_args)?;
            let mut binders = generic_binders(false);
            for tyvar in tyvars {
                binders.push(Binder::explicit(tyvar, Term::Sort));
            }
            let body = cx.convert_type(&syn.body)?;
            Ok(Sentence::Definition {
                name: entry.target.clone(),
                binders,
                ret: Some(Term::Sort),
                body,
            })
        })
    }

    // =========================================================================
    // Function declarations
    // =========================================================================

    /// Register entries for every member of a function component.
    pub fn register_func_component(&mut self, infos: &[&FuncInfo]) -> Result<()> {
        let partial = self.compute_partiality(infos);
        let module = self.module_name.clone();
        for (info, partial) in infos.iter().zip(partial) {
            let kind = EntryKind::Func {
                arity: info.decl.arity(),
                type_args: info.decl.type_args.iter().map(|v| v.ident.clone()).collect(),
                arg_types: info.arg_types.clone(),
                return_type: info.decl.return_type.clone(),
                partial,
            };
            if self
                .env
                .define_toplevel(module.as_deref(), &info.decl.ident.name, kind, None)
                .is_none()
            {
                return Err(self.fatal(
                    info.decl.ident.span,
                    format!("duplicate declaration of function '{}'", info.decl.ident.name),
                ));
            }
        }
        Ok(())
    }

    /// A function is partial when its body mentions `undefined`/`error`,
    /// references a partial entry, or (computed as a fixpoint) calls a
    /// partial member of its own SCC.
    fn compute_partiality(&mut self, infos: &[&FuncInfo]) -> Vec<bool> {
        let members: FxHashMap<&Name, usize> = infos
            .iter()
            .enumerate()
            .map(|(index, info)| (&info.decl.ident.name, index))
            .collect();

        let mut partial = Vec::with_capacity(infos.len());
        let mut member_calls: Vec<Vec<usize>> = Vec::with_capacity(infos.len());
        for info in infos {
            let mut refs = Vec::new();
            info.decl.body.collect_refs(&mut refs);

            let mut is_partial = mentions_partial_leaf(&info.decl.body);
            let mut calls = Vec::new();
            for reference in refs {
                if self.is_local_name(reference)
                    && let Some(&member) = members.get(&reference.name)
                {
                    calls.push(member);
                    continue;
                }
                if let freec_env::Lookup::Found(entry) =
                    self.env.lookup(Scope::Value, reference)
                    && entry.is_partial()
                {
                    is_partial = true;
                }
            }
            partial.push(is_partial);
            member_calls.push(calls);
        }

        // Propagate partiality around the SCC.
        loop {
            let mut changed = false;
            for index in 0..infos.len() {
                if !partial[index] && member_calls[index].iter().any(|&m| partial[m]) {
                    partial[index] = true;
                    changed = true;
                }
            }
            if !changed {
                return partial;
            }
        }
    }

    /// Emit one non-recursive function (or a transformed driver) as a
    /// `Definition`.
    pub fn convert_function(&mut self, info: &FuncInfo) -> Result<Sentence> {
        let entry = self.resolve(
            Scope::Value,
            &QName::unqualified(info.decl.ident.name.clone()),
            info.decl.ident.span,
            "function",
        )?;
        self.with_scope(|cx| {
            let tyvars = cx.bind_type_vars(&info.decl.type_args)?;
            let mut binders = generic_binders(entry.is_partial());
            if !tyvars.is_empty() {
                binders.push(Binder::implicit(tyvars, Term::Sort));
            }
            for (pat, ty) in info.decl.args.iter().zip(&info.arg_types) {
                let target = cx.bind_value_var(&pat.ident, pat.span, false)?;
                binders.push(Binder::explicit(target, cx.lift_type(ty)?));
            }
            let ret = match &info.decl.return_type {
                Some(ty) => Some(cx.lift_type(ty)?),
                None => None,
            };
            let body = cx.convert_expr(&info.decl.body)?;
            Ok(Sentence::Definition {
                name: entry.target.clone(),
                binders,
                ret,
                body,
            })
        })
    }

    /// Convert one recursive SCC: termination analysis, the driver/helper
    /// split, one `Fixpoint` block for all helpers, one `Definition` per
    /// driver.
    pub fn convert_recursive_component(&mut self, infos: &[&FuncInfo]) -> Result<Vec<Sentence>> {
        let funcs: Vec<&FuncDecl> = infos.iter().map(|info| &info.decl).collect();
        let module = self.module_name.clone();
        let dec_indices =
            find_decreasing_args(&funcs, module.as_deref(), self.file, self.reporter)?;

        let mut member_entries = Vec::with_capacity(infos.len());
        for (info, &dec) in infos.iter().zip(&dec_indices) {
            let entry = self.resolve(
                Scope::Value,
                &QName::unqualified(info.decl.ident.name.clone()),
                info.decl.ident.span,
                "function",
            )?;
            self.env.set_dec_arg(entry.original.clone(), dec);
            member_entries.push(entry);
        }

        let decls: Vec<FuncDecl> = infos.iter().map(|info| info.decl.clone()).collect();
        let transformed = transform_recursive_scc(self, &decls, &dec_indices);

        // The drivers are plain definitions now; only helpers keep a
        // decreasing argument.
        for entry in &member_entries {
            self.env.clear_dec_arg(&entry.original);
        }

        let mut helper_seq_per_parent: FxHashMap<usize, usize> = FxHashMap::default();
        for helper in &transformed.helpers {
            let parent_entry = &member_entries[helper.parent];
            let seq = helper_seq_per_parent.entry(helper.parent).or_insert(0);
            let target = self
                .env
                .claim_ident(&format!("{}_{}", parent_entry.target, seq));
            *seq += 1;

            let parent_info = infos[helper.parent];
            let helper_name = QName::unqualified(helper.decl.ident.name.clone());
            self.env.set_dec_arg(helper_name.clone(), helper.dec_index);
            self.env.define_generated(
                helper_name,
                target,
                EntryKind::Func {
                    arity: helper.decl.arity(),
                    type_args: parent_info
                        .decl
                        .type_args
                        .iter()
                        .map(|v| v.ident.clone())
                        .collect(),
                    arg_types: Vec::new(),
                    return_type: None,
                    partial: parent_entry.is_partial(),
                },
            );
        }

        let mut fix_bodies = Vec::with_capacity(transformed.helpers.len());
        for helper in &transformed.helpers {
            let parent_info = infos[helper.parent];
            let helper_entry = self.resolve(
                Scope::Value,
                &QName::unqualified(helper.decl.ident.name.clone()),
                helper.decl.span,
                "function",
            )?;

            let body = self.with_scope(|cx| -> Result<FixBody> {
                let tyvars = cx.bind_type_vars(&parent_info.decl.type_args)?;
                let mut binders = generic_binders(helper_entry.is_partial());
                if !tyvars.is_empty() {
                    binders.push(Binder::implicit(tyvars, Term::Sort));
                }

                let mut struct_arg = String::new();
                for (position, pat) in helper.decl.args.iter().enumerate() {
                    let is_dec = position == helper.dec_index;
                    let target = cx.bind_value_var(&pat.ident, pat.span, is_dec)?;
                    if is_dec {
                        struct_arg = target.clone();
                    }
                    // Binders are typed from the parent's signature where
                    // the captured variable is a parameter; case-bound
                    // captures stay untyped and infer from the body. The
                    // decreasing binder holds the raw, unlifted value.
                    let binder = match helper.captured_params[position] {
                        Some(param) if is_dec => Binder::explicit(
                            target,
                            cx.convert_type(&parent_info.arg_types[param])?,
                        ),
                        Some(param) => Binder::explicit(
                            target,
                            cx.lift_type(&parent_info.arg_types[param])?,
                        ),
                        None => Binder::untyped(target),
                    };
                    binders.push(binder);
                }

                let ret = if helper.at_root {
                    match &parent_info.decl.return_type {
                        Some(ty) => Some(cx.lift_type(ty)?),
                        None => None,
                    }
                } else {
                    None
                };
                let body = cx.convert_expr(&helper.decl.body)?;
                Ok(FixBody {
                    name: helper_entry.target.clone(),
                    binders,
                    struct_arg,
                    ret,
                    body,
                })
            })?;
            fix_bodies.push(body);
        }

        let mut sentences = Vec::new();
        if !fix_bodies.is_empty() {
            sentences.push(Sentence::Fixpoint(fix_bodies));
        }
        for (driver, info) in transformed.drivers.into_iter().zip(infos) {
            let driver_info = FuncInfo {
                decl: driver,
                arg_types: info.arg_types.clone(),
            };
            sentences.push(self.convert_function(&driver_info)?);
        }
        Ok(sentences)
    }
}

/// Whether the expression mentions `undefined` or `error` directly.
fn mentions_partial_leaf(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Undefined | ExprKind::ErrorExpr(_) => true,
        ExprKind::Var(_) | ExprKind::Con(_) | ExprKind::IntLiteral(_) => false,
        ExprKind::App(func, arg) => mentions_partial_leaf(func) || mentions_partial_leaf(arg),
        ExprKind::If(cond, then, els) => {
            mentions_partial_leaf(cond)
                || mentions_partial_leaf(then)
                || mentions_partial_leaf(els)
        }
        ExprKind::Case(scrutinee, alts) => {
            mentions_partial_leaf(scrutinee)
                || alts.iter().any(|alt| mentions_partial_leaf(&alt.rhs))
        }
        ExprKind::Lambda(_, body) => mentions_partial_leaf(body),
    }
}
