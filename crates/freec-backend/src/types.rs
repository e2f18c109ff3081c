//! Type lifting.
//!
//! The translation threads `Shape` and `Pos` through every type:
//!
//! - `lift(t)` produces the fully lifted form `Free Shape Pos t*`
//! - `convert(t)` produces `t*`: type variables rename, constructors gain
//!   `Shape Pos` in front of their (converted, unlifted) arguments, and
//!   both sides of a function arrow lift.

use rustc_hash::FxHashMap;

use freec_common::Result;
use freec_env::{EntryKind, Scope};
use freec_ir::{Name, QName, Type};

use crate::context::{Converter, POS, SHAPE};
use crate::gallina::Term;

impl Converter<'_> {
    /// `t† = Free Shape Pos t*`.
    pub fn lift_type(&mut self, ty: &Type) -> Result<Term> {
        let converted = self.convert_type(ty)?;
        Ok(Term::app(
            Term::qualid("Free"),
            vec![Term::qualid(SHAPE), Term::qualid(POS), converted],
        ))
    }

    /// `t*`.
    pub fn convert_type(&mut self, ty: &Type) -> Result<Term> {
        match ty {
            Type::Var(span, ident) => {
                let name = QName::ident(ident.clone());
                let entry = self.resolve(Scope::Type, &name, *span, "type variable")?;
                Ok(Term::qualid(self.entry_ref(&entry)))
            }
            Type::Func(_, arg, res) => {
                let arg = self.lift_type(arg)?;
                let res = self.lift_type(res)?;
                Ok(Term::arrow(arg, res))
            }
            Type::Con(_, _) | Type::App(_, _, _) => {
                let (head, args) = ty.app_spine();
                let Type::Con(span, name) = head else {
                    return Err(self.fatal(
                        head.span(),
                        "type variables cannot be applied; all types have kind '*'",
                    ));
                };
                let entry = self.resolve(Scope::Type, name, *span, "type constructor")?;
                let arity = entry.arity().unwrap_or(0);
                if args.len() != arity {
                    return Err(self.fatal(
                        ty.span(),
                        format!(
                            "type constructor '{name}' expects {arity} argument{}, found {}",
                            if arity == 1 { "" } else { "s" },
                            args.len()
                        ),
                    ));
                }
                let mut terms = vec![Term::qualid(SHAPE), Term::qualid(POS)];
                for arg in args {
                    terms.push(self.convert_type(arg)?);
                }
                Ok(Term::app(Term::qualid(self.entry_ref(&entry)), terms))
            }
        }
    }

    /// Eagerly expand occurrences of the given type synonyms.
    ///
    /// Used for constructor fields inside a recursive data component: the
    /// component's synonym definitions are emitted after the `Inductive`,
    /// so their occurrences in the inductive body must be replaced by
    /// their expansions. Synonym-only cycles were rejected by the
    /// dependency analysis, so the expansion terminates.
    pub fn expand_synonyms(
        &mut self,
        ty: &Type,
        synonyms: &FxHashMap<Name, (Vec<String>, Type)>,
    ) -> Result<Type> {
        match ty {
            Type::Var(_, _) => Ok(ty.clone()),
            Type::Func(span, arg, res) => Ok(Type::Func(
                *span,
                Box::new(self.expand_synonyms(arg, synonyms)?),
                Box::new(self.expand_synonyms(res, synonyms)?),
            )),
            Type::Con(_, _) | Type::App(_, _, _) => {
                let (head, args) = ty.app_spine();
                let mut expanded_args = Vec::with_capacity(args.len());
                for arg in &args {
                    expanded_args.push(self.expand_synonyms(arg, synonyms)?);
                }

                if let Type::Con(span, name) = head
                    && self.is_local_name(name)
                    && let Some((params, body)) = synonyms.get(&name.name)
                {
                    if expanded_args.len() != params.len() {
                        return Err(self.fatal(
                            *span,
                            format!(
                                "type synonym '{name}' expects {} argument{}, found {}",
                                params.len(),
                                if params.len() == 1 { "" } else { "s" },
                                expanded_args.len()
                            ),
                        ));
                    }
                    let map: FxHashMap<String, Type> = params
                        .iter()
                        .cloned()
                        .zip(expanded_args)
                        .collect();
                    let substituted = body.subst(&map);
                    // The synonym body may mention other component synonyms.
                    return self.expand_synonyms(&substituted, synonyms);
                }

                let mut rebuilt = head.clone();
                for arg in expanded_args {
                    rebuilt = Type::app(rebuilt, arg);
                }
                Ok(rebuilt)
            }
        }
    }

    /// Whether a reference names something in the module being compiled.
    pub(crate) fn is_local_name(&self, name: &QName) -> bool {
        match &name.module {
            None => true,
            Some(module) => self.module_name.as_deref() == Some(module.as_str()),
        }
    }
}

impl Converter<'_> {
    /// Register the type variables of a declaration in the current scope
    /// and return their target identifiers.
    pub fn bind_type_vars(
        &mut self,
        vars: &[freec_ir::TypeVarDecl],
    ) -> Result<Vec<String>> {
        let mut targets = Vec::with_capacity(vars.len());
        for var in vars {
            let name = Name::ident(var.ident.clone());
            if self
                .env
                .bound_in_innermost(Scope::Type, &QName::unqualified(name.clone()))
            {
                return Err(self.fatal(
                    var.span,
                    format!("duplicate type variable '{}'", var.ident),
                ));
            }
            let entry = self.env.define_local(&name, EntryKind::TypeVar);
            targets.push(entry.target.clone());
        }
        Ok(targets)
    }
}
