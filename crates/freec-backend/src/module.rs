//! The per-module pipeline.
//!
//! IR module in, Gallina sentences and a module interface out. Passes run
//! strictly in order: type dependency components, signature distribution,
//! function dependency components (registration, termination,
//! transformation, lifting, emission), then the interface is collected
//! from the environment.

use rustc_hash::FxHashMap;
use tracing::debug;

use freec_analysis::{func_components, type_components};
use freec_common::{Reporter, Result};
use freec_env::interface::{IfaceCon, IfaceData, IfaceFunc, IfaceSyn};
use freec_env::{Environment, EntryKind, ModuleInterface};
use freec_ir::{FuncDecl, Module, Name, Type, TypeSig};

use crate::context::Converter;
use crate::decls::FuncInfo;
use crate::gallina::Sentence;

pub struct ModuleResult {
    pub sentences: Vec<Sentence>,
    pub interface: ModuleInterface,
}

/// Compile one module to Gallina sentences.
///
/// `env` must already contain the predefined entries and the interfaces
/// of every imported module.
pub fn convert_module(
    module: &Module,
    env: Environment,
    file: &str,
    reporter: &mut Reporter,
) -> Result<ModuleResult> {
    let mut cx = Converter::new(env, file, module.name.clone(), reporter);
    let coq_name = module.coq_name().to_string();
    debug!(module = %coq_name, "converting module");

    let mut sentences = preamble(module);
    sentences.push(Sentence::ModuleStart(coq_name.clone()));

    // Types, in dependency order.
    let type_comps = type_components(
        &module.type_decls,
        module.name.as_deref(),
        cx.file,
        cx.reporter,
    )?;
    for component in &type_comps {
        let decls: Vec<_> = component
            .members()
            .into_iter()
            .map(|index| &module.type_decls[index])
            .collect();
        cx.register_type_component(&decls)?;
        sentences.extend(cx.convert_type_component(&decls, component.is_recursive())?);
    }

    // Signatures, then functions in dependency order.
    let infos = distribute_signatures(&mut cx, module)?;
    let func_comps = func_components(&module.func_decls, module.name.as_deref());
    for component in &func_comps {
        let members: Vec<_> = component
            .members()
            .into_iter()
            .map(|index| &infos[index])
            .collect();
        cx.register_func_component(&members)?;
        if component.is_recursive() {
            sentences.extend(cx.convert_recursive_component(&members)?);
        } else {
            sentences.push(cx.convert_function(members[0])?);
        }
    }

    sentences.push(Sentence::ModuleEnd(coq_name.clone()));

    let interface = build_interface(&cx, &coq_name);
    debug!(module = %coq_name, sentences = sentences.len(), "module converted");
    Ok(ModuleResult {
        sentences,
        interface,
    })
}

/// `Require Import` sentences for the Base library and every import.
fn preamble(module: &Module) -> Vec<Sentence> {
    let mut sentences = vec![
        Sentence::RequireImport {
            library: "Base".to_string(),
            modules: vec!["Free".to_string()],
        },
        Sentence::RequireImport {
            library: "Base".to_string(),
            modules: vec!["Prelude".to_string()],
        },
    ];
    for import in &module.imports {
        sentences.push(Sentence::RequireImport {
            library: "Generated".to_string(),
            modules: vec![import.module.clone()],
        });
    }
    sentences
}

/// Pair every function with its signature; missing or duplicate
/// signatures are fatal, unused ones warn.
fn distribute_signatures(cx: &mut Converter<'_>, module: &Module) -> Result<Vec<FuncInfo>> {
    let mut sigs: FxHashMap<&Name, &TypeSig> = FxHashMap::default();
    for sig in &module.type_sigs {
        if sigs.insert(&sig.name, sig).is_some() {
            return Err(cx.fatal(
                sig.span,
                format!("duplicate type signature for '{}'", sig.name),
            ));
        }
    }

    let mut infos = Vec::with_capacity(module.func_decls.len());
    let mut used: Vec<&Name> = Vec::new();
    for decl in &module.func_decls {
        let Some(sig) = sigs.get(&decl.ident.name) else {
            return Err(cx.fatal(
                decl.ident.span,
                format!("missing type signature for function '{}'", decl.ident.name),
            ));
        };
        used.push(&decl.ident.name);
        infos.push(distribute_one(cx, decl, sig)?);
    }

    for sig in &module.type_sigs {
        if !used.contains(&&sig.name) {
            cx.warn(
                sig.span,
                format!("unused type signature for '{}'", sig.name),
            );
        }
    }
    Ok(infos)
}

fn distribute_one(cx: &mut Converter<'_>, decl: &FuncDecl, sig: &TypeSig) -> Result<FuncInfo> {
    let (arrow_args, arrow_ret) = sig.schema.body.arrow_spine();
    if arrow_args.len() < decl.arity() {
        return Err(cx.fatal(
            decl.ident.span,
            format!(
                "the type signature of '{}' has {} argument type{}, but the definition has {} argument{}",
                decl.ident.name,
                arrow_args.len(),
                if arrow_args.len() == 1 { "" } else { "s" },
                decl.arity(),
                if decl.arity() == 1 { "" } else { "s" },
            ),
        ));
    }

    let arg_types: Vec<Type> = arrow_args[..decl.arity()]
        .iter()
        .map(|ty| (*ty).clone())
        .collect();
    // Surplus arrows stay part of the return type.
    let mut return_type = arrow_ret.clone();
    for ty in arrow_args[decl.arity()..].iter().rev() {
        return_type = Type::func((*ty).clone(), return_type);
    }

    Ok(FuncInfo {
        decl: FuncDecl {
            type_args: sig.schema.type_args.clone(),
            return_type: Some(return_type),
            ..decl.clone()
        },
        arg_types,
    })
}

/// Collect the module's exported entries. Generated helpers (their
/// original names carry the internal `#` sigil) stay private.
fn build_interface(cx: &Converter<'_>, coq_name: &str) -> ModuleInterface {
    let mut interface = ModuleInterface::empty(coq_name);
    for entry in cx.env.module_entries() {
        if entry.original.name.as_str().starts_with('#') {
            continue;
        }
        let name = entry.original.name.clone();
        match &entry.kind {
            EntryKind::Data { arity } => interface.types.push(IfaceData {
                name,
                arity: *arity,
                target: entry.target.clone(),
            }),
            EntryKind::TypeSyn {
                type_args, body, ..
            } => interface.type_syns.push(IfaceSyn {
                name,
                type_args: type_args.clone(),
                body: body.clone(),
                target: entry.target.clone(),
            }),
            EntryKind::Con {
                arity,
                smart_target,
                ..
            } => interface.constructors.push(IfaceCon {
                name,
                arity: *arity,
                target: entry.target.clone(),
                smart_target: smart_target.clone(),
            }),
            EntryKind::Func {
                arity,
                type_args,
                partial,
                ..
            } => interface.functions.push(IfaceFunc {
                name,
                arity: *arity,
                type_args: type_args.clone(),
                partial: *partial,
                target: entry.target.clone(),
            }),
            EntryKind::TypeVar | EntryKind::Var { .. } => {}
        }
    }
    interface
}
