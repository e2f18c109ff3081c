//! The compilation driver.
//!
//! Reads sources, parses them, orders modules by their imports, compiles
//! each module with the interfaces of its dependencies in scope, and
//! writes the generated `.v` files plus `.json` interfaces. Diagnostics
//! accumulate across all modules and render together at the end; a module
//! with a fatal diagnostic produces no output.

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

use freec_backend::gallina::Sentence;
use freec_backend::{convert_module, print_sentences};
use freec_common::Reporter;
use freec_env::{EnvConfig, Environment, ModuleInterface};
use freec_ir::Module;

use crate::args::CliArgs;

/// The built-in environment configuration, used when `--base-library`
/// does not provide an `env.toml`.
const BUILTIN_ENV_CONFIG: &str = include_str!("../../../base/env.toml");

#[derive(Debug)]
pub struct CompilationResult {
    /// Diagnostics rendered for the terminal.
    pub rendered_diagnostics: String,
    /// Generated Gallina printed for stdout (when no output directory).
    pub stdout_output: String,
    pub emitted_files: Vec<PathBuf>,
    pub files_read: Vec<PathBuf>,
    /// 0 on success, 1 when any fatal diagnostic was reported.
    pub exit_code: i32,
}

pub fn compile(args: &CliArgs) -> Result<CompilationResult> {
    let mut reporter = Reporter::new();
    let mut sources: BTreeMap<String, String> = BTreeMap::new();
    let mut files_read = Vec::new();

    // Parse every input; a file that fails to parse is dropped from the
    // pipeline but does not stop the other modules.
    let mut parsed: Vec<(String, Module)> = Vec::new();
    for input in &args.inputs {
        let text = std::fs::read_to_string(input)
            .with_context(|| format!("cannot read input file '{}'", input.display()))?;
        let file = input.display().to_string();
        files_read.push(input.clone());
        sources.insert(file.clone(), text.clone());

        let module = freec_scanner::scan(&file, &text, &mut reporter)
            .and_then(|tokens| freec_parser::parse_module(&file, &tokens, &mut reporter));
        match module {
            Ok(module) => {
                if parsed
                    .iter()
                    .any(|(_, other): &(String, Module)| other.coq_name() == module.coq_name())
                {
                    let _ = reporter.report_fatal(freec_common::Diagnostic::error(
                        file,
                        module.span,
                        format!("module '{}' is defined more than once", module.coq_name()),
                    ));
                    continue;
                }
                parsed.push((file, module));
            }
            Err(_) => debug!(%file, "skipping module after front-end failure"),
        }
    }

    let base_env = load_base_environment(args, &mut reporter)?;

    // Compile in import order, threading the interface cache.
    let mut interfaces: FxHashMap<String, ModuleInterface> = FxHashMap::default();
    let mut outputs: Vec<(String, Vec<Sentence>, ModuleInterface)> = Vec::new();
    let mut remaining: Vec<(String, Module)> = parsed;
    while !remaining.is_empty() {
        let ready = remaining.iter().position(|(_, module)| {
            module.imports.iter().all(|import| {
                interfaces.contains_key(&import.module)
                    || load_external_interface(args, &import.module).is_some()
                    || !remaining
                        .iter()
                        .any(|(_, other)| other.coq_name() == import.module)
            })
        });
        let Some(index) = ready else {
            // Every remaining module waits on another remaining module.
            let (file, module) = &remaining[0];
            let span = module
                .imports
                .first()
                .map_or(module.span, |import| import.span);
            let _ = reporter.report_fatal(freec_common::Diagnostic::error(
                file.clone(),
                span,
                "modules import each other in a cycle",
            ));
            break;
        };
        let (file, module) = remaining.remove(index);

        let mut env = base_env.clone();
        let mut missing_import = false;
        for import in &module.imports {
            let interface = interfaces
                .get(&import.module)
                .cloned()
                .or_else(|| load_external_interface(args, &import.module));
            match interface {
                Some(interface) => env.import_interface(&interface),
                None => {
                    let _ = reporter.report_fatal(freec_common::Diagnostic::error(
                        file.clone(),
                        import.span,
                        format!("unknown module '{}'", import.module),
                    ));
                    missing_import = true;
                }
            }
        }
        if missing_import {
            continue;
        }

        match convert_module(&module, env, &file, &mut reporter) {
            Ok(result) => {
                interfaces.insert(module.coq_name().to_string(), result.interface.clone());
                outputs.push((
                    module.coq_name().to_string(),
                    result.sentences,
                    result.interface,
                ));
            }
            Err(_) => debug!(%file, "no output for failed module"),
        }
    }

    // Write or print the generated code. Nothing is written for modules
    // that failed.
    let mut emitted_files = Vec::new();
    let mut stdout_output = String::new();
    if let Some(output_dir) = &args.output {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("cannot create output directory '{}'", output_dir.display()))?;
        for (name, sentences, interface) in &outputs {
            let v_path = output_dir.join(format!("{name}.v"));
            std::fs::write(&v_path, print_sentences(sentences))
                .with_context(|| format!("cannot write '{}'", v_path.display()))?;
            emitted_files.push(v_path);

            let json_path = output_dir.join(format!("{name}.json"));
            let json = serde_json::to_string_pretty(interface)?;
            std::fs::write(&json_path, json)
                .with_context(|| format!("cannot write '{}'", json_path.display()))?;
            emitted_files.push(json_path);
        }
        if !args.no_coq_project && !outputs.is_empty() {
            let path = output_dir.join("_CoqProject");
            std::fs::write(&path, coq_project(args, &outputs))
                .with_context(|| format!("cannot write '{}'", path.display()))?;
            emitted_files.push(path);
        }
    } else {
        for (_, sentences, _) in &outputs {
            stdout_output.push_str(&print_sentences(sentences));
        }
    }

    let rendered_diagnostics = reporter.render(&sources, !args.no_color);
    Ok(CompilationResult {
        rendered_diagnostics,
        stdout_output,
        emitted_files,
        files_read,
        exit_code: i32::from(reporter.has_fatal()),
    })
}

/// The environment with the predefined entries loaded.
fn load_base_environment(args: &CliArgs, reporter: &mut Reporter) -> Result<Environment> {
    let config_text = match &args.base_library {
        Some(dir) => {
            let path = dir.join("env.toml");
            if path.is_file() {
                std::fs::read_to_string(&path)
                    .with_context(|| format!("cannot read '{}'", path.display()))?
            } else {
                BUILTIN_ENV_CONFIG.to_string()
            }
        }
        None => BUILTIN_ENV_CONFIG.to_string(),
    };
    let config = match EnvConfig::parse(&config_text) {
        Ok(config) => config,
        Err(error) => {
            let _ = reporter.report_fatal(freec_common::Diagnostic::error(
                "env.toml",
                freec_common::Span::dummy(),
                format!("invalid environment configuration: {error}"),
            ));
            bail!("invalid environment configuration");
        }
    };
    let mut env = Environment::new();
    config.apply(&mut env);
    Ok(env)
}

/// Load the interface of a separately compiled module from the output
/// directory, if one exists there.
fn load_external_interface(args: &CliArgs, module: &str) -> Option<ModuleInterface> {
    let dir = args.output.as_ref()?;
    let path = dir.join(format!("{module}.json"));
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

/// The `_CoqProject` contents for the generated files.
fn coq_project(args: &CliArgs, outputs: &[(String, Vec<Sentence>, ModuleInterface)]) -> String {
    let base = args
        .base_library
        .as_deref()
        .unwrap_or(Path::new("base"))
        .display();
    let mut text = format!("-R {base} Base\n-R . Generated\n\n");
    for (name, _, _) in outputs {
        text.push_str(&format!("{name}.v\n"));
    }
    text
}
