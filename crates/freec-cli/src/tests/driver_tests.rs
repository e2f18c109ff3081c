use std::path::Path;

use clap::Parser;

use crate::args::CliArgs;
use crate::driver;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write file");
}

fn run(args: &[&str]) -> driver::CompilationResult {
    let mut argv = vec!["freec"];
    argv.extend_from_slice(args);
    let args = CliArgs::parse_from(argv);
    driver::compile(&args).expect("driver ran")
}

const LENGTH_MODULE: &str = "\
module Length where

length :: [a] -> Integer
length xs = case xs of
  [] -> 0
  y : ys -> 1 + length ys
";

#[test]
fn compiles_a_module_to_the_output_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Length.hs");
    write_file(&input, LENGTH_MODULE);
    let out = dir.path().join("out");

    let result = run(&[
        input.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-color",
    ]);
    assert_eq!(result.exit_code, 0, "{}", result.rendered_diagnostics);

    let generated = std::fs::read_to_string(out.join("Length.v")).expect("Length.v written");
    assert!(generated.contains("Module Length."));
    assert!(generated.contains("Fixpoint length_0"));
    assert!(out.join("Length.json").is_file());
    assert!(out.join("_CoqProject").is_file());
}

#[test]
fn no_coq_project_suppresses_the_project_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Length.hs");
    write_file(&input, LENGTH_MODULE);
    let out = dir.path().join("out");

    let result = run(&[
        input.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-coq-project",
        "--no-color",
    ]);
    assert_eq!(result.exit_code, 0);
    assert!(!out.join("_CoqProject").exists());
}

#[test]
fn prints_to_stdout_without_an_output_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Id.hs");
    write_file(&input, "id :: a -> a\nid x = x\n");

    let result = run(&[input.to_str().unwrap(), "--no-color"]);
    assert_eq!(result.exit_code, 0);
    assert!(result.stdout_output.contains("Definition id"));
    assert!(result.emitted_files.is_empty());
}

#[test]
fn fatal_diagnostics_set_a_nonzero_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Bad.hs");
    write_file(&input, "module Bad where\nf = g\n");
    let out = dir.path().join("out");

    let result = run(&[
        input.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-color",
    ]);
    assert_eq!(result.exit_code, 1);
    assert!(
        result.rendered_diagnostics.contains("error"),
        "{}",
        result.rendered_diagnostics
    );
    // No partial output for the failed module.
    assert!(!out.join("Bad.v").exists());
}

#[test]
fn diagnostics_include_a_code_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Frame.hs");
    write_file(&input, "f :: Integer\nf = unknownThing\n");

    let result = run(&[input.to_str().unwrap(), "--no-color"]);
    assert_eq!(result.exit_code, 1);
    assert!(
        result.rendered_diagnostics.contains("f = unknownThing"),
        "{}",
        result.rendered_diagnostics
    );
    assert!(result.rendered_diagnostics.contains('^'));
}

#[test]
fn modules_compile_in_import_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Caller is given first; the driver must still compile Util before it.
    let caller = dir.path().join("Caller.hs");
    write_file(
        &caller,
        "module Caller where\nimport Util\n\nuse :: Integer -> Integer\nuse x = twice x\n",
    );
    let util = dir.path().join("Util.hs");
    write_file(
        &util,
        "module Util where\n\ntwice :: Integer -> Integer\ntwice x = x + x\n",
    );
    let out = dir.path().join("out");

    let result = run(&[
        caller.to_str().unwrap(),
        util.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-color",
    ]);
    assert_eq!(result.exit_code, 0, "{}", result.rendered_diagnostics);

    let generated = std::fs::read_to_string(out.join("Caller.v")).expect("Caller.v written");
    assert!(generated.contains("From Generated Require Import Util."));
    assert!(generated.contains("twice Shape Pos x"), "{generated}");
}

#[test]
fn unknown_import_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Lonely.hs");
    write_file(&input, "module Lonely where\nimport Nowhere\n");

    let result = run(&[input.to_str().unwrap(), "--no-color"]);
    assert_eq!(result.exit_code, 1);
    assert!(
        result.rendered_diagnostics.contains("unknown module 'Nowhere'"),
        "{}",
        result.rendered_diagnostics
    );
}

#[test]
fn import_cycle_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = dir.path().join("A.hs");
    write_file(&a, "module A where\nimport B\n");
    let b = dir.path().join("B.hs");
    write_file(&b, "module B where\nimport A\n");

    let result = run(&[a.to_str().unwrap(), b.to_str().unwrap(), "--no-color"]);
    assert_eq!(result.exit_code, 1);
    assert!(
        result.rendered_diagnostics.contains("cycle"),
        "{}",
        result.rendered_diagnostics
    );
}

#[test]
fn duplicate_module_name_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = dir.path().join("One.hs");
    write_file(&a, "module Same where\nx :: Integer\nx = 1\n");
    let b = dir.path().join("Two.hs");
    write_file(&b, "module Same where\ny :: Integer\ny = 2\n");

    let result = run(&[a.to_str().unwrap(), b.to_str().unwrap(), "--no-color"]);
    assert_eq!(result.exit_code, 1);
    assert!(
        result
            .rendered_diagnostics
            .contains("module 'Same' is defined more than once"),
        "{}",
        result.rendered_diagnostics
    );
}

#[test]
fn separate_compilation_through_interface_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out");

    // First compile the utility module on its own.
    let util = dir.path().join("Util.hs");
    write_file(
        &util,
        "module Util where\n\ntwice :: Integer -> Integer\ntwice x = x + x\n",
    );
    let result = run(&[
        util.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-color",
    ]);
    assert_eq!(result.exit_code, 0, "{}", result.rendered_diagnostics);

    // Then compile a dependent module against the written interface.
    let caller = dir.path().join("Caller.hs");
    write_file(
        &caller,
        "module Caller where\nimport Util\n\nuse :: Integer -> Integer\nuse x = Util.twice x\n",
    );
    let result = run(&[
        caller.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-color",
    ]);
    assert_eq!(result.exit_code, 0, "{}", result.rendered_diagnostics);
    let generated = std::fs::read_to_string(out.join("Caller.v")).expect("Caller.v written");
    assert!(generated.contains("Util.twice Shape Pos x"), "{generated}");
}

#[test]
fn runs_are_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Length.hs");
    write_file(&input, LENGTH_MODULE);

    let first = run(&[input.to_str().unwrap(), "--no-color"]);
    let second = run(&[input.to_str().unwrap(), "--no-color"]);
    assert_eq!(first.stdout_output, second.stdout_output);
    assert_eq!(first.exit_code, 0);
}
