use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the freec binary.
#[derive(Parser, Debug)]
#[command(
    name = "freec",
    version,
    about = "Compiles a Haskell subset to Coq using the free monad"
)]
pub struct CliArgs {
    /// Haskell source files to compile.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write generated `.v` files and module interfaces to this directory.
    /// Without it, the generated code is printed to stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Directory containing the Coq Base library. Its `env.toml` replaces
    /// the built-in environment configuration when present.
    #[arg(long = "base-library")]
    pub base_library: Option<PathBuf>,

    /// Do not write a `_CoqProject` file into the output directory.
    #[arg(long = "no-coq-project")]
    pub no_coq_project: bool,

    /// Enable compiler tracing (filtered by RUST_LOG).
    #[arg(long)]
    pub trace: bool,

    /// Disable colored diagnostics.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
