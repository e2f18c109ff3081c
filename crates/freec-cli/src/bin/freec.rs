use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use freec_cli::args::CliArgs;
use freec_cli::{driver, trace};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if args.trace {
        trace::init();
    }
    if args.no_color {
        colored::control::set_override(false);
    }

    match driver::compile(&args) {
        Ok(result) => {
            let mut stdout = std::io::stdout();
            let mut stderr = std::io::stderr();
            if !result.stdout_output.is_empty() {
                let _ = stdout.write_all(result.stdout_output.as_bytes());
            }
            if !result.rendered_diagnostics.is_empty() {
                let _ = stderr.write_all(result.rendered_diagnostics.as_bytes());
            }
            if result.exit_code == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "freec: {error:#}");
            ExitCode::FAILURE
        }
    }
}
