//! Tracing setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` refines the filter;
/// without it, compiler crates log at debug level.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("freec_backend=debug,freec_analysis=debug,freec_cli=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
