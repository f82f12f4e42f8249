use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use modern_homepage_lib::cli::{self, Cli};

fn init_logging() {
    // Library code logs through the `log` facade; the subscriber's log bridge
    // picks those records up.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    match cli::run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
