//! protoc-gen-protots
//!
//! Usage:
//!   protoc --plugin=protoc-gen-protots --protots_out=./gen --protots_opt=context=true proto/*.proto
//!
//! Logs go to stderr; set `PROTOTS_LOG=debug` for per-file detail.

use std::io::{self, Write};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("PROTOTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    match protots::plugin::run(stdin, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "plugin exchange failed");
            let _ = writeln!(io::stderr(), "protoc-gen-protots: {}", err);
            ExitCode::FAILURE
        }
    }
}
