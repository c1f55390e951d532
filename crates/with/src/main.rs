//! with - Command line context launcher
//!
//! "Step into a context, do the work, step back out."
//!
//! A context is a shell script that prepares an environment (a virtualenv,
//! a toolchain, a scratch directory). `with <context>` runs it and drops you
//! into a shell, or runs a single executable, inside that environment.

mod cli;

use colored::Colorize;
use tracing_subscriber::EnvFilter;
use with_core::WithError;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let code = match cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red(), err);
            err.downcast_ref::<WithError>()
                .map(WithError::exit_code)
                .unwrap_or(1)
        }
    };

    std::process::exit(code);
}
