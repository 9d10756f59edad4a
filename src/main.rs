//! cuco CLI entry point.
//!
//! Parses arguments, sets up logging, runs the command and renders errors
//! through [`user_friendly_error`]. Any error exits with status 1.

use clap::Parser;
use cuco_cli::cli::Cli;
use cuco_cli::core::user_friendly_error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    init_tracing(&cli);

    if let Err(e) = cli.execute().await {
        let context = user_friendly_error(e);
        tracing::debug!("Command failed with {:?} error", context.error.category());
        context.display();
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise the level follows `--verbose` / `--quiet`.
fn init_tracing(cli: &Cli) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match cli.log_filter() {
            Some(directives) => EnvFilter::new(directives),
            None => return,
        },
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
