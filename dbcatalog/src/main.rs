//! Database schema catalog tool.
//!
//! Connects read-only to the configured databases, catalogs their tables,
//! views, functions and procedures, and exports the result.

use std::process::ExitCode;

use clap::Parser;
use dbcatalog::{Cli, run};
use dbcatalog_core::logging::init_logging;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing in-flight queries");
            signal_token.cancel();
        }
    });

    match run(&cli, &cancel).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
