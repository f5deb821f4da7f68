//! mkhttps entry point.
//!
//! `mkhttps <upstream-host> <listen-address>` terminates TLS on the listen
//! address with a self-signed identity created on first run, and forwards
//! every request to the upstream over plain HTTP.

use std::process::ExitCode;

use axum_server::Handle;
use mkhttps::config::{self, Args, ArgsError, USAGE};
use mkhttps::lifecycle::{self, signals, Shutdown};
use mkhttps::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    // Arguments come first: a usage error must not touch sockets or files.
    let args = match Args::try_parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(ArgsError::Informational(e)) => e.exit(),
        Err(ArgsError::Usage(e)) => {
            eprintln!("{}", USAGE);
            eprintln!("{}", e.kind());
            return ExitCode::FAILURE;
        }
    };

    let config = match config::config_from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mkhttps: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("mkhttps v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_on_ctrl_c(&signal_shutdown).await;
    });

    match lifecycle::start(&config, Handle::new(), server_shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            eprintln!("mkhttps: {}", e);
            ExitCode::FAILURE
        }
    }
}
