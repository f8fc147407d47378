//! Ledger - personal finance from the terminal
//!
//! Thin shell over `ledger-core`: parses the command line, opens the local
//! database and keeps the session token between invocations.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod money;
mod state;

fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env("LEDGER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = cli::Cli::parse();

    let mut app_state = match state::AppState::new(cli.config.as_deref(), cli.data_dir.clone()) {
        Ok(state) => state,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to initialize application");
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::run(cli.command, &mut app_state) {
        match e.downcast_ref::<ledger_core::Error>() {
            Some(err) => {
                tracing::debug!(error = %err, "Command failed");
                eprintln!("error: {}", err.user_message());
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}
