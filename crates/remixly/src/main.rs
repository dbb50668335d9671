mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use remixly_core::{Controller, FileStateStore};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch the backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "remixly", &mut std::io::stdout());
            Ok(())
        }

        // Everything else runs against the active profile's session
        cmd => {
            let cfg = config::load_config_or_default();
            let resolved = config::resolve(&cli.global, &cfg)?;
            let store = Arc::new(FileStateStore::new(config::state_path(&resolved.name)));
            let mut controller = Controller::new(resolved.client.clone(), store)?;

            tracing::debug!(command = ?cmd, profile = %resolved.name, "dispatching command");
            commands::dispatch(cmd, &mut controller, &resolved, &cli.global).await
        }
    }
}
