mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, EXIT_FAILURE, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run_app(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.report());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run_app(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("foldbind CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let app_config = config::builder::build_config(cli.config.as_deref(), &cli.set_values)?;
    debug!("Resolved configuration: {:?}", &app_config);

    let result = match cli.command {
        Commands::Structure(args) => {
            info!("Dispatching to 'structure' command.");
            commands::structure::run(args, &app_config)
        }
        Commands::Poses(args) => {
            info!("Dispatching to 'poses' command.");
            commands::poses::run(args, &app_config)
        }
        Commands::Pose(args) => {
            info!("Dispatching to 'pose' command.");
            commands::pose::run(args, &app_config)
        }
        Commands::Affinity(args) => {
            info!("Dispatching to 'affinity' command.");
            commands::affinity::run(args, &app_config)
        }
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(CliError::Tool { tool, source }) => error!("{} failed: {}", tool, source),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
