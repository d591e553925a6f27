//! Scangate CLI entry point.
//!
//! `scangate run` is the build-step binary: it runs one daemon session
//! and turns the verdict into an exit code the pipeline can gate on (see
//! `CliError::exit_code` for the full table).

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use scangate_core::config::GeneralConfig;
use scangate_core::types::SessionResult;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("scangate: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn dispatch(cli: Cli) -> Result<u8, CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Run(args) => {
            // `run` initializes tracing itself, after the config is loaded.
            let result =
                commands::run::execute(args, &cli.config, cli.log_level.as_deref(), &writer)
                    .await?;
            Ok(exit_code_for_result(result))
        }
        Commands::Config(args) => {
            // Config tooling must work even when the file is broken, so
            // logging comes up with defaults rather than from the file.
            let general = GeneralConfig {
                log_level: cli.log_level.unwrap_or_else(|| "info".to_owned()),
                log_format: "pretty".to_owned(),
            };
            logging::init_tracing(&general)?;
            commands::config::execute(args, &cli.config, &writer).await?;
            Ok(0)
        }
    }
}

/// Verdict-to-exit-code mapping for the gate.
fn exit_code_for_result(result: SessionResult) -> u8 {
    match result {
        SessionResult::Success => 0,
        SessionResult::Failure => 4,
        SessionResult::Unstable => 5,
    }
}
