mod commands;
mod engines;
mod error;
mod logger;
mod operations;
mod report;
mod subgraphs;

#[cfg(test)]
mod tests;

use std::process::ExitCode;

use audit_config::{config_json_schema, load_config};
use clap::Parser;

use crate::{
    commands::{
        audit::{run_audit, AuditArgs},
        diff::{run_diff, DiffArgs},
        normalize::{run_normalize, NormalizeArgs},
    },
    error::CliError,
    logger::configure_logging,
};

/// Compares the query plans of a federated graph before and after a
/// Federation 2 migration.
#[derive(Debug, Parser)]
#[command(name = "fed2-audit", version)]
struct Cli {
    /// Path to the config file. Defaults to `fed2-audit.config.yaml`, `.yml`
    /// or `.json` in the current directory.
    #[arg(long, global = true, env = "FED2_AUDIT_CONFIG_FILE_PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Composes the configured subgraphs with both engines and audits the
    /// query plans of every operation.
    Audit(AuditArgs),
    /// Diffs a Federation 1 query plan against a Federation 2 one.
    Diff(DiffArgs),
    /// Prints the normalized form of a query plan.
    Normalize(NormalizeArgs),
    /// Prints the JSON schema of the config file.
    ConfigSchema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("💣 {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    if let Command::ConfigSchema = cli.command {
        println!("{}", serde_json::to_string_pretty(&config_json_schema())?);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config)?;
    let _log_guard = configure_logging(&config.log);

    match cli.command {
        Command::Audit(args) => run_audit(&config, args).await,
        Command::Diff(args) => run_diff(args),
        Command::Normalize(args) => run_normalize(args).map(|_| ExitCode::SUCCESS),
        Command::ConfigSchema => Ok(ExitCode::SUCCESS),
    }
}
