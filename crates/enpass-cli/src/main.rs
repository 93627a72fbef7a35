//! enpasscli - read entries from an Enpass vault
//!
//! This is the command-line interface for enpass-core. It unlocks a vault
//! from a password, keyfile or PIN cache and prints matching entries.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;

use clap::Parser;
use enpass_core::VaultError;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{entries, maintenance};
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.log.as_deref()) {
        CliError::invalid_input(err.to_string()).exit()
    }
    let ctx = AppContext::new(&cli);

    if let Err(err) = run(&ctx, &cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit()
        }
        if let Some(vault_err) = err.downcast_ref::<VaultError>() {
            CliError::from_vault_error(vault_err).exit()
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `--log` wins over `RUST_LOG`.
fn init_tracing(log_level: Option<&str>) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::new(log_directives(level)?),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("enpasscli={0},enpass_core={0},warn", DEFAULT_LOG_LEVEL))),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn log_directives(level: &str) -> anyhow::Result<String> {
    let level: tracing::Level = level
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log level: {}", level))?;
    let level = level.to_string().to_lowercase();
    Ok(format!("enpasscli={0},enpass_core={0},warn", level))
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Dryrun => maintenance::handle_dryrun(ctx),
        Commands::List(args) => entries::handle_list(ctx, args),
        Commands::Show(args) => entries::handle_show(ctx, args),
        Commands::Pass(args) => entries::handle_pass(ctx, args),
        Commands::Lock => maintenance::handle_lock(ctx),
    }
}
