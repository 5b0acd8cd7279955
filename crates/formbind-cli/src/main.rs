//! # formbind CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formbind_cli::bind::{run_bind, BindArgs};
use formbind_cli::check::{run_check, CheckArgs};
use formbind_cli::services::{run_services, ServicesArgs};
use formbind_cli::EXIT_CONFIGURATION;

/// formbind: bind untyped input to typed, validated objects.
///
/// Loads a schema document (YAML or JSON), binds JSON input against it with
/// the built-in services, and prints the bound result as JSON.
#[derive(Parser, Debug)]
#[command(name = "formbind", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bind JSON input against a schema document.
    Bind(BindArgs),

    /// Build a schema document and report problems without binding.
    Check(CheckArgs),

    /// List the built-in services and their capabilities.
    Services(ServicesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("formbind CLI starting");

    let result = match &cli.command {
        Commands::Bind(args) => run_bind(args),
        Commands::Check(args) => run_check(args),
        Commands::Services(args) => run_services(args, &mut std::io::stdout().lock()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_CONFIGURATION)
        }
    }
}
