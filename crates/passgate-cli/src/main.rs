//! Passgate CLI: Policy administration and offline verification runs.
//!
//! Subcommands: init, policy, resolve-key, redact, verify.

mod commands;
mod config;
mod logging;
mod setup;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::PassgateConfig;

/// Passgate: per-identity verification policies and selective disclosure.
#[derive(Parser, Debug)]
#[command(name = "passgate", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "passgate.toml")]
    config: PathBuf,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Read or write stored policies.
    Policy(commands::policy::PolicyArgs),
    /// Print the action key for an identity and context data.
    ResolveKey(commands::resolve_key::ResolveKeyArgs),
    /// Apply a stored policy to a credential subject.
    Redact(commands::redact::RedactArgs),
    /// Run a verification request through the pipeline.
    Verify(commands::verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PassgateConfig::load(&cli.config)?;
    if let Some(ref data_dir) = cli.data_dir {
        config.store.data_dir = data_dir.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    logging::init(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(&cli.config, args),
        Commands::Policy(args) => commands::policy::run(&config, args).await,
        Commands::ResolveKey(args) => commands::resolve_key::run(&config, args),
        Commands::Redact(args) => commands::redact::run(&config, args).await,
        Commands::Verify(args) => commands::verify::run(&config, args).await,
    }
}
