use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod auth;
mod commands;
mod config;
mod controllers;
mod keys;
mod models;
mod storage;
mod types;

mod error;
pub(crate) use error::{ApiError, ApiResult};

use config::Config;

const DEFAULT_CONFIG_FILE: &str = "jotbin.toml";

/// Small paste service: authenticated writes, public reads.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Config file to read (defaults to ./jotbin.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve,
    /// Print a new write token signed with the configured secret, then exit
    NewToken,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for command output such as tokens
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path, true)?,
        None => Config::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(config).await,
        Command::NewToken => commands::new_token::run(&config),
    }
}
