//! Binary entry point: tracing setup, argument parsing, dispatch.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use finlearn::api;
use finlearn::cli::{self, CliError};
use finlearn::config::ServerConfig;
use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "finlearn",
    version,
    about = "FinLearn progression server and tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the REST API server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:5001")]
        addr: SocketAddr,

        /// Storage backend: `redb` or `memory`.
        #[arg(long, default_value = "redb")]
        store: String,

        /// Database file for the redb backend.
        #[arg(long, default_value = "finlearn.redb")]
        db_path: PathBuf,
    },

    /// Create a fresh database file.
    Init {
        #[arg(long, default_value = "finlearn.redb")]
        db_path: PathBuf,

        /// Recreate the file if it already exists.
        #[arg(long)]
        force: bool,
    },

    /// Insert the demo account.
    Seed {
        #[arg(long, default_value = "finlearn.redb")]
        db_path: PathBuf,

        #[arg(long, default_value = "redb")]
        store: String,
    },

    /// Print aggregate store statistics.
    Status {
        #[arg(long, default_value = "finlearn.redb")]
        db_path: PathBuf,

        #[arg(long, default_value = "redb")]
        store: String,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the level table.
    Levels {
        /// Number of rows (default 15).
        #[arg(long)]
        count: Option<u32>,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve {
            addr,
            store,
            db_path,
        } => {
            let config = ServerConfig::from_env();
            let repo = cli::open_repository(&db_path, &store)?;
            api::serve(addr, repo, &config).await?;
            Ok(())
        }
        Command::Init { db_path, force } => cli::cmd_init(&db_path, force),
        Command::Seed { db_path, store } => cli::cmd_seed(&db_path, &store),
        Command::Status {
            db_path,
            store,
            json,
        } => cli::cmd_status(&db_path, &store, json),
        Command::Levels { count, json } => cli::cmd_levels(count, json),
    }
}
