//! spotify-remote - control the Spotify desktop client from the command line.
//!
//! Finds the client's local control interface, authenticates against it and
//! runs a single playback command.

mod cli;
mod commands;
mod format;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use spotify_remote_core::{ClientConfig, CredentialStore, RemoteClient};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Args;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.client_config(ClientConfig::from_env()?);
    let store = CredentialStore::new(config.credential_path.clone());

    let mut client = RemoteClient::connect(config).await?;
    client.handshake(&store).await?;
    info!(command = ?args.command, "Running command");

    let mut stdout = io::stdout().lock();
    commands::run(&client, &args.command, &mut stdout).await
}
