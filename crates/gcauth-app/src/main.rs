// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gcauth: Game Center identity verification tool.
//
// Entry point. Initialises logging, parses the command line, and dispatches
// to the command handlers.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gcauth", version, about = "Game Center identity signatures: generate and verify")]
struct Cli {
    /// Verifier configuration file (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the local player for a signature and print the outcome as JSON.
    Generate,
    /// Verify a signature document; `-` reads standard input.
    Verify { path: PathBuf },
    /// Download a public-key certificate and print its SHA-256 fingerprint.
    FetchCert { url: String },
    /// Print the effective verifier configuration.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate => commands::generate().await,
        Command::Verify { path } => commands::verify(cli.config.as_deref(), &path).await,
        Command::FetchCert { url } => commands::fetch_cert(cli.config.as_deref(), &url).await,
        Command::Config => commands::print_config(cli.config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
