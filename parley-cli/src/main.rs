//! `parley`: chat, creative writing and code completion against a local
//! Ollama server or the Gemini API.
//!
//! ```sh
//! parley chat
//! parley story --preset rain
//! parley --backend google recipe masala dosa
//! parley complete -l python -f todo.py -o .
//! parley serve --bind 127.0.0.1:8080
//! ```
//!
//! Settings come from flags or the environment (a `.env` file is loaded
//! first): `PARLEY_BACKEND`, `PARLEY_OLLAMA_URL`, `PARLEY_MODEL`,
//! `PARLEY_TIMEOUT_SECS`, `PARLEY_BIND` and `GEMINI_API_KEY`.

mod backend;
mod cli;
mod commands;
mod format;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
