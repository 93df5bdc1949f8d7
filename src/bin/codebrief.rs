//! codebrief CLI
//!
//! # Examples
//!
//! ```bash
//! # Summarize a repository with the built-in extractive summarizer
//! codebrief summarize ./repo
//!
//! # Summarize through a local model, four files at a time
//! codebrief summarize ./repo --capability command \
//!     --command ollama --arg run --arg llama3.2:1b --workers 4
//!
//! # Write embedding records for an external vector loader
//! codebrief embed ./repo --sink vectors --output vectors.jsonl
//! ```

use clap::Parser;
use codebrief::cli::{run, Cli, LogFormat};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool, format: LogFormat) {
    let fallback = if verbose {
        "codebrief=debug"
    } else {
        "codebrief=warn"
    };
    let filter = EnvFilter::try_from_env("CODEBRIEF_LOG").unwrap_or_else(|_| fallback.into());

    // stderr only: stdout carries command output
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
