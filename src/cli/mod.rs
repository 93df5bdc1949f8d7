//! CLI adapter for codebrief
//!
//! Thin clap layer over `core/`: each command loads the configuration,
//! applies its flag overrides and calls into the library.
//!
//! ```text
//!   codebrief summarize ./repo --sink text --output brief.txt
//!   codebrief embed ./repo --sink vectors --output vectors.jsonl
//!   codebrief list-files ./repo --ext rs --ext toml
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::core::config::Config;
use crate::core::types::OutputKind;

/// codebrief - summarize or embed a source tree chunk by chunk
///
/// Walks a directory honoring .gitignore rules, splits each file into
/// overlapping chunks and runs every chunk through a summarizer or
/// embedder.
#[derive(Parser, Debug)]
#[command(name = "codebrief")]
#[command(version)]
#[command(about = "Chunked summaries and embeddings for source trees", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Debug logging (overridden by CODEBRIEF_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Log format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize every eligible file, chunk by chunk
    Summarize(commands::PipelineArgs),

    /// Embed every chunk of every eligible file
    Embed(commands::PipelineArgs),

    /// List the files a run would process, in walk order
    #[command(name = "list-files")]
    ListFiles(commands::ListFilesArgs),

    /// Show the chunk boundaries of one file
    Chunk(commands::ChunkArgs),

    /// Show the effective configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  codebrief completions bash > ~/.local/share/bash-completion/completions/codebrief
    ///   zsh:   codebrief completions zsh > ~/.zfunc/_codebrief
    ///   fish:  codebrief completions fish > ~/.config/fish/completions/codebrief.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let format = cli.format;

    match cli.command {
        // Doesn't need configuration
        Commands::Completions(args) => commands::completions::execute(args),
        command => {
            let config = Config::load()?;
            config.log_config();

            match command {
                Commands::Summarize(args) => {
                    commands::run::execute(args, OutputKind::Summary, config, format).await
                }
                Commands::Embed(args) => {
                    commands::run::execute(args, OutputKind::Embedding, config, format).await
                }
                Commands::ListFiles(args) => commands::list_files::execute(args, config, format),
                Commands::Chunk(args) => commands::chunk::execute(args, config, format),
                Commands::ShowConfig(args) => commands::config::execute(args, &config, format),
                Commands::Completions(args) => commands::completions::execute(args),
            }
        }
    }
}
