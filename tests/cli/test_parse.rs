//! Tests for argument parsing
//!
//! - Subcommand names and global flags
//! - Flag dependencies and conflicts

use clap::Parser;
use codebrief::cli::commands::run::{CapabilityChoice, SinkKind};
use codebrief::cli::{Cli, Commands, OutputFormat};

#[test]
fn test_parse_summarize_with_sink() {
    let cli = Cli::try_parse_from([
        "codebrief",
        "--format",
        "json",
        "summarize",
        "./repo",
        "--sink",
        "text",
        "-o",
        "brief.txt",
        "--chunk-size",
        "800",
        "--ext",
        "rs",
        "--ext",
        "toml",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Json);
    match cli.command {
        Commands::Summarize(args) => {
            assert_eq!(args.sink, Some(SinkKind::Text));
            assert_eq!(args.chunking.chunk_size, Some(800));
            assert_eq!(args.filter.extensions, vec!["rs", "toml"]);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_command_backend_args() {
    let cli = Cli::try_parse_from([
        "codebrief",
        "embed",
        ".",
        "-c",
        "command",
        "--command",
        "embedder",
        "--arg",
        "--model",
        "--arg",
        "{path}",
    ])
    .unwrap();

    match cli.command {
        Commands::Embed(args) => {
            assert_eq!(args.capability, Some(CapabilityChoice::Command));
            assert_eq!(args.command.as_deref(), Some("embedder"));
            assert_eq!(args.args, vec!["--model", "{path}"]);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_output_requires_sink() {
    let result = Cli::try_parse_from(["codebrief", "summarize", ".", "--output", "out.json"]);
    assert!(result.is_err());
}

#[test]
fn test_all_files_conflicts_with_ext() {
    let result = Cli::try_parse_from(["codebrief", "list-files", ".", "--all-files", "--ext", "py"]);
    assert!(result.is_err());
}

#[test]
fn test_verbose_is_global() {
    let cli = Cli::try_parse_from(["codebrief", "show-config", "-v"]).unwrap();
    assert!(cli.verbose);
}
