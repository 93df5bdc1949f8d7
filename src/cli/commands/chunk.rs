//! Chunk command - preview chunk boundaries for one file

use crate::cli::commands::common::ChunkingArgs;
use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::pipeline::Chunker;
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const PREVIEW_CHARS: usize = 60;

/// Arguments for the chunk command
#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// File to split
    pub file: PathBuf,

    #[command(flatten)]
    pub chunking: ChunkingArgs,
}

#[derive(Debug, Serialize)]
pub struct ChunkInfo {
    pub index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub chars: usize,
    pub preview: String,
}

/// Chunk preview response
#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub file: String,
    pub chunk_size: usize,
    pub overlap: usize,
    pub total_chars: usize,
    pub chunks: Vec<ChunkInfo>,
}

/// First line of a chunk, shortened for display
fn preview(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() > PREVIEW_CHARS {
        let mut short: String = line.chars().take(PREVIEW_CHARS).collect();
        short.push('…');
        short
    } else {
        line.to_string()
    }
}

/// Execute the chunk command
pub fn execute(
    args: ChunkArgs,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    args.chunking.apply(&mut config.pipeline);
    let chunker = Chunker::new(config.pipeline.chunk_size, config.pipeline.overlap)?;

    let contents = fs::read_to_string(&args.file)
        .map_err(|e| format!("Failed to read '{}': {}", args.file.display(), e))?;

    let response = ChunkResponse {
        file: args.file.to_string_lossy().into_owned(),
        chunk_size: chunker.max_size(),
        overlap: chunker.overlap(),
        total_chars: contents.chars().count(),
        chunks: chunker
            .split(&contents)
            .map(|chunk| ChunkInfo {
                index: chunk.index,
                start_offset: chunk.start_offset,
                end_offset: chunk.end_offset,
                chars: chunk.text.chars().count(),
                preview: preview(chunk.text),
            })
            .collect(),
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} chars, {} chunks (size {}, overlap {})",
                colors::file_path(&response.file),
                colors::number(&response.total_chars.to_string()),
                colors::number(&response.chunks.len().to_string()),
                response.chunk_size,
                response.overlap
            );
            for chunk in &response.chunks {
                println!(
                    "  #{:<4} bytes {}..{} ({} chars)  {}",
                    chunk.index,
                    chunk.start_offset,
                    chunk.end_offset,
                    chunk.chars,
                    colors::dim(&chunk.preview)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
