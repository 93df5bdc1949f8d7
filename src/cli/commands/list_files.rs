//! List-files command - show which files a run would process

use crate::cli::commands::common::FilterArgs;
use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::pipeline::{FileWalker, PathFilter};
use crate::core::types::path_key;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the list-files command
#[derive(Args, Debug)]
pub struct ListFilesArgs {
    /// Root directory to walk
    pub path: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// File listing response
#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub root: String,
    pub files: Vec<String>,
    pub ignored: usize,
}

/// Execute the list-files command
pub fn execute(
    args: ListFilesArgs,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    args.filter.apply(&mut config.pipeline);
    config.validate()?;

    let pipeline = &config.pipeline;
    let walker = FileWalker::new(
        PathFilter::new(
            pipeline.ignore_file_name.clone(),
            &pipeline.builtin_ignores,
            &pipeline.allowed_extensions,
            pipeline.skip_hidden,
        ),
        pipeline.max_file_size_mb,
    );

    let outcome = walker.collect_files(&args.path)?;
    let response = ListFilesResponse {
        root: args.path.to_string_lossy().into_owned(),
        files: outcome.files.iter().map(|f| path_key(&f.relative)).collect(),
        ignored: outcome.ignored,
    };

    match format {
        OutputFormat::Human => {
            for file in &response.files {
                println!("{}", colors::file_path(file));
            }
            eprintln!(
                "{} files ({} ignored)",
                colors::number(&response.files.len().to_string()),
                colors::number(&response.ignored.to_string())
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
