//! CLI test helpers
//!
//! Builders for command argument structs with every flag unset, so each
//! test only spells out what it overrides.

use codebrief::cli::commands::common::{ChunkingArgs, FilterArgs};
use codebrief::cli::commands::PipelineArgs;
use codebrief::Config;
use std::path::Path;

/// Pipeline arguments with no overrides and progress suppressed
pub fn pipeline_args(path: &Path) -> PipelineArgs {
    PipelineArgs {
        path: path.to_path_buf(),
        capability: None,
        command: None,
        args: Vec::new(),
        dimensions: None,
        chunking: ChunkingArgs::default(),
        filter: FilterArgs::default(),
        workers: None,
        timeout_secs: None,
        overview: false,
        sink: None,
        output: None,
        quiet: true,
    }
}

/// Defaults, independent of any config file on the test machine
pub fn test_config() -> Config {
    Config::default()
}
