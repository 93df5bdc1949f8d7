//! Flags shared by several commands

use clap::Args;

use crate::core::config::PipelineConfig;

/// Chunking overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ChunkingArgs {
    /// Characters per chunk [config: pipeline.chunk_size]
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks [config: pipeline.overlap]
    #[arg(long)]
    pub overlap: Option<usize>,
}

impl ChunkingArgs {
    pub fn apply(&self, pipeline: &mut PipelineConfig) {
        if let Some(size) = self.chunk_size {
            pipeline.chunk_size = size;
        }
        if let Some(overlap) = self.overlap {
            pipeline.overlap = overlap;
        }
    }
}

/// File selection overrides
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only process files with this extension (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Process every file regardless of extension
    #[arg(long, conflicts_with = "extensions")]
    pub all_files: bool,

    /// Per-directory ignore file name [default: .gitignore]
    #[arg(long, value_name = "NAME")]
    pub ignore_file: Option<String>,

    /// Also include hidden files and directories
    #[arg(long)]
    pub hidden: bool,
}

impl FilterArgs {
    pub fn apply(&self, pipeline: &mut PipelineConfig) {
        if self.all_files {
            pipeline.allowed_extensions.clear();
        } else if !self.extensions.is_empty() {
            pipeline.allowed_extensions = self.extensions.clone();
        }
        if let Some(name) = &self.ignore_file {
            pipeline.ignore_file_name = name.clone();
        }
        if self.hidden {
            pipeline.skip_hidden = false;
        }
    }
}
