//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a
//! specific CLI command. Flags shared between commands live in
//! `common` and are flattened into each command's arguments.

pub mod chunk;
pub mod common;
pub mod completions;
pub mod config;
pub mod list_files;
pub mod run;

// Re-export argument types for use in mod.rs
pub use chunk::ChunkArgs;
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use list_files::ListFilesArgs;
pub use run::PipelineArgs;
