//! Core domain logic
//!
//! Everything the CLI does is available here as a library.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Chunk outcomes, file results, the ordered result map
//! - **xdg**: XDG config directory handling
//! - **capability**: Summarizer/embedder interface and built-ins
//! - **pipeline**: Walk, filter, chunk, process, aggregate
//! - **sink**: Result persistence

pub mod capability;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use capability::{Capability, ChunkRequest};
pub use config::Config;
pub use error::{BriefError, CapabilityError, FileReadError, Result, SinkError};
pub use pipeline::{CancellationToken, DirectoryPipeline};
pub use sink::ResultSink;
