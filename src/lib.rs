//! codebrief - chunked summaries and embeddings for source trees
//!
//! Walks a directory honoring `.gitignore`-style rules, splits each
//! eligible file into bounded, overlapping chunks, hands every chunk to
//! an injected [`Capability`] (a summarizer or an embedder) and
//! aggregates the outputs into one [`FileResult`] per file.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - capability (summarizer/embedder interface and built-ins)
//!   - pipeline (walking, filtering, chunking, orchestration)
//!   - sink (JSON, text report, vector records)
//!
//! - **cli**: clap adapter (depends on core)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use codebrief::core::capability::from_fn;
//! use codebrief::{ChunkResult, Config, DirectoryPipeline, OutputKind};
//!
//! let capability = Arc::new(from_fn("chars", OutputKind::Summary, |text: &str| {
//!     Ok(ChunkResult::Summary(format!("{} chars", text.chars().count())))
//! }));
//! let pipeline = DirectoryPipeline::from_config(&Config::default(), capability)?;
//!
//! for (path, result) in pipeline.run(Path::new("."))?.iter() {
//!     println!("{}: {:?}", path.display(), result.text());
//! }
//! # Ok::<(), codebrief::BriefError>(())
//! ```

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::capability::{Capability, ChunkRequest};
pub use core::config::Config;
pub use core::error::{BriefError, CapabilityError, FileReadError, Result, SinkError};
pub use core::pipeline::{CancellationToken, Chunker, DirectoryPipeline};
pub use core::sink::{JsonSink, ResultSink, SinkTarget, TextReportSink, VectorRecordSink};
pub use core::types::*;
