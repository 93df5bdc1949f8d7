//! Summarizer/embedder capabilities.
//!
//! The pipeline never talks to a model directly. It hands each chunk
//! to a [`Capability`] constructed once by the caller and receives a
//! [`ChunkResult`] or a [`CapabilityError`]. Built-in capabilities:
//!
//! - **excerpt**: deterministic extractive summary, no model needed
//! - **ngram**: hashed character-trigram embedding
//! - **command**: pipes each chunk through an external program (a
//!   local model runner, a script calling a hosted API, ...)

pub mod command;
pub mod excerpt;
pub mod ngram;

pub use command::CommandCapability;
pub use excerpt::ExcerptSummarizer;
pub use ngram::NgramEmbedder;

use std::path::Path;
use std::sync::Arc;

use crate::core::config::{CapabilityBackend, CapabilityConfig};
use crate::core::error::{BriefError, CapabilityError, Result};
use crate::core::types::{ChunkResult, OutputKind};

/// One chunk handed to a capability
#[derive(Debug, Clone, Copy)]
pub struct ChunkRequest<'a> {
    /// Source file, relative to the walk root
    pub path: &'a Path,

    /// Sequential chunk number within the file
    pub index: usize,

    /// Chunk text
    pub text: &'a str,
}

/// Converts one chunk into a summary or a vector.
///
/// Calls for the chunks of one file are made sequentially, in chunk
/// order. Implementations shared across workers must be `Send + Sync`.
pub trait Capability: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// The kind of output this capability produces
    fn kind(&self) -> OutputKind;

    /// Process one chunk
    fn process(
        &self,
        request: &ChunkRequest<'_>,
    ) -> std::result::Result<ChunkResult, CapabilityError>;
}

/// Capability backed by a closure over the chunk text
pub struct FnCapability<F> {
    name: String,
    kind: OutputKind,
    f: F,
}

impl<F> Capability for FnCapability<F>
where
    F: Fn(&str) -> std::result::Result<ChunkResult, CapabilityError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> OutputKind {
        self.kind
    }

    fn process(
        &self,
        request: &ChunkRequest<'_>,
    ) -> std::result::Result<ChunkResult, CapabilityError> {
        (self.f)(request.text)
    }
}

/// Wrap a closure as a capability
///
/// ```
/// use codebrief::core::capability::{from_fn, Capability};
/// use codebrief::{ChunkResult, OutputKind};
///
/// let upper = from_fn("upper", OutputKind::Summary, |text: &str| {
///     Ok(ChunkResult::Summary(text.to_uppercase()))
/// });
/// assert_eq!(upper.kind(), OutputKind::Summary);
/// ```
pub fn from_fn<F>(name: impl Into<String>, kind: OutputKind, f: F) -> FnCapability<F>
where
    F: Fn(&str) -> std::result::Result<ChunkResult, CapabilityError> + Send + Sync,
{
    FnCapability {
        name: name.into(),
        kind,
        f,
    }
}

/// Build the configured capability for the requested output kind
///
/// # Errors
///
/// `InvalidConfiguration` if the backend cannot produce `kind` or the
/// command backend has no program.
pub fn from_config(config: &CapabilityConfig, kind: OutputKind) -> Result<Arc<dyn Capability>> {
    let backend = match kind {
        OutputKind::Summary => config.summarizer,
        OutputKind::Embedding => config.embedder,
    };

    match (backend, kind) {
        (CapabilityBackend::Excerpt, OutputKind::Summary) => {
            Ok(Arc::new(ExcerptSummarizer::new(config.excerpt_chars)))
        }
        (CapabilityBackend::Ngram, OutputKind::Embedding) => {
            Ok(Arc::new(NgramEmbedder::new(config.dimensions)))
        }
        (CapabilityBackend::Command, _) => {
            let program = config
                .command
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| {
                    BriefError::InvalidConfiguration(
                        "command backend requires a program".to_string(),
                    )
                })?;
            Ok(Arc::new(CommandCapability::new(
                program,
                config.args.clone(),
                kind,
            )))
        }
        (backend, kind) => Err(BriefError::InvalidConfiguration(format!(
            "{backend} backend cannot produce {kind} output"
        ))),
    }
}
