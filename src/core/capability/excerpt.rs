//! Extractive summarizer.
//!
//! Produces a short, deterministic description of a chunk without
//! calling any model: the first meaningful line plus line and
//! character counts. Useful for dry runs, tests and as a baseline.

use super::{Capability, ChunkRequest};
use crate::core::error::CapabilityError;
use crate::core::types::{path_key, ChunkResult, OutputKind};

pub const DEFAULT_EXCERPT_CHARS: usize = 120;

#[derive(Debug, Clone, Copy)]
pub struct ExcerptSummarizer {
    /// Maximum characters kept from the leading line
    pub max_chars: usize,
}

impl Default for ExcerptSummarizer {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl ExcerptSummarizer {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    /// First line with at least one alphanumeric character
    fn leading_line(text: &str) -> Option<&str> {
        text.lines()
            .map(str::trim)
            .find(|line| line.chars().any(char::is_alphanumeric))
    }

    fn truncate(&self, line: &str) -> String {
        if line.chars().count() <= self.max_chars {
            return line.to_string();
        }
        let mut out: String = line.chars().take(self.max_chars).collect();
        out.push('…');
        out
    }
}

impl Capability for ExcerptSummarizer {
    fn name(&self) -> &str {
        "excerpt"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Summary
    }

    fn process(&self, request: &ChunkRequest<'_>) -> Result<ChunkResult, CapabilityError> {
        let lines = request.text.lines().count();
        let chars = request.text.chars().count();
        let lead = Self::leading_line(request.text)
            .map(|line| self.truncate(line))
            .unwrap_or_else(|| "(no text)".to_string());

        Ok(ChunkResult::Summary(format!(
            "{} [{}]: {} ({} lines, {} chars)",
            path_key(request.path),
            request.index,
            lead,
            lines,
            chars
        )))
    }
}
