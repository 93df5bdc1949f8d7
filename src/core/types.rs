//! Core data types for codebrief.
//!
//! Chunk outcomes, per-file results, the ordered pipeline result
//! and run statistics.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::core::error::FileReadError;

/// Which kind of output a capability produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Natural-language summary text
    Summary,
    /// Fixed-length numeric vector
    Embedding,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Summary => write!(f, "summary"),
            OutputKind::Embedding => write!(f, "embedding"),
        }
    }
}

/// Output of a capability for a single chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkResult {
    Summary(String),
    Vector(Vec<f32>),
}

impl ChunkResult {
    pub fn kind(&self) -> OutputKind {
        match self {
            ChunkResult::Summary(_) => OutputKind::Summary,
            ChunkResult::Vector(_) => OutputKind::Embedding,
        }
    }
}

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChunkOutcome {
    Summary { text: String },
    Vector { values: Vec<f32> },
    Failed { reason: String },
}

impl ChunkOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ChunkOutcome::Failed { .. })
    }
}

impl From<ChunkResult> for ChunkOutcome {
    fn from(result: ChunkResult) -> Self {
        match result {
            ChunkResult::Summary(text) => ChunkOutcome::Summary { text },
            ChunkResult::Vector(values) => ChunkOutcome::Vector { values },
        }
    }
}

/// One chunk's outcome plus where the chunk came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkEntry {
    /// Sequential chunk number within the file
    pub index: usize,

    /// Byte offset where the chunk starts in the file
    pub start_offset: usize,

    /// Byte offset where the chunk ends in the file
    pub end_offset: usize,

    #[serde(flatten)]
    pub outcome: ChunkOutcome,
}

/// Placeholder substituted into joined summary text for a failed chunk
pub fn failed_placeholder(index: usize, reason: &str) -> String {
    format!("[chunk {index} failed: {reason}]")
}

/// Stored as a file's overview when the overview call fails
pub fn overview_failed_placeholder(reason: &str) -> String {
    format!("[overview failed: {reason}]")
}

/// Aggregated outcome for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileResult {
    /// Chunk summaries joined in chunk order
    Summarized {
        text: String,
        chunks: Vec<ChunkEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overview: Option<String>,
    },

    /// Chunk vectors in chunk order
    Embedded { vectors: Vec<ChunkEntry> },

    /// The file could not be read
    Unreadable { error: FileReadError },

    /// Processing stopped by cancellation or deadline
    Cancelled { chunks_completed: usize },

    /// Processing aborted unexpectedly (a worker task panicked)
    Failed { reason: String },
}

impl FileResult {
    /// Per-chunk entries (empty for unreadable or cancelled files)
    pub fn entries(&self) -> &[ChunkEntry] {
        match self {
            FileResult::Summarized { chunks, .. } => chunks,
            FileResult::Embedded { vectors } => vectors,
            FileResult::Unreadable { .. }
            | FileResult::Cancelled { .. }
            | FileResult::Failed { .. } => &[],
        }
    }

    /// Number of chunks whose capability call failed
    pub fn failed_chunks(&self) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.outcome.is_failed())
            .count()
    }

    /// True if the file was attempted but could not be fully processed
    pub fn has_failures(&self) -> bool {
        match self {
            FileResult::Unreadable { .. }
            | FileResult::Cancelled { .. }
            | FileResult::Failed { .. } => true,
            _ => self.failed_chunks() > 0,
        }
    }

    /// Joined summary text, if this is a summary result
    pub fn text(&self) -> Option<&str> {
        match self {
            FileResult::Summarized { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Successful vectors in chunk order
    pub fn vectors(&self) -> Vec<&[f32]> {
        self.entries()
            .iter()
            .filter_map(|e| match &e.outcome {
                ChunkOutcome::Vector { values } => Some(values.as_slice()),
                _ => None,
            })
            .collect()
    }
}

/// Render a relative path as a stable, `/`-separated key
pub fn path_key(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Ordered mapping from file path (relative to the walk root) to its
/// result.
///
/// Insertion order is walk order. Inserting an existing key replaces
/// the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineResult {
    entries: Vec<(PathBuf, FileResult)>,
    positions: HashMap<PathBuf, usize>,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, result: FileResult) {
        if let Some(&pos) = self.positions.get(&path) {
            self.entries[pos].1 = result;
            return;
        }
        self.positions.insert(path.clone(), self.entries.len());
        self.entries.push((path, result));
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&FileResult> {
        self.positions
            .get(path.as_ref())
            .map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.positions.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(p, _)| p.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &FileResult)> {
        self.entries.iter().map(|(p, r)| (p.as_path(), r))
    }
}

impl IntoIterator for PipelineResult {
    type Item = (PathBuf, FileResult);
    type IntoIter = std::vec::IntoIter<(PathBuf, FileResult)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for PipelineResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, result) in &self.entries {
            map.serialize_entry(&path_key(path), result)?;
        }
        map.end()
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Files whose content was chunked and processed
    pub files_processed: usize,

    /// Files recorded with a read error
    pub files_unreadable: usize,

    /// Files and directories excluded by ignore rules or filters
    pub files_ignored: usize,

    /// Files interrupted by cancellation
    pub files_cancelled: usize,

    /// Files whose processing aborted
    pub files_failed: usize,

    /// Chunks handed to the capability
    pub chunks_processed: usize,

    /// Chunks whose capability call failed
    pub chunks_failed: usize,

    /// Run duration in milliseconds
    pub duration_ms: u64,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Whether the run stopped early
    pub cancelled: bool,
}

impl RunStats {
    pub(crate) fn started() -> Self {
        Self {
            files_processed: 0,
            files_unreadable: 0,
            files_ignored: 0,
            files_cancelled: 0,
            files_failed: 0,
            chunks_processed: 0,
            chunks_failed: 0,
            duration_ms: 0,
            started_at: Utc::now(),
            cancelled: false,
        }
    }

    /// Fold one file result into the counters
    pub(crate) fn record(&mut self, result: &FileResult) {
        match result {
            FileResult::Unreadable { .. } => self.files_unreadable += 1,
            FileResult::Cancelled { chunks_completed } => {
                self.files_cancelled += 1;
                self.chunks_processed += chunks_completed;
            }
            FileResult::Failed { .. } => self.files_failed += 1,
            _ => {
                self.files_processed += 1;
                self.chunks_processed += result.entries().len();
                self.chunks_failed += result.failed_chunks();
            }
        }
    }
}

/// A finished run: the result mapping plus its statistics
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub result: PipelineResult,
    pub stats: RunStats,
}
