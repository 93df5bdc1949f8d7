//! Result sinks.
//!
//! A sink receives the finished [`PipelineResult`] once per run. Sink
//! failures are reported as [`SinkError`] and never invalidate the
//! result itself.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::core::error::SinkError;
use crate::core::types::{path_key, ChunkOutcome, FileResult, PipelineResult};

/// Persists or forwards a pipeline result
pub trait ResultSink: Send + Sync {
    fn write(&self, result: &PipelineResult) -> Result<(), SinkError>;
}

/// Where a sink writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    File(PathBuf),
}

impl SinkTarget {
    /// `None` means stdout
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map(SinkTarget::File).unwrap_or(SinkTarget::Stdout)
    }

    fn describe(&self) -> String {
        match self {
            SinkTarget::Stdout => "stdout".to_string(),
            SinkTarget::File(path) => path.display().to_string(),
        }
    }

    fn io_error(&self, source: io::Error) -> SinkError {
        SinkError::Write {
            target: self.describe(),
            source,
        }
    }

    fn write_all(&self, bytes: &[u8]) -> Result<(), SinkError> {
        let result = match self {
            SinkTarget::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes).and_then(|_| out.flush())
            }
            SinkTarget::File(path) => File::create(path).and_then(|file| {
                let mut writer = BufWriter::new(file);
                writer.write_all(bytes)?;
                writer.flush()
            }),
        };
        result.map_err(|e| self.io_error(e))
    }
}

/// Pretty JSON object keyed by file path, in walk order
#[derive(Debug, Clone)]
pub struct JsonSink {
    target: SinkTarget,
}

impl JsonSink {
    pub fn new(target: SinkTarget) -> Self {
        Self { target }
    }
}

impl ResultSink for JsonSink {
    fn write(&self, result: &PipelineResult) -> Result<(), SinkError> {
        let mut json = serde_json::to_string_pretty(result)?;
        json.push('\n');
        self.target.write_all(json.as_bytes())
    }
}

/// Plain-text report: one `--- path ---` block per file
#[derive(Debug, Clone)]
pub struct TextReportSink {
    target: SinkTarget,
}

impl TextReportSink {
    pub fn new(target: SinkTarget) -> Self {
        Self { target }
    }

    pub fn render(result: &PipelineResult) -> String {
        let mut out = String::new();
        for (path, file_result) in result.iter() {
            out.push_str(&format!("--- {} ---\n", path_key(path)));
            match file_result {
                FileResult::Summarized { text, overview, .. } => {
                    if let Some(overview) = overview {
                        out.push_str(&format!("Overview: {overview}\n\n"));
                    }
                    out.push_str(text);
                }
                FileResult::Embedded { .. } => {
                    let vectors = file_result.vectors();
                    let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
                    out.push_str(&format!(
                        "{} vectors ({} dims, {} failed)",
                        vectors.len(),
                        dims,
                        file_result.failed_chunks()
                    ));
                }
                FileResult::Unreadable { error } => {
                    out.push_str(&format!("[unreadable: {error}]"));
                }
                FileResult::Cancelled { chunks_completed } => {
                    out.push_str(&format!("[cancelled after {chunks_completed} chunks]"));
                }
                FileResult::Failed { reason } => {
                    out.push_str(&format!("[failed: {reason}]"));
                }
            }
            out.push_str("\n\n");
        }
        out
    }
}

impl ResultSink for TextReportSink {
    fn write(&self, result: &PipelineResult) -> Result<(), SinkError> {
        self.target.write_all(Self::render(result).as_bytes())
    }
}

/// One vector upsert record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord<'a> {
    /// `<path>#<chunk index>`
    pub id: String,
    pub values: &'a [f32],
    pub metadata: VectorMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VectorMetadata {
    pub path: String,
    pub chunk_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// JSON Lines vector records, one per successfully embedded chunk
///
/// Failed chunks and non-embedding results are not written.
#[derive(Debug, Clone)]
pub struct VectorRecordSink {
    target: SinkTarget,
}

impl VectorRecordSink {
    pub fn new(target: SinkTarget) -> Self {
        Self { target }
    }

    pub fn records(result: &PipelineResult) -> Vec<VectorRecord<'_>> {
        let mut records = Vec::new();
        for (path, file_result) in result.iter() {
            let FileResult::Embedded { vectors } = file_result else {
                continue;
            };
            let key = path_key(path);
            for entry in vectors {
                if let ChunkOutcome::Vector { values } = &entry.outcome {
                    records.push(VectorRecord {
                        id: format!("{key}#{}", entry.index),
                        values,
                        metadata: VectorMetadata {
                            path: key.clone(),
                            chunk_index: entry.index,
                            start_offset: entry.start_offset,
                            end_offset: entry.end_offset,
                        },
                    });
                }
            }
        }
        records
    }
}

impl ResultSink for VectorRecordSink {
    fn write(&self, result: &PipelineResult) -> Result<(), SinkError> {
        let mut lines = String::new();
        for record in Self::records(result) {
            lines.push_str(&serde_json::to_string(&record)?);
            lines.push('\n');
        }
        self.target.write_all(lines.as_bytes())
    }
}
