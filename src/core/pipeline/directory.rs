//! Directory pipeline orchestration.
//!
//! Coordinates the end-to-end workflow:
//! 1. Walk the directory tree (scoped ignore rules, extension filter)
//! 2. Read each file as UTF-8
//! 3. Chunk the text
//! 4. Hand each chunk to the capability, in chunk order
//! 5. Aggregate chunk outcomes into one result per file
//!
//! Per-file and per-chunk failures are recorded in the result; only a
//! bad configuration or an unreadable root aborts a run.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::capability::{Capability, ChunkRequest};
use crate::core::config::{Config, LimitsConfig, PipelineConfig};
use crate::core::error::{BriefError, FileReadError, Result, SinkError};
use crate::core::pipeline::cancel::{CancellationToken, StopCondition};
use crate::core::pipeline::chunker::Chunker;
use crate::core::pipeline::filter::PathFilter;
use crate::core::pipeline::walker::{FileWalker, WalkedFile};
use crate::core::sink::ResultSink;
use crate::core::types::{
    failed_placeholder, overview_failed_placeholder, ChunkEntry, ChunkOutcome, ChunkResult, FileResult, OutputKind,
    PipelineReport, PipelineResult, RunStats,
};

/// Progress notification emitted after each file
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    /// File just finished, relative to the root
    pub path: &'a Path,

    /// Files finished so far in this run
    pub completed: usize,

    /// Files selected by the walk
    pub total: usize,

    pub result: &'a FileResult,
}

/// Observer callback for [`ProgressEvent`]s
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent<'_>) + Send + Sync>;

/// Walks a directory and runs every eligible file through a capability
pub struct DirectoryPipeline {
    walker: FileWalker,
    chunker: Chunker,
    capability: Arc<dyn Capability>,
    separator: String,
    overview: bool,
    pub(crate) workers: usize,
    timeout: Option<Duration>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl DirectoryPipeline {
    /// Create a new pipeline
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Chunking, filtering and aggregation settings
    /// * `limits` - Worker count and deadline
    /// * `capability` - Summarizer or embedder applied to every chunk
    ///
    /// # Returns
    ///
    /// The pipeline, or `InvalidConfiguration` for bad chunking or
    /// limit parameters
    pub fn new(
        pipeline: &PipelineConfig,
        limits: &LimitsConfig,
        capability: Arc<dyn Capability>,
    ) -> Result<Self> {
        let chunker = Chunker::new(pipeline.chunk_size, pipeline.overlap)?;

        if limits.workers == 0 {
            return Err(BriefError::InvalidConfiguration(
                "workers must be > 0".to_string(),
            ));
        }

        let filter = PathFilter::new(
            pipeline.ignore_file_name.clone(),
            &pipeline.builtin_ignores,
            &pipeline.allowed_extensions,
            pipeline.skip_hidden,
        );

        let timeout = (limits.timeout_sec > 0).then(|| Duration::from_secs(limits.timeout_sec));

        Ok(Self {
            walker: FileWalker::new(filter, pipeline.max_file_size_mb),
            chunker,
            capability,
            separator: pipeline.separator.clone(),
            overview: pipeline.overview,
            workers: limits.workers,
            timeout,
            cancel: CancellationToken::new(),
            progress: None,
        })
    }

    /// Create a pipeline from a loaded [`Config`]
    pub fn from_config(config: &Config, capability: Arc<dyn Capability>) -> Result<Self> {
        Self::new(&config.pipeline, &config.limits, capability)
    }

    /// Observe cancellation through `token`
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Call `callback` after every file
    ///
    /// Concurrent runs call it from worker threads, in completion order.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressEvent<'_>) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Stop starting new chunks once `timeout` has elapsed
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn capability(&self) -> &dyn Capability {
        self.capability.as_ref()
    }

    pub fn walker(&self) -> &FileWalker {
        &self.walker
    }

    /// Run the pipeline and return only the result mapping
    pub fn run(&self, root: &Path) -> Result<PipelineResult> {
        Ok(self.run_with_stats(root)?.result)
    }

    /// Run the pipeline sequentially
    ///
    /// Walks the tree, then processes files one at a time in walk
    /// order. Unreadable files and failed chunks are recorded inline
    /// and don't stop the run.
    ///
    /// # Arguments
    ///
    /// * `root` - Root directory to process
    ///
    /// # Returns
    ///
    /// The result mapping plus run statistics, or an error if the root
    /// cannot be walked
    pub fn run_with_stats(&self, root: &Path) -> Result<PipelineReport> {
        let start = Instant::now();
        let stop = self.stop_condition(start);
        let mut stats = RunStats::started();

        tracing::info!(
            "Starting {} run over {:?} ({})",
            self.capability.kind(),
            root,
            self.capability.name()
        );
        let walk = self.walker.collect_files(root)?;
        stats.files_ignored = walk.ignored;
        let total = walk.files.len();
        tracing::info!("Found {} files to process", total);

        let mut result = PipelineResult::new();

        for (idx, file) in walk.files.iter().enumerate() {
            if idx % 100 == 0 && idx > 0 {
                tracing::info!("Progress: {}/{} files processed", idx, total);
            }

            if stop.should_stop() {
                stats.cancelled = true;
                break;
            }

            let file_result = self.process_file(file, &stop);
            let interrupted = matches!(file_result, FileResult::Cancelled { .. });

            self.notify(file, idx + 1, total, &file_result);
            stats.record(&file_result);
            result.insert(file.relative.clone(), file_result);

            if interrupted {
                stats.cancelled = true;
                break;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        log_summary(&stats);

        Ok(PipelineReport { result, stats })
    }

    /// Run sequentially, then hand the result to `sink`
    ///
    /// The sink outcome is returned next to the report; a failed write
    /// never discards the result.
    pub fn run_into(
        &self,
        root: &Path,
        sink: &dyn ResultSink,
    ) -> Result<(PipelineReport, std::result::Result<(), SinkError>)> {
        let report = self.run_with_stats(root)?;
        let written = sink.write(&report.result);
        if let Err(e) = &written {
            tracing::warn!("Failed to write results: {}", e);
        }
        Ok((report, written))
    }

    pub(crate) fn stop_condition(&self, start: Instant) -> StopCondition {
        StopCondition {
            token: self.cancel.clone(),
            deadline: self.timeout.map(|t| start + t),
        }
    }

    pub(crate) fn notify(
        &self,
        file: &WalkedFile,
        completed: usize,
        total: usize,
        result: &FileResult,
    ) {
        if let Some(callback) = &self.progress {
            callback(&ProgressEvent {
                path: &file.relative,
                completed,
                total,
                result,
            });
        }
    }

    /// Read, chunk and process one file
    pub(crate) fn process_file(&self, file: &WalkedFile, stop: &StopCondition) -> FileResult {
        let contents = match fs::read_to_string(&file.path) {
            Ok(contents) => contents,
            Err(e) => {
                let error = FileReadError::from_io(&e);
                tracing::warn!("Failed to read {:?}: {}", file.relative, error);
                return FileResult::Unreadable { error };
            }
        };

        let kind = self.capability.kind();
        let mut entries = Vec::new();

        for chunk in self.chunker.split(&contents) {
            if stop.should_stop() {
                tracing::debug!(
                    "Stopped {:?} after {} chunks",
                    file.relative,
                    entries.len()
                );
                return FileResult::Cancelled {
                    chunks_completed: entries.len(),
                };
            }

            let request = ChunkRequest {
                path: &file.relative,
                index: chunk.index,
                text: chunk.text,
            };
            let outcome = self.apply(&request, kind);

            entries.push(ChunkEntry {
                index: chunk.index,
                start_offset: chunk.start_offset,
                end_offset: chunk.end_offset,
                outcome,
            });
        }

        tracing::debug!("Processed {:?} ({} chunks)", file.relative, entries.len());

        match kind {
            OutputKind::Embedding => FileResult::Embedded { vectors: entries },
            OutputKind::Summary => {
                let text = self.join_summaries(&entries);
                let overview = if self.overview && !entries.is_empty() {
                    if stop.should_stop() {
                        return FileResult::Cancelled {
                            chunks_completed: entries.len(),
                        };
                    }
                    Some(self.overview_of(&file.relative, entries.len(), &text))
                } else {
                    None
                };
                FileResult::Summarized {
                    text,
                    chunks: entries,
                    overview,
                }
            }
        }
    }

    /// Call the capability for one chunk and check the output kind
    fn apply(&self, request: &ChunkRequest<'_>, kind: OutputKind) -> ChunkOutcome {
        match self.capability.process(request) {
            Ok(result) if result.kind() == kind => result.into(),
            Ok(result) => {
                let reason = format!("expected {kind} output, got {}", result.kind());
                tracing::warn!(
                    "Chunk {} of {:?} failed: {}",
                    request.index,
                    request.path,
                    reason
                );
                ChunkOutcome::Failed { reason }
            }
            Err(e) => {
                tracing::warn!(
                    "Chunk {} of {:?} failed: {}",
                    request.index,
                    request.path,
                    e
                );
                ChunkOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn join_summaries(&self, entries: &[ChunkEntry]) -> String {
        entries
            .iter()
            .map(|entry| match &entry.outcome {
                ChunkOutcome::Summary { text } => text.clone(),
                ChunkOutcome::Failed { reason } => failed_placeholder(entry.index, reason),
                ChunkOutcome::Vector { .. } => {
                    failed_placeholder(entry.index, "unexpected vector output")
                }
            })
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Summarize the joined chunk summaries once more
    fn overview_of(&self, path: &Path, index: usize, joined: &str) -> String {
        let request = ChunkRequest {
            path,
            index,
            text: joined,
        };
        match self.capability.process(&request) {
            Ok(ChunkResult::Summary(text)) => text,
            Ok(ChunkResult::Vector(_)) => overview_failed_placeholder("unexpected vector output"),
            Err(e) => {
                tracing::warn!("Overview of {:?} failed: {}", path, e);
                overview_failed_placeholder(&e.to_string())
            }
        }
    }
}

pub(crate) fn log_summary(stats: &RunStats) {
    tracing::info!(
        "Run complete: {} files processed, {} unreadable, {} ignored, \
         {} chunks ({} failed) in {}ms{}",
        stats.files_processed,
        stats.files_unreadable,
        stats.files_ignored,
        stats.chunks_processed,
        stats.chunks_failed,
        stats.duration_ms,
        if stats.cancelled { " (cancelled)" } else { "" }
    );
}
