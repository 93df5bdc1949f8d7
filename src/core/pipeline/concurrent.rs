//! Parallel execution across files.
//!
//! Files are processed on tokio's blocking pool, at most `workers` at
//! a time. Chunks of one file are still processed sequentially by a
//! single task. Results land in a slot table indexed by walk position
//! and are re-emitted in walk order, so the mapping is identical to a
//! sequential run.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::error::Result;
use crate::core::pipeline::directory::{log_summary, DirectoryPipeline};
use crate::core::types::{FileResult, PipelineReport, PipelineResult, RunStats};

impl DirectoryPipeline {
    /// Run the pipeline with files processed in parallel
    ///
    /// A panicking file task is recorded as [`FileResult::Failed`] for
    /// that path; other files are unaffected.
    ///
    /// # Arguments
    ///
    /// * `root` - Root directory to process
    ///
    /// # Returns
    ///
    /// The same report a sequential run would produce (apart from
    /// timing), or an error if the root cannot be walked
    pub async fn run_concurrent(self: Arc<Self>, root: &Path) -> Result<PipelineReport> {
        let start = Instant::now();
        let stop = self.stop_condition(start);
        let mut stats = RunStats::started();

        tracing::info!(
            "Starting concurrent {} run over {:?} ({}, {} workers)",
            self.capability().kind(),
            root,
            self.capability().name(),
            self.workers
        );

        let walker = self.walker().clone();
        let walk_root = root.to_path_buf();
        let walk = tokio::task::spawn_blocking(move || walker.collect_files(&walk_root))
            .await
            .map_err(std::io::Error::other)??;

        stats.files_ignored = walk.ignored;
        let total = walk.files.len();
        tracing::info!("Found {} files to process", total);

        let files = Arc::new(walk.files);
        let slots: Arc<Mutex<Vec<Option<FileResult>>>> = Arc::new(Mutex::new(vec![None; total]));
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for idx in 0..total {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(std::io::Error::other)?;

            // Files not yet started are left out once the run is stopped
            if stop.should_stop() {
                break;
            }

            let pipeline = Arc::clone(&self);
            let files = Arc::clone(&files);
            let slots = Arc::clone(&slots);
            let completed = Arc::clone(&completed);
            let stop = stop.clone();

            tasks.spawn_blocking(move || {
                let _permit = permit;
                let file = &files[idx];

                let result =
                    panic::catch_unwind(AssertUnwindSafe(|| pipeline.process_file(file, &stop)))
                        .unwrap_or_else(|payload| {
                            let reason = panic_message(payload.as_ref());
                            tracing::warn!("Processing {:?} panicked: {}", file.relative, reason);
                            FileResult::Failed { reason }
                        });

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if done % 100 == 0 {
                    tracing::info!("Progress: {}/{} files processed", done, total);
                }
                pipeline.notify(file, done, total, &result);

                slots.lock().unwrap_or_else(PoisonError::into_inner)[idx] = Some(result);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("File task did not complete: {}", e);
            }
        }

        let slots = std::mem::take(&mut *slots.lock().unwrap_or_else(PoisonError::into_inner));

        let mut result = PipelineResult::new();
        for (file, slot) in files.iter().zip(slots) {
            if let Some(file_result) = slot {
                stats.record(&file_result);
                result.insert(file.relative.clone(), file_result);
            }
        }

        stats.cancelled = stats.files_cancelled > 0 || result.len() < total;
        stats.duration_ms = start.elapsed().as_millis() as u64;
        log_summary(&stats);

        Ok(PipelineReport { result, stats })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
