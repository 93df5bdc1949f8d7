// Parallel runs: same mapping as the sequential reference, no
// cross-file interference

use crate::common::{failing_on, test_pipeline_config, TestRepo};
use codebrief::core::capability::{from_fn, ExcerptSummarizer};
use codebrief::core::config::LimitsConfig;
use codebrief::{ChunkResult, DirectoryPipeline, OutputKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn generated_repo(count: usize) -> TestRepo {
    let files: Vec<(String, String)> = (0..count)
        .map(|i| {
            (
                format!("svc{}/handler_{i:03}.py", i % 4),
                format!("def handle_{i}(event):\n    return {i}\n").repeat(1 + i % 7),
            )
        })
        .collect();
    let specs: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
    TestRepo::with_files(&specs)
}

fn limits(workers: usize) -> LimitsConfig {
    LimitsConfig {
        workers,
        ..LimitsConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_run_equals_sequential_run() {
    let repo = generated_repo(40);
    let config = test_pipeline_config(64, 16);

    let sequential = DirectoryPipeline::new(
        &config,
        &limits(1),
        Arc::new(ExcerptSummarizer::default()),
    )
    .unwrap()
    .run(repo.path())
    .unwrap();

    let concurrent = Arc::new(
        DirectoryPipeline::new(
            &config,
            &limits(8),
            Arc::new(ExcerptSummarizer::default()),
        )
        .unwrap(),
    )
    .run_concurrent(repo.path())
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_string(&concurrent.result).unwrap(),
        serde_json::to_string(&sequential).unwrap()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_chunk_failures_stay_in_their_file() {
    let repo = TestRepo::with_files(&[
        ("a.py", "Bxxxxxxx"),
        ("b.py", "Axxxxxxx"),
        ("c.py", "AxxxBxxx"),
    ]);
    let pipeline = Arc::new(
        DirectoryPipeline::new(&test_pipeline_config(4, 0), &limits(3), failing_on("B")).unwrap(),
    );

    let report = pipeline.run_concurrent(repo.path()).await.unwrap();

    assert_eq!(report.result.get("a.py").unwrap().failed_chunks(), 1);
    assert_eq!(report.result.get("b.py").unwrap().failed_chunks(), 0);
    assert_eq!(report.result.get("c.py").unwrap().failed_chunks(), 1);
    assert_eq!(report.stats.chunks_failed, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_limit_bounds_parallel_calls() {
    let repo = generated_repo(12);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (current, max_seen) = (Arc::clone(&in_flight), Arc::clone(&peak));
    let capability = Arc::new(from_fn("slow", OutputKind::Summary, move |text: &str| {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        max_seen.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        current.fetch_sub(1, Ordering::SeqCst);
        Ok(ChunkResult::Summary(text.len().to_string()))
    }));

    let pipeline = Arc::new(
        DirectoryPipeline::new(&test_pipeline_config(1500, 100), &limits(2), capability).unwrap(),
    );
    let report = pipeline.run_concurrent(repo.path()).await.unwrap();

    assert_eq!(report.result.len(), 12);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}
