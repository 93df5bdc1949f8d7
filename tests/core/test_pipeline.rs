// Pipeline behavior over real directory trees
//
// Walk order, scoped ignore rules, per-chunk failure handling,
// determinism and cancellation.

use crate::common::{echo_capability, failing_on, pipeline_with, test_pipeline_config, TestRepo};
use codebrief::core::capability::NgramEmbedder;
use codebrief::core::config::PipelineConfig;
use codebrief::core::sink::{JsonSink, SinkTarget};
use codebrief::{path_key, CancellationToken, FileReadError, FileResult, SinkError};
use std::path::Path;
use std::sync::Arc;

fn keys(result: &codebrief::PipelineResult) -> Vec<String> {
    result.keys().map(path_key).collect()
}

#[test]
fn test_gitignored_sibling_is_absent() {
    let repo = TestRepo::with_files(&[
        (".gitignore", "b.py\n"),
        ("a.py", &"a".repeat(50)),
        ("b.py", &"b".repeat(50)),
    ]);
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability());

    let result = pipeline.run(repo.path()).unwrap();

    assert_eq!(keys(&result), vec!["a.py"]);
    assert_eq!(result.get("a.py").unwrap().entries().len(), 1);
}

#[test]
fn test_ignore_rules_are_scoped_per_directory() {
    let repo = TestRepo::python_project();
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability());

    let result = pipeline.run(repo.path()).unwrap();

    assert_eq!(
        keys(&result),
        vec![
            "app.py",
            "other/generated_ok.py",
            "pkg/__init__.py",
            "pkg/models.py",
            "pkg/sub/secrets.py",
        ]
    );
    // Empty file: present, no chunks
    assert_eq!(result.get("pkg/__init__.py").unwrap().text(), Some(""));
}

#[test]
fn test_log_pattern_matches_exact_extension_only() {
    let repo = TestRepo::with_files(&[
        (".gitignore", "*.log\n"),
        ("debug.log", "x"),
        ("debug.logger", "y"),
    ]);
    let config = PipelineConfig {
        allowed_extensions: Vec::new(),
        ..test_pipeline_config(100, 0)
    };
    let result = pipeline_with(&config, echo_capability())
        .run(repo.path())
        .unwrap();

    assert!(result.contains("debug.logger"));
    assert!(!result.contains("debug.log"));
}

#[test]
fn test_failed_chunk_keeps_position_and_run_continues() {
    let big = format!("{}{}{}", "A".repeat(1400), "B".repeat(1400), "C".repeat(1000));
    let repo = TestRepo::with_files(&[("big.py", &big), ("z.py", "print('later')\n")]);
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), failing_on("B"));

    let report = pipeline.run_with_stats(repo.path()).unwrap();
    let big = report.result.get("big.py").unwrap();

    assert_eq!(big.entries().len(), 3);
    assert!(!big.entries()[0].outcome.is_failed());
    assert!(big.entries()[1].outcome.is_failed());
    assert!(!big.entries()[2].outcome.is_failed());
    assert_eq!(
        big.text(),
        Some(
            "summary of 1500 chars\n\
             [chunk 1 failed: capability call failed: rate limited]\n\
             summary of 1000 chars"
        )
    );

    assert!(report.result.contains("z.py"));
    assert_eq!(report.stats.chunks_failed, 1);
    assert_eq!(report.stats.files_processed, 2);
}

#[test]
fn test_repeated_runs_serialize_identically() {
    let repo = TestRepo::python_project();
    let pipeline = pipeline_with(&test_pipeline_config(16, 4), echo_capability());

    let first = serde_json::to_string(&pipeline.run(repo.path()).unwrap()).unwrap();
    let second = serde_json::to_string(&pipeline.run(repo.path()).unwrap()).unwrap();

    assert_eq!(first, second);
    assert!(first.find("\"app.py\"").unwrap() < first.find("\"pkg/models.py\"").unwrap());
}

#[test]
fn test_unreadable_file_is_recorded_inline() {
    let repo = TestRepo::with_files(&[("a.py", "ok = 1\n"), ("c.py", "ok = 3\n")]);
    std::fs::write(repo.path().join("b.py"), [0x80u8, 0xff, 0xfe]).unwrap();
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability());

    let result = pipeline.run(repo.path()).unwrap();

    assert_eq!(keys(&result), vec!["a.py", "b.py", "c.py"]);
    assert!(matches!(
        result.get("b.py"),
        Some(FileResult::Unreadable {
            error: FileReadError::InvalidEncoding(_)
        })
    ));
}

#[test]
fn test_file_removed_mid_run_is_not_found() {
    let repo = TestRepo::with_files(&[
        ("a.py", "ok = 1\n"),
        ("b.py", "ok = 2\n"),
        ("c.py", "ok = 3\n"),
    ]);
    let root = repo.path().to_path_buf();
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability())
        .with_progress(move |event| {
            if event.path == Path::new("a.py") {
                std::fs::remove_file(root.join("b.py")).unwrap();
            }
        });

    let report = pipeline.run_with_stats(repo.path()).unwrap();

    assert_eq!(keys(&report.result), vec!["a.py", "b.py", "c.py"]);
    assert!(matches!(
        report.result.get("b.py"),
        Some(FileResult::Unreadable {
            error: FileReadError::NotFound(_)
        })
    ));
    assert_eq!(report.result.get("c.py").unwrap().text(), Some("ok = 3\n"));
    assert_eq!(report.stats.files_unreadable, 1);
    assert!(!report.stats.cancelled);
}

#[test]
fn test_embedding_run_collects_vectors_per_chunk() {
    let repo = TestRepo::with_files(&[("a.py", &"x = 1\n".repeat(100))]);
    let pipeline = pipeline_with(
        &test_pipeline_config(250, 50),
        Arc::new(NgramEmbedder::new(64)),
    );

    let result = pipeline.run(repo.path()).unwrap();
    let a = result.get("a.py").unwrap();

    // 600 chars, step 200: chunks at 0, 200, 400
    assert_eq!(a.entries().len(), 3);
    assert_eq!(a.vectors().len(), 3);
    assert!(a.vectors().iter().all(|v| v.len() == 64));
}

#[test]
fn test_cancelling_from_progress_leaves_later_files_out() {
    let repo = TestRepo::with_files(&[("a.py", "a"), ("b.py", "b"), ("c.py", "c")]);
    let token = CancellationToken::new();
    let trigger = token.clone();
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability())
        .with_cancellation(token)
        .with_progress(move |_| trigger.cancel());

    let report = pipeline.run_with_stats(repo.path()).unwrap();

    assert_eq!(keys(&report.result), vec!["a.py"]);
    assert!(report.stats.cancelled);
}

#[test]
fn test_sink_failure_keeps_result() {
    let repo = TestRepo::with_files(&[("a.py", "print(1)\n")]);
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability());
    let sink = JsonSink::new(SinkTarget::File(
        Path::new("/nonexistent/codebrief/out.json").to_path_buf(),
    ));

    let (report, written) = pipeline.run_into(repo.path(), &sink).unwrap();

    assert!(matches!(written, Err(SinkError::Write { .. })));
    assert_eq!(report.result.len(), 1);
}

#[test]
fn test_root_must_be_directory() {
    let repo = TestRepo::with_files(&[("a.py", "x")]);
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability());

    let err = pipeline.run(&repo.path().join("a.py")).unwrap_err();
    assert!(err.is_not_found());
}
