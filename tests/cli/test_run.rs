//! Tests for the summarize and embed commands
//!
//! - Sink output written to a file
//! - Worker count override (sequential and concurrent paths)
//! - Argument validation (vectors sink, command backend, bad paths)

use crate::cli::test_helpers::{pipeline_args, test_config};
use crate::common::TestRepo;
use codebrief::cli::commands::run::{execute, CapabilityChoice, SinkKind};
use codebrief::cli::OutputFormat;
use codebrief::OutputKind;
use tempfile::TempDir;

/// Summaries written through the JSON sink
#[tokio::test]
async fn test_summarize_json_sink_to_file() {
    let repo = TestRepo::python_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("brief.json");

    let mut args = pipeline_args(repo.path());
    args.sink = Some(SinkKind::Json);
    args.output = Some(output.clone());

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Json).await;
    assert!(result.is_ok(), "summarize should succeed: {:?}", result.err());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec![
            "app.py",
            "other/generated_ok.py",
            "pkg/__init__.py",
            "pkg/models.py",
            "pkg/sub/secrets.py",
        ]
    );
}

/// `--all-files` lifts the extension allow-list but not dotfiles or caches
#[tokio::test]
async fn test_all_files_keeps_dotfiles_and_caches_out() {
    let repo = TestRepo::with_files(&[
        (".gitignore", "*.log\n"),
        (".env", "TOKEN=secret\n"),
        ("app.py", "print('hi')\n"),
        ("notes.txt", "remember\n"),
        ("debug.log", "trace\n"),
        ("node_modules/left-pad/index.js", "module.exports = 1;\n"),
        ("__pycache__/app.cpython-312.pyc", "cached\n"),
        ("stale.pyc", "cached\n"),
    ]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("brief.json");

    let mut args = pipeline_args(repo.path());
    args.filter.all_files = true;
    args.sink = Some(SinkKind::Json);
    args.output = Some(output.clone());

    execute(args, OutputKind::Summary, test_config(), OutputFormat::Json)
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    let mut keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["app.py", "notes.txt"]);
}

/// Embedding through the vectors sink, concurrent and sequential
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_embed_vectors_sink_same_for_any_worker_count() {
    let repo = TestRepo::python_project();
    let out = TempDir::new().unwrap();

    let mut outputs = Vec::new();
    for workers in [1, 4] {
        let output = out.path().join(format!("vectors-{workers}.jsonl"));
        let mut args = pipeline_args(repo.path());
        args.sink = Some(SinkKind::Vectors);
        args.output = Some(output.clone());
        args.workers = Some(workers);
        args.dimensions = Some(16);

        execute(args, OutputKind::Embedding, test_config(), OutputFormat::Human)
            .await
            .unwrap();
        outputs.push(std::fs::read_to_string(output).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
    // pkg/__init__.py is empty and produces no records
    assert_eq!(outputs[0].lines().count(), 4);
}

/// Text sink honors the overview flag
#[tokio::test]
async fn test_summarize_text_sink_with_overview() {
    let repo = TestRepo::with_files(&[("main.py", "def main():\n    return 0\n")]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("brief.txt");

    let mut args = pipeline_args(repo.path());
    args.sink = Some(SinkKind::Text);
    args.output = Some(output.clone());
    args.overview = true;

    execute(args, OutputKind::Summary, test_config(), OutputFormat::Human)
        .await
        .unwrap();

    let report = std::fs::read_to_string(output).unwrap();
    assert!(report.starts_with("--- main.py ---\nOverview: "));
}

/// Vector records make no sense for summaries
#[tokio::test]
async fn test_summarize_rejects_vectors_sink() {
    let repo = TestRepo::with_files(&[("a.py", "x = 1\n")]);
    let mut args = pipeline_args(repo.path());
    args.sink = Some(SinkKind::Vectors);

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Json).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("vectors sink"), "unexpected error: {err}");
}

/// Command backend without a program is a configuration error
#[tokio::test]
async fn test_command_backend_requires_program() {
    let repo = TestRepo::with_files(&[("a.py", "x = 1\n")]);
    let mut args = pipeline_args(repo.path());
    args.capability = Some(CapabilityChoice::Command);

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Json).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("requires a program"), "unexpected error: {err}");
}

/// Excerpt backend cannot embed
#[tokio::test]
async fn test_embed_rejects_summary_backend() {
    let repo = TestRepo::with_files(&[("a.py", "x = 1\n")]);
    let mut args = pipeline_args(repo.path());
    args.capability = Some(CapabilityChoice::Excerpt);

    let result = execute(args, OutputKind::Embedding, test_config(), OutputFormat::Json).await;
    assert!(result.is_err());
}

/// Overlap must stay below chunk size
#[tokio::test]
async fn test_invalid_chunking_rejected_before_walking() {
    let repo = TestRepo::with_files(&[("a.py", "x = 1\n")]);
    let mut args = pipeline_args(repo.path());
    args.chunking.chunk_size = Some(100);
    args.chunking.overlap = Some(100);

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Json).await;
    assert!(result.is_err());
}

/// Missing directories are reported with the offending path
#[tokio::test]
async fn test_missing_path_error() {
    let args = pipeline_args(std::path::Path::new("/nonexistent/codebrief/repo"));

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Human).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("/nonexistent/codebrief/repo"));
}

/// A file is not a valid root
#[tokio::test]
async fn test_file_path_is_not_a_directory() {
    let repo = TestRepo::with_files(&[("a.py", "x = 1\n")]);
    let args = pipeline_args(&repo.path().join("a.py"));

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Human).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("not a directory"));
}

/// Unwritable sink target fails the command after the run
#[tokio::test]
async fn test_unwritable_output_is_error() {
    let repo = TestRepo::with_files(&[("a.py", "x = 1\n")]);
    let mut args = pipeline_args(repo.path());
    args.sink = Some(SinkKind::Json);
    args.output = Some("/nonexistent/codebrief/out.json".into());

    let result = execute(args, OutputKind::Summary, test_config(), OutputFormat::Json).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("out.json"), "unexpected error: {err}");
}
