// Sink output formats over a real pipeline result

use crate::common::{pipeline_with, test_pipeline_config, TestRepo};
use codebrief::core::capability::{ExcerptSummarizer, NgramEmbedder};
use codebrief::{JsonSink, ResultSink, SinkTarget, TextReportSink, VectorRecordSink};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_json_sink_round_trips_keys_in_walk_order() {
    let repo = TestRepo::python_project();
    let result = pipeline_with(
        &test_pipeline_config(1500, 100),
        Arc::new(ExcerptSummarizer::default()),
    )
    .run(repo.path())
    .unwrap();

    let out = TempDir::new().unwrap();
    let path = out.path().join("brief.json");
    JsonSink::new(SinkTarget::File(path.clone()))
        .write(&result)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), result.len());
    assert_eq!(object["app.py"]["status"], "summarized");
    assert_eq!(object["app.py"]["chunks"][0]["status"], "summary");
}

#[test]
fn test_text_report_has_one_block_per_file() {
    let repo = TestRepo::with_files(&[("a.py", "def a():\n    pass\n"), ("b.py", "x = 2\n")]);
    let result = pipeline_with(
        &test_pipeline_config(1500, 100),
        Arc::new(ExcerptSummarizer::default()),
    )
    .run(repo.path())
    .unwrap();

    let out = TempDir::new().unwrap();
    let path = out.path().join("brief.txt");
    TextReportSink::new(SinkTarget::File(path.clone()))
        .write(&result)
        .unwrap();

    let report = std::fs::read_to_string(path).unwrap();
    assert!(report.starts_with("--- a.py ---\na.py [0]: def a():"));
    assert!(report.contains("--- b.py ---\nb.py [0]: x = 2 (1 lines, 6 chars)"));
}

#[test]
fn test_vector_records_one_line_per_chunk() {
    let repo = TestRepo::with_files(&[("a.py", &"y = 2\n".repeat(50)), ("b.py", "z\n")]);
    let result = pipeline_with(
        &test_pipeline_config(100, 20),
        Arc::new(NgramEmbedder::new(8)),
    )
    .run(repo.path())
    .unwrap();

    let out = TempDir::new().unwrap();
    let path = out.path().join("vectors.jsonl");
    VectorRecordSink::new(SinkTarget::File(path.clone()))
        .write(&result)
        .unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    let records: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    // a.py: 300 chars, step 80 -> 4 chunks; b.py: 1 chunk
    assert_eq!(records.len(), 5);
    assert_eq!(records[0]["id"], "a.py#0");
    assert_eq!(records[4]["id"], "b.py#0");
    assert_eq!(records[1]["metadata"]["start_offset"], 80);
    assert_eq!(records[0]["values"].as_array().unwrap().len(), 8);
}
