// UTF-8 safety: chunk sizes are characters and boundaries never split
// a code point

use crate::common::{echo_capability, pipeline_with, test_pipeline_config, TestRepo};
use codebrief::core::pipeline::split;

#[test]
fn test_emoji_file_chunks_on_char_boundaries() {
    let content = "// 🚀 launch 🦀 crab 🎉🎊🥳\n".repeat(40);
    let repo = TestRepo::with_files(&[("emoji.py", &content)]);
    let pipeline = pipeline_with(&test_pipeline_config(37, 5), echo_capability());

    let result = pipeline.run(repo.path()).unwrap();
    let file = result.get("emoji.py").unwrap();

    for entry in file.entries() {
        assert!(content.is_char_boundary(entry.start_offset));
        assert!(content.is_char_boundary(entry.end_offset));
        assert!(content[entry.start_offset..entry.end_offset].chars().count() <= 37);
    }
}

#[test]
fn test_multibyte_reconstruction() {
    let samples = [
        "中文测试 mixed with ASCII and 日本語のテキスト",
        "مرحبا بالعالم שלום עולם Привет мир",
        "안녕하세요 세계 Γειά σου κόσμε สวัสดีโลก",
    ];

    for text in samples {
        for (max, overlap) in [(1, 0), (3, 1), (7, 2), (64, 10)] {
            let mut rebuilt = String::new();
            for (i, chunk) in split(text, max, overlap).unwrap().enumerate() {
                if i == 0 {
                    rebuilt.push_str(chunk.text);
                } else {
                    rebuilt.extend(chunk.text.chars().skip(overlap));
                }
            }
            assert_eq!(rebuilt, text, "max={max} overlap={overlap}");
        }
    }
}

#[test]
fn test_summary_text_keeps_multibyte_content() {
    let repo = TestRepo::with_files(&[("i18n.py", "GREETING = 'こんにちは世界'\n")]);
    let pipeline = pipeline_with(&test_pipeline_config(1500, 100), echo_capability());

    let result = pipeline.run(repo.path()).unwrap();
    assert_eq!(
        result.get("i18n.py").unwrap().text(),
        Some("GREETING = 'こんにちは世界'\n")
    );
}
