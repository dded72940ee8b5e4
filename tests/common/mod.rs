/*!
 * Common test utilities for the subweave test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subweave::glossary::{create_glossary, Glossary, GlossaryItem};
use subweave::subtitle::SubtitleItem;

/// Route library logs to the test harness; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Subtitle with a fixed id
pub fn subtitle(id: &str, start: f64, original: &str, translated: &str) -> SubtitleItem {
    let mut item = SubtitleItem::new(start, start + 2.0, original).with_translation(translated);
    item.id = id.to_string();
    item
}

/// A short translated episode with one known defect per line
pub fn sample_subtitles() -> Vec<SubtitleItem> {
    vec![
        subtitle("s1", 0.0, "Hello, world", "你好,世界"),
        subtitle("s2", 2.0, "Welcome to Tokyo", "欢迎来到Tokyo"),
        subtitle("s3", 4.0, "The Foo project", "这个项目"),
        subtitle("s4", 6.0, "Fine", "好的"),
    ]
}

/// Glossary with a couple of terms
pub fn sample_glossary() -> Glossary {
    let mut glossary = create_glossary("Sample", Some("zh"));
    glossary.terms = vec![
        GlossaryItem::validated("Foo", "福", None).unwrap(),
        GlossaryItem::validated("Tokyo", "东京", Some("city")).unwrap(),
    ];
    glossary
}
