//! Aggregation Integration Tests
//!
//! End-to-end coverage of the scan pass: key defaulting, keyword mapping,
//! collision ordering, and recovery from missing or malformed sources.

use std::path::{Path, PathBuf};

use memedex::{Aggregator, IndexPaths, MemeIndex};
use serde_json::json;
use tempfile::TempDir;

fn write_info(source: &Path, meme: &str, content: &str) {
    let dir = source.join(meme);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("info.json"), content).unwrap();
}

#[tokio::test]
async fn test_end_to_end_example() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("memes");
    write_info(&source, "foo", r#"{"keywords": ["f", "fo"]}"#);
    write_info(&source, "bar", r#"{"key": "baz", "keywords": ["b"]}"#);

    let outcome = Aggregator::new([&source]).scan().await.unwrap();

    assert_eq!(outcome.index.len(), 2);
    assert_eq!(outcome.report.processed, 2);

    // foo had no key: the directory name is used
    assert_eq!(outcome.index.get("foo").unwrap().key(), "foo");

    // bar declared "baz": indexed under the declared key, not the directory
    assert!(outcome.index.get("bar").is_none());
    assert_eq!(outcome.index.get("baz").unwrap().key(), "baz");

    // Write out and compare against the expected JSON documents
    let out = temp.path().join("out");
    let paths = IndexPaths::in_dir(&out);
    outcome.index.save(&paths).await.unwrap();

    let infos: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.infos).unwrap()).unwrap();
    assert_eq!(
        infos,
        json!({
            "foo": {"key": "foo", "keywords": ["f", "fo"]},
            "baz": {"key": "baz", "keywords": ["b"]}
        })
    );

    let key_map: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.key_map).unwrap()).unwrap();
    assert_eq!(key_map, json!({"f": "foo", "fo": "foo", "b": "baz"}));
}

#[tokio::test]
async fn test_missing_source_is_skipped_not_fatal() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");
    let present = temp.path().join("memes");
    write_info(&present, "only", r#"{"key": "only"}"#);

    let outcome = Aggregator::new([missing.clone(), present])
        .scan()
        .await
        .unwrap();

    assert_eq!(outcome.report.missing_sources, vec![missing]);
    assert_eq!(outcome.index.len(), 1);
    assert!(outcome.index.get("only").is_some());
}

#[tokio::test]
async fn test_malformed_info_does_not_stop_the_scan() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("memes");
    write_info(&source, "broken", "{not json");
    write_info(&source, "works", r#"{"key": "works", "keywords": ["w"]}"#);

    let outcome = Aggregator::new([&source]).scan().await.unwrap();

    assert_eq!(outcome.report.failures.len(), 1);
    assert_eq!(outcome.report.processed, 1);
    assert!(outcome.index.get("works").is_some());
    assert_eq!(outcome.index.keyword_target("w"), Some("works"));
}

#[tokio::test]
async fn test_non_directories_and_bare_directories_are_skipped() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("memes");
    write_info(&source, "real", r#"{"key": "real"}"#);

    // A loose file at the top level and a meme directory without info.json
    std::fs::write(source.join("README.md"), "ignored").unwrap();
    std::fs::create_dir_all(source.join("empty-meme")).unwrap();

    let outcome = Aggregator::new([&source]).scan().await.unwrap();

    assert_eq!(outcome.index.len(), 1);
    assert_eq!(outcome.report.processed, 1);
    assert!(outcome.report.failures.is_empty());
}

#[tokio::test]
async fn test_later_source_wins_on_key_and_keyword_collisions() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    write_info(
        &first,
        "dup",
        r#"{"key": "dup", "origin": "first", "keywords": ["shared"]}"#,
    );
    write_info(
        &second,
        "dup",
        r#"{"key": "dup", "origin": "second"}"#,
    );
    write_info(
        &second,
        "other",
        r#"{"key": "other", "keywords": ["shared"]}"#,
    );

    let outcome = Aggregator::new([first, second]).scan().await.unwrap();

    // Key collision: the record from the later source replaced the earlier one
    assert_eq!(outcome.index.len(), 2);
    assert_eq!(
        outcome.index.get("dup").unwrap().get("origin"),
        Some(&json!("second"))
    );

    // Keyword collision: remapped to the later record's key
    assert_eq!(outcome.index.keyword_target("shared"), Some("other"));
}

#[tokio::test]
async fn test_non_sequence_keywords_are_tolerated() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("memes");
    write_info(&source, "odd", r#"{"key": "odd", "keywords": "not-a-list"}"#);

    let outcome = Aggregator::new([&source]).scan().await.unwrap();

    assert_eq!(outcome.report.processed, 1);
    assert!(outcome.index.get("odd").is_some());
    assert!(outcome.index.keyword_target("not-a-list").is_none());
}

#[tokio::test]
async fn test_empty_run_still_writes_both_files() {
    let temp = TempDir::new().unwrap();

    let outcome = Aggregator::new(Vec::<PathBuf>::new()).scan().await.unwrap();
    assert!(outcome.index.is_empty());

    let paths = IndexPaths::in_dir(temp.path());
    outcome.index.save(&paths).await.unwrap();

    assert_eq!(std::fs::read_to_string(&paths.infos).unwrap(), "{}");
    assert_eq!(std::fs::read_to_string(&paths.key_map).unwrap(), "{}");
}

#[tokio::test]
async fn test_generated_files_round_trip_through_load() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("memes");
    write_info(
        &source,
        "petpet",
        r#"{"key": "petpet", "keywords": ["pet", "rub"], "params": {"frames": 5}}"#,
    );

    let paths = IndexPaths::in_dir(temp.path().join("out"));
    let outcome = Aggregator::new([&source]).scan().await.unwrap();
    outcome.index.save(&paths).await.unwrap();

    let loaded = MemeIndex::load(&paths).await.unwrap();
    let entry = loaded.resolve("rub").unwrap();
    assert_eq!(entry.key(), "petpet");
    assert_eq!(entry.get("params"), Some(&json!({"frames": 5})));
}
