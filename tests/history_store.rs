//! Integration tests for the JSON Lines history log.
//!
//! Exercises the file-backed store the way the console uses it: many
//! sessions appending concurrently, reopening after a crash, another writer
//! crashing while the log is open, and reading back an empty or partially
//! corrupted log.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use docquest::adapters::JsonlHistoryStore;
use docquest::domain::history::HistoryEntry;
use docquest::domain::progress::ProgressSnapshot;
use docquest::ports::{HistoryError, HistoryStore};

fn entry(case_id: &str, score: u8) -> HistoryEntry {
    serde_json::from_value(json!({
        "session_id": Uuid::new_v4(),
        "case_id": case_id,
        "date": "2024-06-01",
        "score": score,
        "feedback_summary": format!("Scored {}/100", score),
    }))
    .unwrap()
}

#[tokio::test]
async fn concurrent_appends_are_all_kept_whole() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonlHistoryStore::open(dir.path().join("history.jsonl")).await.unwrap());

    let entries: Vec<_> = (0..50u8).map(|i| entry(&format!("C{}", i % 5), i * 2)).collect();
    let appends = entries.iter().map(|e| {
        let store = store.clone();
        let e = e.clone();
        async move { store.append(&e).await }
    });
    for result in join_all(appends).await {
        result.unwrap();
    }

    let stored = store.read_all().await.unwrap();
    assert_eq!(stored.len(), entries.len());
    for e in &entries {
        assert!(stored.contains(e));
    }

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw.lines().count(), entries.len());
    assert!(raw.ends_with('\n'));
}

#[tokio::test]
async fn entries_survive_reopening_in_write_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.jsonl");

    let first = entry("C1", 40);
    let second = entry("C2", 60);
    {
        let store = JsonlHistoryStore::open(&path).await.unwrap();
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();
    }

    let reopened = JsonlHistoryStore::open(&path).await.unwrap();
    assert_eq!(reopened.read_all().await.unwrap(), vec![first, second]);
}

#[tokio::test]
async fn torn_tail_is_skipped_and_later_appends_are_readable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.jsonl");

    let kept = entry("C1", 80);
    let mut content = serde_json::to_string(&kept).unwrap();
    content.push('\n');
    content.push_str(r#"{"session_id":"b5c1"#);
    std::fs::write(&path, content).unwrap();

    let store = JsonlHistoryStore::open(&path).await.unwrap();
    let after = entry("C2", 90);
    store.append(&after).await.unwrap();

    assert_eq!(store.read_all().await.unwrap(), vec![kept, after]);
}

#[tokio::test]
async fn record_torn_by_another_process_does_not_hide_later_appends() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.jsonl");
    let store = JsonlHistoryStore::open(&path).await.unwrap();

    let before = entry("C1", 70);
    store.append(&before).await.unwrap();

    // Another process dies halfway through its record.
    let mut other = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    std::io::Write::write_all(&mut other, br#"{"session_id":"ab"#).unwrap();
    drop(other);

    let after = entry("C2", 85);
    store.append(&after).await.unwrap();

    assert_eq!(store.read_all().await.unwrap(), vec![before.clone(), after.clone()]);

    let reopened = JsonlHistoryStore::open(&path).await.unwrap();
    assert_eq!(reopened.read_all().await.unwrap(), vec![before, after]);
}

#[tokio::test]
async fn same_session_is_written_once() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonlHistoryStore::open(dir.path().join("history.jsonl")).await.unwrap());
    let once = entry("C3", 60);

    let results = join_all((0..5).map(|_| {
        let store = store.clone();
        let once = once.clone();
        async move { store.append(&once).await }
    }))
    .await;

    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(HistoryError::Duplicate(_))))
        .count();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(duplicates, 4);
    assert_eq!(store.read_all().await.unwrap(), vec![once]);
}

#[tokio::test]
async fn new_log_reads_as_empty_and_summarizes_to_beginner() {
    let dir = TempDir::new().unwrap();
    let store = JsonlHistoryStore::open(dir.path().join("nested/dir/history.jsonl"))
        .await
        .unwrap();

    let entries = store.read_all().await.unwrap();
    assert!(entries.is_empty());

    let snapshot = ProgressSnapshot::summarize(&entries);
    assert_eq!(snapshot.attempts_count, 0);
    assert_eq!(snapshot.average_display(), "no attempts");
}
