use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

/// Unique scratch path under the system temp dir.
fn scratch_path(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("flagquiz-{tag}-{}-{n}.json", std::process::id()))
}

// =============================================================================
// JsonFileStore
// =============================================================================

#[test]
fn json_store_missing_file_reads_absent() {
    let store = JsonFileStore::new(scratch_path("missing"));
    assert_eq!(store.load(BEST_STREAK_KEY).unwrap(), None);
}

#[test]
fn json_store_save_then_load() {
    let path = scratch_path("roundtrip");
    let mut store = JsonFileStore::new(&path);
    store.save(BEST_STREAK_KEY, 7).unwrap();

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.load(BEST_STREAK_KEY).unwrap(), Some(7));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"bestStreak\": 7"));
    let _ = std::fs::remove_file(path);
}

#[test]
fn json_store_preserves_other_keys() {
    let path = scratch_path("other-keys");
    std::fs::write(&path, r#"{"theme": "dark", "bestStreak": 2}"#).unwrap();

    let mut store = JsonFileStore::new(&path);
    store.save(BEST_STREAK_KEY, 5).unwrap();

    let map: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(map["theme"], "dark");
    assert_eq!(map["bestStreak"], 5);
    let _ = std::fs::remove_file(path);
}

#[test]
fn json_store_non_numeric_value_reads_absent() {
    let path = scratch_path("non-numeric");
    std::fs::write(&path, r#"{"bestStreak": "lots"}"#).unwrap();
    assert_eq!(JsonFileStore::new(&path).load(BEST_STREAK_KEY).unwrap(), None);
    let _ = std::fs::remove_file(path);
}

#[test]
fn json_store_corrupt_file_errors() {
    let path = scratch_path("corrupt");
    std::fs::write(&path, "not json").unwrap();
    let err = JsonFileStore::new(&path).load(BEST_STREAK_KEY).unwrap_err();
    assert!(matches!(err, StoreError::Json(_)));
    let _ = std::fs::remove_file(path);
}

#[test]
fn json_store_save_over_corrupt_file_recovers() {
    let path = scratch_path("truncated");
    std::fs::write(&path, "{\"bestStre").unwrap();

    let mut store = JsonFileStore::new(&path);
    store.save(BEST_STREAK_KEY, 3).unwrap();
    assert_eq!(store.load(BEST_STREAK_KEY).unwrap(), Some(3));
    let _ = std::fs::remove_file(path);
}

#[test]
fn json_store_save_leaves_no_temp_file() {
    let path = scratch_path("no-tmp");
    let mut store = JsonFileStore::new(&path);
    store.save(BEST_STREAK_KEY, 1).unwrap();
    store.save(BEST_STREAK_KEY, 2).unwrap();

    assert!(!store.tmp_path().exists());
    assert_eq!(store.load(BEST_STREAK_KEY).unwrap(), Some(2));
    let _ = std::fs::remove_file(path);
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_round_trip() {
    let mut store = MemoryStore::new();
    assert_eq!(store.load(BEST_STREAK_KEY).unwrap(), None);
    store.save(BEST_STREAK_KEY, 3).unwrap();
    assert_eq!(store.load(BEST_STREAK_KEY).unwrap(), Some(3));
    assert_eq!(MemoryStore::with_value(BEST_STREAK_KEY, 9).load(BEST_STREAK_KEY).unwrap(), Some(9));
}

#[test]
fn memory_store_clones_share_values() {
    let handle = MemoryStore::new();
    let mut moved = handle.clone();
    moved.save(BEST_STREAK_KEY, 4).unwrap();
    assert_eq!(handle.load(BEST_STREAK_KEY).unwrap(), Some(4));
}
