//! History/favorites behaviour through the public API, including persistence.

use std::sync::Arc;

use chrono::{Local, TimeZone};
use qrkit_business::{
    Confirmation, HistoryEntry, HistoryManager, PersistentStore, Shell, ThemeState,
    store::{FileStore, KeyValueStore, MemoryStore},
};

mod cap_tests {
    use super::*;

    #[test]
    fn test_fifty_one_adds_keep_the_fifty_most_recent() {
        let mut history = HistoryManager::load(PersistentStore::in_memory(), 50);

        for i in 1..=51 {
            history.add_to_history(&format!("item-{i}"));
        }

        let entries = history.history();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].data, "item-51");
        assert_eq!(entries[49].data, "item-2");
        assert!(entries.iter().all(|e| e.data != "item-1"));
    }

    #[test]
    fn test_ids_are_unique_even_within_one_millisecond() {
        let mut history = HistoryManager::load(PersistentStore::in_memory(), 50);
        let now = Local.timestamp_millis_opt(1_000).unwrap();

        for _ in 0..5 {
            history.add_to_history_at("same", now);
        }

        let mut ids: Vec<i64> = history.history().iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_repeated_payloads_are_all_recorded() {
        let mut history = HistoryManager::load(PersistentStore::in_memory(), 50);

        history.add_to_history("again");
        history.add_to_history("again");

        assert_eq!(history.history().len(), 2);
    }
}

mod favorite_tests {
    use super::*;

    #[test]
    fn test_toggle_twice_is_an_involution() {
        let mut history = HistoryManager::load(PersistentStore::in_memory(), 50);
        history.toggle_favorite("keep");
        let before = history.favorites().to_vec();

        history.toggle_favorite("tel:+15550100");
        history.toggle_favorite("tel:+15550100");

        assert_eq!(history.favorites(), before.as_slice());
    }

    #[test]
    fn test_remove_favorite_by_id() {
        let mut history = HistoryManager::load(PersistentStore::in_memory(), 50);
        history.toggle_favorite("a");
        let id = history.favorites()[0].id;

        assert!(history.remove_favorite(id));
        assert!(!history.remove_favorite(id));
        assert!(!history.is_favorited("a"));
    }

    #[test]
    fn test_clearing_history_keeps_favorites() {
        let mut history = HistoryManager::load(PersistentStore::in_memory(), 50);
        history.add_to_history("a");
        history.toggle_favorite("a");

        assert!(history.clear_history(Confirmation::Confirmed));
        assert!(history.history().is_empty());
        assert!(history.is_favorited("a"));
    }
}

mod storage_tests {
    use super::*;

    #[test]
    fn test_records_use_the_documented_json_shape() {
        let backend = Arc::new(MemoryStore::default());
        let mut history = HistoryManager::load(PersistentStore::new(backend.clone()), 50);
        history.add_to_history_at("hello", Local.timestamp_millis_opt(42).unwrap());

        let raw = backend.get("history").unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &parsed[0];
        assert_eq!(entry["id"], 42);
        assert_eq!(entry["data"], "hello");
        assert!(entry["timestamp"].is_string());
    }

    #[test]
    fn test_missing_and_malformed_records_use_defaults() {
        let backend = Arc::new(MemoryStore::with_values([
            ("history", "{ definitely not a list"),
            ("theme", "purple"),
        ]));
        let shell = Shell::load(PersistentStore::new(backend), 50);

        assert_eq!(shell.theme(), ThemeState::Dark);
        assert!(shell.history().history().is_empty());
        assert!(shell.history().favorites().is_empty());
    }

    #[test]
    fn test_stored_history_over_the_cap_is_truncated() {
        let entries: Vec<HistoryEntry> = (0..60)
            .map(|i| HistoryEntry {
                id: 1_000 - i,
                data: format!("old-{i}"),
                timestamp: String::new(),
            })
            .collect();
        let raw = serde_json::to_string(&entries).unwrap();
        let backend = Arc::new(MemoryStore::with_values([("history", raw.as_str())]));

        let mut history = HistoryManager::load(PersistentStore::new(backend), 50);
        assert_eq!(history.history().len(), 50);

        // New ids continue above everything loaded
        history.add_to_history_at("new", Local.timestamp_millis_opt(1).unwrap());
        assert_eq!(history.history()[0].id, 1_001);
    }

    #[test]
    fn test_file_store_survives_restart() {
        let dir = std::env::temp_dir().join(format!("qrkit-history-{}", std::process::id()));
        let path = dir.join("storage.json");
        let _ = std::fs::remove_dir_all(&dir);

        {
            let store = PersistentStore::new(Arc::new(FileStore::open(&path)));
            let mut shell = Shell::load(store, 50);
            shell.history_mut().add_to_history("persisted");
            shell.history_mut().toggle_favorite("persisted");
            shell.toggle_theme();
        }

        let shell = Shell::load(PersistentStore::new(Arc::new(FileStore::open(&path))), 50);
        assert_eq!(shell.theme(), ThemeState::Light);
        assert_eq!(shell.history().history()[0].data, "persisted");
        assert!(shell.history().is_favorited("persisted"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
