//! Generation history and favorites.
//!
//! Both lists are newest first and written through to the [`PersistentStore`] on every
//! mutation. A failed write is logged and otherwise ignored: the in-memory lists stay
//! authoritative for the rest of the session.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::store::{PersistentStore, StoreKey};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One recorded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the epoch, strictly increasing across entries.
    pub id: i64,
    pub data: String,
    /// Local creation time for display.
    pub timestamp: String,
}

/// Favorites share the history entry shape.
pub type FavoriteEntry = HistoryEntry;

/// Explicit answer to "Clear all history?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug)]
pub struct HistoryManager {
    store: PersistentStore,
    history: Vec<HistoryEntry>,
    favorites: Vec<FavoriteEntry>,
    limit: usize,
    last_id: i64,
}

impl HistoryManager {
    /// Loads both lists from `store`. Stored history longer than `limit` is truncated.
    pub fn load(store: PersistentStore, limit: usize) -> Self {
        let mut history = store.load_entries(StoreKey::History);
        history.truncate(limit);
        let favorites = store.load_entries(StoreKey::Favorites);
        let last_id = history
            .iter()
            .chain(&favorites)
            .map(|entry| entry.id)
            .max()
            .unwrap_or(0);

        log::debug!(
            "Loaded {} history entries and {} favorites",
            history.len(),
            favorites.len()
        );
        Self {
            store,
            history,
            favorites,
            limit,
            last_id,
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Records a successful generation of `data`.
    pub fn add_to_history(&mut self, data: &str) {
        self.add_to_history_at(data, Local::now());
    }

    pub fn add_to_history_at(&mut self, data: &str, now: DateTime<Local>) {
        let entry = self.entry(data, now);
        self.history.insert(0, entry);
        self.history.truncate(self.limit);
        self.persist_history();
    }

    /// Adds `data` to favorites, or removes it if already there. Returns whether `data` is
    /// a favorite afterwards.
    pub fn toggle_favorite(&mut self, data: &str) -> bool {
        self.toggle_favorite_at(data, Local::now())
    }

    pub fn toggle_favorite_at(&mut self, data: &str, now: DateTime<Local>) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|entry| entry.data != data);
        let favorited = if self.favorites.len() == before {
            let entry = self.entry(data, now);
            self.favorites.insert(0, entry);
            true
        } else {
            false
        };
        self.persist_favorites();
        favorited
    }

    pub fn is_favorited(&self, data: &str) -> bool {
        self.favorites.iter().any(|entry| entry.data == data)
    }

    /// Empties the history, but only when the user confirmed. Favorites are kept.
    pub fn clear_history(&mut self, confirmation: Confirmation) -> bool {
        match confirmation {
            Confirmation::Declined => false,
            Confirmation::Confirmed => {
                log::info!("Clearing {} history entries", self.history.len());
                self.history.clear();
                self.persist_history();
                true
            }
        }
    }

    /// Removes the history entry with `id`. Returns `false` if there was none.
    pub fn remove_item(&mut self, id: i64) -> bool {
        let before = self.history.len();
        self.history.retain(|entry| entry.id != id);
        let removed = self.history.len() != before;
        if removed {
            self.persist_history();
        }
        removed
    }

    pub fn remove_favorite(&mut self, id: i64) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|entry| entry.id != id);
        let removed = self.favorites.len() != before;
        if removed {
            self.persist_favorites();
        }
        removed
    }

    fn entry(&mut self, data: &str, now: DateTime<Local>) -> HistoryEntry {
        // Two entries created in the same millisecond still get distinct ids
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        HistoryEntry {
            id,
            data: data.to_owned(),
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self.store.save_entries(StoreKey::History, &self.history) {
            log::warn!("Failed to persist history: {e}");
        }
    }

    fn persist_favorites(&self) {
        if let Err(e) = self.store.save_entries(StoreKey::Favorites, &self.favorites) {
            log::warn!("Failed to persist favorites: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::store::MemoryStore;

    fn at(ms: i64) -> DateTime<Local> {
        Local.timestamp_millis_opt(ms).unwrap()
    }

    fn manager() -> HistoryManager {
        HistoryManager::load(PersistentStore::in_memory(), DEFAULT_HISTORY_LIMIT)
    }

    #[test]
    fn history_is_newest_first_with_unique_ids() {
        let mut history = manager();
        history.add_to_history_at("first", at(1_000));
        history.add_to_history_at("second", at(1_000));
        history.add_to_history_at("first", at(900));

        let ids: Vec<_> = history.history().iter().map(|e| e.id).collect();
        let data: Vec<_> = history.history().iter().map(|e| e.data.as_str()).collect();
        assert_eq!(ids, vec![1_002, 1_001, 1_000]);
        assert_eq!(data, vec!["first", "second", "first"]);
    }

    #[test]
    fn toggling_twice_restores_membership() {
        let mut history = manager();

        assert!(history.toggle_favorite("https://example.com"));
        assert!(history.is_favorited("https://example.com"));
        assert!(!history.toggle_favorite("https://example.com"));
        assert!(!history.is_favorited("https://example.com"));
        assert!(history.favorites().is_empty());
    }

    #[test]
    fn favorites_match_exact_strings() {
        let mut history = manager();
        history.toggle_favorite("abc");

        assert!(!history.is_favorited("ABC"));
        assert!(!history.is_favorited("abc "));
    }

    #[test]
    fn declined_clear_keeps_everything() {
        let mut history = manager();
        history.add_to_history("kept");

        assert!(!history.clear_history(Confirmation::Declined));
        assert_eq!(history.history().len(), 1);
        assert!(history.clear_history(Confirmation::Confirmed));
        assert!(history.history().is_empty());
    }

    #[test]
    fn remove_item_ignores_unknown_ids() {
        let mut history = manager();
        history.add_to_history_at("a", at(5));

        assert!(!history.remove_item(42));
        assert!(history.remove_item(5));
        assert!(history.history().is_empty());
    }

    #[test]
    fn mutations_survive_reload() {
        let store = PersistentStore::new(Arc::new(MemoryStore::default()));
        let mut history = HistoryManager::load(store.clone(), 10);
        history.add_to_history_at("one", at(10));
        history.toggle_favorite_at("fav", at(20));

        let reloaded = HistoryManager::load(store, 10);
        assert_eq!(reloaded.history(), history.history());
        assert_eq!(reloaded.favorites(), history.favorites());
    }

    #[test]
    fn failing_writes_do_not_lose_in_memory_state() {
        let store = PersistentStore::new(Arc::new(MemoryStore::read_only()));
        let mut history = HistoryManager::load(store, 10);

        history.add_to_history("still here");
        assert_eq!(history.history().len(), 1);
    }
}
