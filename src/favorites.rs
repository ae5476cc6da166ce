//! The favorites collection: a locally-persisted set of entry references,
//! de-duplicated by id. The durable slot is injected through the [`Storage`]
//! trait so the store can run against a file, an in-memory fake in tests, or
//! nothing at all. Persistence is best-effort: a failed write degrades to
//! in-memory-only rather than failing the operation.

use crate::entry::PrayerEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A weak reference to a liked entry. `title` and `url` are snapshots taken
/// at the time of favoriting and are never re-synced; if the entry later
/// disappears from the content store the record simply dangles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub added_at: DateTime<Utc>,
}

/// A durable slot holding the serialized favorites collection. `load`
/// returns `None` when nothing has been stored yet.
pub trait Storage {
    fn load(&self) -> std::io::Result<Option<String>>;
    fn save(&self, blob: &str) -> std::io::Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self) -> std::io::Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        (**self).save(blob)
    }
}

/// File-backed [`Storage`]: one JSON file at a fixed path.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: &Path) -> FileStorage {
        FileStorage {
            path: path.to_owned(),
        }
    }
}

impl Storage for FileStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, blob)
    }
}

/// In-memory [`Storage`], for tests and for running without a durable
/// location.
#[derive(Default)]
pub struct MemoryStorage {
    cell: std::cell::RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        Ok(self.cell.borrow().clone())
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        *self.cell.borrow_mut() = Some(blob.to_owned());
        Ok(())
    }
}

/// The favorites collection, keyed by entry id, with at most one record per
/// id. Construction performs the one-time load from storage; every mutation
/// persists the full collection back before returning.
pub struct FavoritesStore<S: Storage> {
    storage: S,
    records: Vec<FavoriteRecord>,
}

impl<S: Storage> FavoritesStore<S> {
    /// Loads the collection from storage. A missing slot starts the
    /// collection empty; an unreadable or malformed slot is discarded with a
    /// warning and also starts empty, never surfaced as an error.
    pub fn load(storage: S) -> FavoritesStore<S> {
        let records = match storage.load() {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(records) => records,
                Err(err) => {
                    warn!("discarding malformed favorites data: {}", err);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("favorites storage unavailable, starting empty: {}", err);
                Vec::new()
            }
        };
        FavoritesStore { storage, records }
    }

    /// Adds a favorite derived from the given entry, capturing the title and
    /// slug as snapshots and the current time as `addedAt`. No-op if the id
    /// is already favorited.
    pub fn add(&mut self, entry: &PrayerEntry) {
        if self.is_favorite(entry.id) {
            return;
        }
        self.records.push(FavoriteRecord {
            id: entry.id,
            title: entry.title.clone(),
            url: entry.url.clone(),
            added_at: Utc::now(),
        });
        self.persist();
    }

    /// Removes the record with the given id. No-op if absent.
    pub fn remove(&mut self, id: u64) {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() != before {
            self.persist();
        }
    }

    /// Removes the entry if favorited, adds it otherwise.
    pub fn toggle(&mut self, entry: &PrayerEntry) {
        if self.is_favorite(entry.id) {
            self.remove(entry.id);
        } else {
            self.add(entry);
        }
    }

    /// Pure lookup, no side effect.
    pub fn is_favorite(&self, id: u64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Empties the collection unconditionally.
    pub fn clear(&mut self) {
        self.records.clear();
        self.persist();
    }

    /// The records in insertion order.
    pub fn records(&self) -> &[FavoriteRecord] {
        &self.records
    }

    /// Writes the full collection to storage. A failed write keeps the
    /// in-memory state and logs; the favorites simply won't survive a
    /// restart.
    fn persist(&self) {
        let blob = match serde_json::to_string(&self.records) {
            Ok(blob) => blob,
            Err(err) => {
                warn!("serializing favorites: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.save(&blob) {
            warn!("persisting favorites: {}", err);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: u64, title: &str, slug: &str) -> PrayerEntry {
        PrayerEntry {
            id,
            title: title.to_owned(),
            content: String::new(),
            content_modern: None,
            url: slug.to_owned(),
            original_url: String::new(),
            created_at: Utc.ymd(2024, 1, 1).and_hms(0, 0, 0),
            updated_at: Utc.ymd(2024, 1, 1).and_hms(0, 0, 0),
            summary: None,
        }
    }

    /// Storage that always fails, simulating quota/permission problems.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn load(&self) -> std::io::Result<Option<String>> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
        }

        fn save(&self, _blob: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        let e = entry(5, "Отче наш", "otche-nash");
        store.add(&e);
        store.add(&e);
        assert_eq!(1, store.records().len());
        assert_eq!(5, store.records()[0].id);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        store.remove(42);
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        let e = entry(5, "Отче наш", "otche-nash");
        store.toggle(&e);
        assert!(store.is_favorite(5));
        store.toggle(&e);
        assert!(!store.is_favorite(5));
    }

    #[test]
    fn test_clear_empties_collection() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        store.add(&entry(1, "Отче наш", "otche-nash"));
        store.add(&entry(2, "Символ веры", "simvol-very"));
        store.clear();
        assert!(!store.is_favorite(1));
        assert!(!store.is_favorite(2));
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_add_then_remove_scenario() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        let e = entry(5, "Отче наш", "otche-nash");
        store.add(&e);
        store.add(&e);
        assert_eq!(1, store.records().len());
        store.remove(5);
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_persistence_round_trip() {
        let storage = MemoryStorage::new();
        {
            let mut store = FavoritesStore::load(&storage);
            store.add(&entry(5, "Отче наш", "otche-nash"));
        }
        let store = FavoritesStore::load(&storage);
        assert!(store.is_favorite(5));
        assert_eq!("otche-nash", store.records()[0].url);
    }

    #[test]
    fn test_malformed_blob_starts_empty() {
        let storage = MemoryStorage::new();
        storage.save("{not json").unwrap();
        let store = FavoritesStore::load(&storage);
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_broken_storage_degrades_to_memory() {
        let mut store = FavoritesStore::load(BrokenStorage);
        store.add(&entry(5, "Отче наш", "otche-nash"));
        assert!(store.is_favorite(5));
    }

    #[test]
    fn test_file_storage_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("favorites.json");
        {
            let mut store = FavoritesStore::load(FileStorage::new(&path));
            store.add(&entry(5, "Отче наш", "otche-nash"));
        }
        let store = FavoritesStore::load(FileStorage::new(&path));
        assert!(store.is_favorite(5));
        Ok(())
    }
}
