//! Persistence Shim: keeps the last applied filter and the entity list in
//! session-scoped storage so a later command (or a restarted session) can
//! pick them up.
//!
//! Storage is best-effort. A failing or unavailable backend is logged and
//! otherwise ignored; reads fall back to "nothing stored".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::filter::{EntityId, Filter, MonthKey};
use crate::report::Entity;

pub const FILTER_KEY: &str = "dashboard_filters";
pub const ENTITIES_KEY: &str = "dashboard_companies";

/// String key/value store scoped to one user session.
pub trait SessionStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process storage for interactive sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

/// Stored form of a filter: the month plus the selected ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub month: String,
    #[serde(rename = "companyIds", default)]
    pub company_ids: Vec<EntityId>,
}

impl FilterSnapshot {
    pub fn from_filter(filter: &Filter) -> Self {
        Self {
            month: filter.month().to_string(),
            company_ids: filter.entity_ids().iter().copied().collect(),
        }
    }

    /// Rebuild the month filter. `None` when the stored month is malformed.
    pub fn to_filter(&self) -> Option<Filter> {
        let month = MonthKey::parse(&self.month).ok()?;
        Some(Filter::for_month(month, self.company_ids.iter().copied()))
    }
}

pub struct FilterStore<S> {
    storage: S,
}

impl<S: SessionStorage> FilterStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not serialise session value");
                return;
            }
        };
        if let Err(e) = self.storage.set(key, &json) {
            tracing::warn!(key, error = %e, "session storage unavailable, value not saved");
        }
    }

    fn read<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "session storage unavailable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring malformed session value");
                None
            }
        }
    }

    pub fn save_filter(&self, snapshot: &FilterSnapshot) {
        self.write(FILTER_KEY, snapshot);
    }

    pub fn load_filter(&self) -> Option<FilterSnapshot> {
        self.read(FILTER_KEY)
    }

    pub fn save_entities(&self, entities: &[Entity]) {
        self.write(ENTITIES_KEY, &entities);
    }

    /// Cached entity list; empty when nothing is stored.
    pub fn load_entities(&self) -> Vec<Entity> {
        self.read(ENTITIES_KEY).unwrap_or_default()
    }

    /// Display names for `ids`, in cached-list order, joined with ", ". Falls
    /// back to the raw ids when no cached entity matches.
    pub fn resolve_names(&self, ids: &[EntityId]) -> String {
        let wanted: BTreeSet<EntityId> = ids.iter().copied().collect();
        let names: Vec<String> = self
            .load_entities()
            .into_iter()
            .filter(|e| wanted.contains(&e.id))
            .map(|e| e.name)
            .collect();

        if names.is_empty() {
            join_ids(ids)
        } else {
            names.join(", ")
        }
    }

    pub fn clear(&self) {
        for key in [FILTER_KEY, ENTITIES_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "could not clear session value");
            }
        }
    }
}

pub fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Unavailable;

    impl SessionStorage for Unavailable {
        fn get(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "disabled"))
        }

        fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "disabled"))
        }

        fn remove(&self, _key: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "disabled"))
        }
    }

    fn entities() -> Vec<Entity> {
        vec![Entity::new(3, "Gamma"), Entity::new(1, "Alpha"), Entity::new(2, "Beta")]
    }

    #[test]
    fn filter_round_trips_through_storage() {
        let store = FilterStore::new(MemoryStorage::new());
        let snapshot = FilterSnapshot {
            month: "2026-01".to_string(),
            company_ids: vec![1, 2],
        };
        store.save_filter(&snapshot);
        assert_eq!(store.load_filter(), Some(snapshot));
    }

    #[test]
    fn stored_filter_uses_camel_case_ids() {
        let store = FilterStore::new(MemoryStorage::new());
        store.save_filter(&FilterSnapshot {
            month: "2026-01".to_string(),
            company_ids: vec![7],
        });
        let raw = store.storage().get(FILTER_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"month":"2026-01","companyIds":[7]}"#);
    }

    #[test]
    fn names_resolve_in_cached_order() {
        let store = FilterStore::new(MemoryStorage::new());
        store.save_entities(&entities());
        assert_eq!(store.resolve_names(&[1, 3]), "Gamma, Alpha");
    }

    #[test]
    fn partial_miss_keeps_only_known_names() {
        let store = FilterStore::new(MemoryStorage::new());
        store.save_entities(&[Entity::new(1, "Alpha"), Entity::new(2, "Beta")]);
        assert_eq!(store.resolve_names(&[1, 2, 3]), "Alpha, Beta");
    }

    #[test]
    fn names_fall_back_to_ids() {
        let store = FilterStore::new(MemoryStorage::new());
        assert_eq!(store.resolve_names(&[4, 5]), "4, 5");

        store.save_entities(&entities());
        assert_eq!(store.resolve_names(&[9]), "9");
    }

    #[test]
    fn unavailable_storage_degrades_silently() {
        let store = FilterStore::new(Unavailable);
        store.save_filter(&FilterSnapshot {
            month: "2026-01".to_string(),
            company_ids: vec![1],
        });
        store.save_entities(&entities());
        store.clear();
        assert_eq!(store.load_filter(), None);
        assert!(store.load_entities().is_empty());
        assert_eq!(store.resolve_names(&[1, 2]), "1, 2");
    }

    #[test]
    fn malformed_value_reads_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(FILTER_KEY, "{not json").unwrap();
        let store = FilterStore::new(storage);
        assert_eq!(store.load_filter(), None);
    }

    #[test]
    fn file_storage_persists_between_instances() {
        let dir = TempDir::new().unwrap();
        let first = FilterStore::new(FileStorage::new(dir.path().join("session")));
        first.save_entities(&entities());

        let second = FilterStore::new(FileStorage::new(dir.path().join("session")));
        assert_eq!(second.load_entities().len(), 3);
        second.clear();
        assert!(second.load_entities().is_empty());
        assert!(!dir.path().join("session").join("dashboard_companies.json").exists());
    }

    #[test]
    fn snapshot_rebuilds_month_filter() {
        let snapshot = FilterSnapshot {
            month: "2025-12".to_string(),
            company_ids: vec![2, 1],
        };
        let filter = snapshot.to_filter().unwrap();
        assert_eq!(filter.date_from().to_string(), "2025-12-01");
        assert_eq!(filter.date_to().to_string(), "2025-12-31");
        assert_eq!(FilterSnapshot::from_filter(&filter).company_ids, vec![1, 2]);
        assert!(FilterSnapshot {
            month: "december".to_string(),
            company_ids: vec![],
        }
        .to_filter()
        .is_none());
    }
}
