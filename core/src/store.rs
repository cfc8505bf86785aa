use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{ExerciseEntry, FoodEntry, MeasurementEntry, WeightEntry};

/// Prefix shared by every persisted key.
pub const NAMESPACE: &str = "vital";

/// Global keys (not partitioned per profile).
pub const PROFILES_KEY: &str = "vital_profiles";
pub const ACTIVE_PROFILE_KEY: &str = "vital_active_profile";

pub const FOOD_COLLECTION: &str = "food";
pub const EXERCISE_COLLECTION: &str = "exercise";
pub const WEIGHT_COLLECTION: &str = "weight";
pub const MEASUREMENT_COLLECTION: &str = "measurement";

/// Key for a per-profile entry collection: `{namespace}_{collection}_{profileId}`.
#[must_use]
pub fn collection_key(collection: &str, profile_id: &str) -> String {
    format!("{NAMESPACE}_{collection}_{profile_id}")
}

/// Flat key-value store, values JSON-serialized. Backed by a single sqlite
/// table so a whole tracker lives in one portable file.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store: {}", path.display()))?;
        let store = Store { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Store { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key '{key}'"))?;
        Ok(())
    }

    /// Returns true when the key existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key")?;
        let keys = stmt
            .query_map(params![pattern], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    pub fn load_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
        profile_id: &str,
    ) -> Result<Vec<T>> {
        let key = collection_key(collection, profile_id);
        match self.get_raw(&key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt collection under key '{key}'")),
        }
    }

    pub fn save_collection<T: Serialize>(
        &self,
        collection: &str,
        profile_id: &str,
        entries: &[T],
    ) -> Result<()> {
        let key = collection_key(collection, profile_id);
        let raw = serde_json::to_string(entries)?;
        self.set_raw(&key, &raw)
    }
}

/// A persisted record addressable by id.
pub trait LogRecord: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

impl LogRecord for FoodEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl LogRecord for ExerciseEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl LogRecord for WeightEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl LogRecord for MeasurementEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-profile ordered entry collection. Append and delete only — no
/// update-in-place exists; corrections are delete + reinsert.
///
/// The in-memory vec is authoritative. Persistence is write-through but a
/// failed write (disk full, readonly store) only emits a warning on stderr;
/// the session keeps working with valid state.
pub struct EntryLog<T: LogRecord> {
    collection: &'static str,
    profile_id: String,
    entries: Vec<T>,
}

impl<T: LogRecord> EntryLog<T> {
    pub fn load(store: &Store, collection: &'static str, profile_id: &str) -> Self {
        let entries = match store.load_collection(collection, profile_id) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Warning: could not read {collection} entries: {e:#}");
                Vec::new()
            }
        };
        Self {
            collection,
            profile_id: profile_id.to_string(),
            entries,
        }
    }

    pub fn append(&mut self, store: &Store, entry: T) -> &T {
        self.entries.push(entry);
        self.persist(store);
        self.entries.last().expect("just pushed")
    }

    /// Returns true when an entry was removed; an absent id is a no-op.
    pub fn remove(&mut self, store: &Store, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist(store);
        }
        removed
    }

    /// Entries in insertion order. Callers sort by date when they need to.
    #[must_use]
    pub fn list(&self) -> &[T] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self, store: &Store) {
        if let Err(e) = store.save_collection(self.collection, &self.profile_id, &self.entries) {
            eprintln!(
                "Warning: could not persist {} entries for profile {}: {e:#}",
                self.collection, self.profile_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{new_entry_id, timestamp_for};

    fn weight(kg: f64) -> WeightEntry {
        WeightEntry {
            id: new_entry_id(),
            date: timestamp_for(None),
            weight_kg: kg,
        }
    }

    #[test]
    fn test_raw_get_set_delete() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_raw("vital_profiles").unwrap().is_none());

        store.set_raw("vital_profiles", "[]").unwrap();
        assert_eq!(store.get_raw("vital_profiles").unwrap().unwrap(), "[]");

        // Overwrite
        store.set_raw("vital_profiles", "[1]").unwrap();
        assert_eq!(store.get_raw("vital_profiles").unwrap().unwrap(), "[1]");

        assert!(store.delete("vital_profiles").unwrap());
        assert!(!store.delete("vital_profiles").unwrap());
    }

    #[test]
    fn test_keys_with_prefix() {
        let store = Store::open_in_memory().unwrap();
        store.set_raw("vital_food_p1", "[]").unwrap();
        store.set_raw("vital_weight_p1", "[]").unwrap();
        store.set_raw("other_food_p1", "[]").unwrap();

        let keys = store.keys_with_prefix("vital_").unwrap();
        assert_eq!(keys, vec!["vital_food_p1", "vital_weight_p1"]);
    }

    #[test]
    fn test_prefix_escapes_underscore_wildcard() {
        let store = Store::open_in_memory().unwrap();
        store.set_raw("vital_food_p1", "[]").unwrap();
        store.set_raw("vitalXfood_p1", "[]").unwrap();

        // A literal-underscore prefix must not match the X variant.
        let keys = store.keys_with_prefix("vital_").unwrap();
        assert_eq!(keys, vec!["vital_food_p1"]);
    }

    #[test]
    fn test_collection_key_scheme() {
        assert_eq!(collection_key("food", "p1"), "vital_food_p1");
    }

    #[test]
    fn test_load_missing_collection_is_empty() {
        let store = Store::open_in_memory().unwrap();
        let entries: Vec<WeightEntry> = store.load_collection(WEIGHT_COLLECTION, "p1").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_collection_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let entries = vec![weight(70.0), weight(69.5)];
        store
            .save_collection(WEIGHT_COLLECTION, "p1", &entries)
            .unwrap();

        let loaded: Vec<WeightEntry> = store.load_collection(WEIGHT_COLLECTION, "p1").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, entries[0].id);
        assert!((loaded[1].weight_kg - 69.5).abs() < f64::EPSILON);

        // Another profile id is a different collection
        let other: Vec<WeightEntry> = store.load_collection(WEIGHT_COLLECTION, "p2").unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_entry_log_append_and_list_order() {
        let store = Store::open_in_memory().unwrap();
        let mut log: EntryLog<WeightEntry> = EntryLog::load(&store, WEIGHT_COLLECTION, "p1");

        log.append(&store, weight(70.0));
        log.append(&store, weight(69.0));
        assert_eq!(log.len(), 2);
        assert!((log.list()[0].weight_kg - 70.0).abs() < f64::EPSILON);

        // Reload sees persisted state in insertion order
        let reloaded: EntryLog<WeightEntry> = EntryLog::load(&store, WEIGHT_COLLECTION, "p1");
        assert_eq!(reloaded.len(), 2);
        assert!((reloaded.list()[1].weight_kg - 69.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entry_log_remove_absent_id_is_noop() {
        let store = Store::open_in_memory().unwrap();
        let mut log: EntryLog<WeightEntry> = EntryLog::load(&store, WEIGHT_COLLECTION, "p1");
        log.append(&store, weight(70.0));

        assert!(!log.remove(&store, "no-such-id"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_entry_log_remove_persists() {
        let store = Store::open_in_memory().unwrap();
        let mut log: EntryLog<WeightEntry> = EntryLog::load(&store, WEIGHT_COLLECTION, "p1");
        let id = log.append(&store, weight(70.0)).id.clone();
        log.append(&store, weight(69.0));

        assert!(log.remove(&store, &id));

        let reloaded: EntryLog<WeightEntry> = EntryLog::load(&store, WEIGHT_COLLECTION, "p1");
        assert_eq!(reloaded.len(), 1);
        assert!((reloaded.list()[0].weight_kg - 69.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_corrupt_collection_loads_empty_with_warning() {
        let store = Store::open_in_memory().unwrap();
        store.set_raw(&collection_key(WEIGHT_COLLECTION, "p1"), "not json").unwrap();

        let log: EntryLog<WeightEntry> = EntryLog::load(&store, WEIGHT_COLLECTION, "p1");
        assert!(log.is_empty());
    }
}
