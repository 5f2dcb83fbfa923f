//! The JSON-backed record store.
//!
//! ```text
//!   insert / update / delete
//!           │
//!           ▼
//!   ┌──────────────────┐   auto_save   ┌───────────┐   ┌──────────────────┐
//!   │ RwLock<BTreeMap> │ ────────────▶ │  marshal  │──▶│  DocumentWriter  │──▶ file
//!   └──────────────────┘               └───────────┘   └──────────────────┘
//!           ▲                                  failure │
//!           └──────────── undo this one change ◀───────┘
//! ```
//!
//! A mutation and its auto-save run under the same write lock, so readers
//! never observe a change that failed to persist.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use appcontext_core::{AtomicWriter, DocumentWriter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::marshal::{marshal, Marshaling};

/// Behaviour switches for a [`JsonStore`].
#[derive(Clone)]
pub struct StoreOptions {
    /// Persist after every successful mutation.
    pub auto_save: bool,
    pub marshaling: Marshaling,
    /// Destination for serialized records.  Defaults to [`AtomicWriter`].
    pub writer: Arc<dyn DocumentWriter>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            auto_save: false,
            marshaling: Marshaling::default(),
            writer: Arc::new(AtomicWriter::default()),
        }
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("auto_save", &self.auto_save)
            .field("marshaling", &self.marshaling)
            .finish_non_exhaustive()
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn with_marshaling(mut self, marshaling: Marshaling) -> Self {
        self.marshaling = marshaling;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn DocumentWriter>) -> Self {
        self.writer = writer;
        self
    }
}

/// A map of string ids to records of type `T`, mirrored to one JSON file.
///
/// All methods take `&self`; share a store between threads with `Arc`.
pub struct JsonStore<T> {
    records: RwLock<BTreeMap<String, T>>,
    path: PathBuf,
    options: StoreOptions,
}

impl<T> fmt::Debug for JsonStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStore")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Opens the store at `path`, starting empty when the file does not exist.
    ///
    /// Nothing is written until the first save.
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match std::fs::read(&path) {
            Ok(bytes) => parse(&path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file absent, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self::with_records(path, records, options))
    }

    /// Loads the store at `path`, which must already exist.
    pub fn load(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.into();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let records = parse(&path, &bytes)?;
        Ok(Self::with_records(path, records, options))
    }

    fn with_records(path: PathBuf, records: BTreeMap<String, T>, options: StoreOptions) -> Self {
        info!(path = %path.display(), records = records.len(), "store opened");
        Self {
            records: RwLock::new(records),
            path,
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Adds a new record.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyId`] for an empty id, [`StoreError::AlreadyExists`]
    /// when the id is taken, or a persistence error when auto-save fails (the
    /// record is then not added).
    pub fn insert(&self, id: &str, record: T) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::EmptyId);
        }
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        records.insert(id.to_string(), record);

        if let Err(e) = self.auto_save(&records) {
            records.remove(id);
            warn!(id, error = %e, "auto-save failed, insert rolled back");
            return Err(e);
        }
        debug!(id, "record inserted");
        Ok(())
    }

    /// Replaces an existing record, returning the previous one.
    pub fn update(&self, id: &str, record: T) -> Result<T, StoreError> {
        if id.is_empty() {
            return Err(StoreError::EmptyId);
        }
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = records.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        let previous = std::mem::replace(slot, record);

        if let Err(e) = self.auto_save(&records) {
            records.insert(id.to_string(), previous);
            warn!(id, error = %e, "auto-save failed, update rolled back");
            return Err(e);
        }
        debug!(id, "record updated");
        Ok(previous)
    }

    /// Removes a record, returning it.
    pub fn delete(&self, id: &str) -> Result<T, StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let Some(removed) = records.remove(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        if let Err(e) = self.auto_save(&records) {
            records.insert(id.to_string(), removed);
            warn!(id, error = %e, "auto-save failed, delete rolled back");
            return Err(e);
        }
        debug!(id, "record deleted");
        Ok(removed)
    }

    /// Returns a copy of one record.
    pub fn get(&self, id: &str) -> Result<T, StoreError> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns a snapshot of every record; changing it does not touch the store.
    pub fn get_all(&self) -> BTreeMap<String, T> {
        self.records.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Writes every record to the backing file.
    ///
    /// Holds the write lock so concurrent saves cannot interleave.
    pub fn save(&self) -> Result<(), StoreError> {
        let records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&records)
    }

    /// Renders the current records with the configured marshaling.
    pub fn marshal(&self) -> Result<Vec<u8>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        marshal(&records, &self.options.marshaling).map_err(StoreError::Serialize)
    }

    fn auto_save(&self, records: &BTreeMap<String, T>) -> Result<(), StoreError> {
        if self.options.auto_save {
            self.persist(records)
        } else {
            Ok(())
        }
    }

    fn persist(&self, records: &BTreeMap<String, T>) -> Result<(), StoreError> {
        let bytes = marshal(records, &self.options.marshaling).map_err(StoreError::Serialize)?;
        self.options.writer.write(&self.path, &bytes)?;
        debug!(path = %self.path.display(), records = records.len(), "store saved");
        Ok(())
    }
}

fn parse<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<BTreeMap<String, T>, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use appcontext_core::fsio::mock::MockWriter;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        n: i32,
    }

    fn mocked(auto_save: bool) -> (JsonStore<Counter>, Arc<MockWriter>) {
        let writer = Arc::new(MockWriter::new());
        let options = StoreOptions::new()
            .with_auto_save(auto_save)
            .with_writer(writer.clone());
        let store = JsonStore::open("/nonexistent/appcontext/store.json", options).unwrap();
        (store, writer)
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let tmp = TempDir::new().unwrap();

        let store: JsonStore<Counter> =
            JsonStore::open(tmp.path().join("absent.json"), StoreOptions::default()).unwrap();

        assert_eq!(store.count(), 0);
        assert!(!tmp.path().join("absent.json").exists());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();

        let result: Result<JsonStore<Counter>, _> =
            JsonStore::load(tmp.path().join("absent.json"), StoreOptions::default());

        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_open_rejects_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result: Result<JsonStore<Counter>, _> = JsonStore::open(&path, StoreOptions::default());

        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_insert_duplicate_is_rejected_and_keeps_original() {
        let (store, _) = mocked(false);
        store.insert("a", Counter { n: 1 }).unwrap();

        let err = store.insert("a", Counter { n: 2 }).unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(ref id) if id == "a"));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.get("a").unwrap(), Counter { n: 1 });
    }

    #[test]
    fn test_empty_id_is_rejected_by_insert_and_update() {
        let (store, _) = mocked(false);
        assert!(matches!(store.insert("", Counter { n: 1 }), Err(StoreError::EmptyId)));
        assert!(matches!(store.update("", Counter { n: 1 }), Err(StoreError::EmptyId)));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_update_and_delete_unknown_id_are_not_found() {
        let (store, _) = mocked(false);
        assert!(matches!(store.update("x", Counter { n: 1 }), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get("x"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_returns_previous_record() {
        let (store, _) = mocked(false);
        store.insert("a", Counter { n: 1 }).unwrap();

        let previous = store.update("a", Counter { n: 5 }).unwrap();

        assert_eq!(previous, Counter { n: 1 });
        assert_eq!(store.get("a").unwrap(), Counter { n: 5 });
    }

    #[test]
    fn test_without_auto_save_mutations_do_not_write() {
        let (store, writer) = mocked(false);

        store.insert("a", Counter { n: 1 }).unwrap();
        store.update("a", Counter { n: 2 }).unwrap();
        store.delete("a").unwrap();

        assert_eq!(writer.write_count(), 0);
    }

    #[test]
    fn test_auto_save_writes_after_each_mutation() {
        let (store, writer) = mocked(true);

        store.insert("a", Counter { n: 1 }).unwrap();
        store.insert("b", Counter { n: 2 }).unwrap();
        store.delete("a").unwrap();

        assert_eq!(writer.write_count(), 3);
        let (path, data) = writer.last_write().unwrap();
        assert_eq!(path, store.path());
        assert_eq!(String::from_utf8(data).unwrap(), "{\n  \"b\": {\"n\":2}\n}");
    }

    #[test]
    fn test_failed_auto_save_rolls_back_insert() {
        let (store, writer) = mocked(true);
        store.insert("a", Counter { n: 1 }).unwrap();
        writer.set_should_fail(true);

        let result = store.insert("b", Counter { n: 2 });

        assert!(matches!(result, Err(StoreError::Persist(_))));
        assert!(!store.contains("b"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_failed_auto_save_rolls_back_update() {
        let (store, writer) = mocked(true);
        store.insert("a", Counter { n: 1 }).unwrap();
        writer.set_should_fail(true);

        let result = store.update("a", Counter { n: 99 });

        assert!(matches!(result, Err(StoreError::Persist(_))));
        assert_eq!(store.get("a").unwrap(), Counter { n: 1 });
    }

    #[test]
    fn test_failed_auto_save_rolls_back_delete() {
        let (store, writer) = mocked(true);
        store.insert("a", Counter { n: 1 }).unwrap();
        writer.set_should_fail(true);

        let result = store.delete("a");

        assert!(matches!(result, Err(StoreError::Persist(_))));
        assert_eq!(store.get("a").unwrap(), Counter { n: 1 });
    }

    #[test]
    fn test_get_all_is_a_detached_copy() {
        let (store, _) = mocked(false);
        store.insert("a", Counter { n: 1 }).unwrap();

        let mut snapshot = store.get_all();
        snapshot.insert("b".to_string(), Counter { n: 2 });
        if let Some(a) = snapshot.get_mut("a") {
            a.n = 100;
        }

        assert_eq!(store.count(), 1);
        assert_eq!(store.get("a").unwrap(), Counter { n: 1 });
    }

    #[test]
    fn test_get_returns_a_copy() {
        let (store, _) = mocked(false);
        store.insert("a", Counter { n: 1 }).unwrap();

        let mut copy = store.get("a").unwrap();
        copy.n = 7;

        assert_eq!(store.get("a").unwrap(), Counter { n: 1 });
    }

    #[test]
    fn test_marshal_uses_configured_mode() {
        let writer = Arc::new(MockWriter::new());
        let options = StoreOptions::new()
            .with_marshaling(Marshaling::Compact)
            .with_writer(writer);
        let store = JsonStore::open("/nonexistent/store.json", options).unwrap();
        store.insert("a", Counter { n: 1 }).unwrap();

        let bytes = store.marshal().unwrap();

        assert_eq!(bytes, br#"{"a":{"n":1}}"#);
    }

    #[test]
    fn test_explicit_save_writes_once() {
        let (store, writer) = mocked(false);
        store.insert("a", Counter { n: 1 }).unwrap();

        store.save().unwrap();

        assert_eq!(writer.write_count(), 1);
    }
}
