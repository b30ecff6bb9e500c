//! Bounded history of past results, newest first.
//!
//! The full list is stored as a single JSON array under [`HISTORY_KEY`] and
//! rewritten on every change. The in-memory list is authoritative for the
//! running session; storage failures are returned to the caller but never
//! roll back in-memory state.

use lm_protocol::HistoryRecord;
use tracing::{debug, info, warn};

use crate::kv::{KeyValueStore, StorageError};

/// Storage key holding the serialized history array.
pub const HISTORY_KEY: &str = "compatibilityHistory";

/// Number of results kept.
pub const MAX_HISTORY: usize = 10;

pub struct HistoryStore<S: KeyValueStore> {
    store: S,
    records: Vec<HistoryRecord>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Wrap a store and read any previously persisted history.
    pub fn load(store: S) -> Self {
        let mut history = Self {
            store,
            records: Vec::new(),
        };
        history.load_all();
        history
    }

    /// Re-read history from storage, replacing the in-memory list.
    ///
    /// Missing, unreadable or malformed data all yield an empty history.
    /// Arrays longer than [`MAX_HISTORY`] are cut to the newest entries.
    pub fn load_all(&mut self) -> &[HistoryRecord] {
        self.records = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryRecord>>(&raw) {
                Ok(mut records) => {
                    if records.len() > MAX_HISTORY {
                        warn!(
                            stored = records.len(),
                            kept = MAX_HISTORY,
                            "stored history too long, truncating"
                        );
                        records.truncate(MAX_HISTORY);
                    }
                    debug!(count = records.len(), "loaded history");
                    records
                }
                Err(e) => {
                    warn!(error = %e, "stored history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read stored history, starting empty");
                Vec::new()
            }
        };
        &self.records
    }

    /// Prepend a record, keep the newest [`MAX_HISTORY`], and rewrite storage.
    pub fn append(&mut self, record: HistoryRecord) -> Result<(), StorageError> {
        self.records.insert(0, record);
        self.records.truncate(MAX_HISTORY);
        self.persist()?;
        info!(count = self.records.len(), "history appended");
        Ok(())
    }

    /// Drop every record and delete the stored key.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        self.store.remove(HISTORY_KEY)?;
        info!("history cleared");
        Ok(())
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.records)?;
        self.store.set(HISTORY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FileStore, MemoryStore};
    use lm_protocol::{PersonRecord, ZodiacSign};

    fn record(n: u8) -> HistoryRecord {
        HistoryRecord {
            timestamp: format!("2024-01-01 12:00:{n:02}"),
            person1: PersonRecord::new(format!("A{n}"), 20, ZodiacSign::Aries),
            person2: PersonRecord::new(format!("B{n}"), 22, ZodiacSign::Leo),
            score: n,
            analysis: format!("analysis {n}"),
        }
    }

    fn stored(history: &HistoryStore<MemoryStore>) -> Vec<HistoryRecord> {
        let raw = history.store().get(HISTORY_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn empty_store_loads_empty() {
        let history = HistoryStore::load(MemoryStore::new());
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn append_prepends_and_persists() {
        let mut history = HistoryStore::load(MemoryStore::new());
        history.append(record(1)).unwrap();
        history.append(record(2)).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].score, 2);
        assert_eq!(history.records()[1].score, 1);
        assert_eq!(history.latest().unwrap().score, 2);
        assert_eq!(stored(&history), history.records());
    }

    #[test]
    fn append_below_limit_grows_by_one() {
        let mut history = HistoryStore::load(MemoryStore::new());
        for n in 0..9 {
            history.append(record(n)).unwrap();
        }
        assert_eq!(history.len(), 9);
        history.append(record(9)).unwrap();
        assert_eq!(history.len(), 10);
        assert_eq!(history.records()[0].score, 9);
    }

    #[test]
    fn append_at_limit_drops_oldest() {
        let mut history = HistoryStore::load(MemoryStore::new());
        for n in 0..10 {
            history.append(record(n)).unwrap();
        }
        history.append(record(10)).unwrap();

        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.records()[0].score, 10);
        assert_eq!(history.records()[9].score, 1);
        assert!(history.records().iter().all(|r| r.score != 0));
        assert_eq!(stored(&history).len(), MAX_HISTORY);
    }

    #[test]
    fn clear_removes_key() {
        let mut history = HistoryStore::load(MemoryStore::new());
        history.append(record(1)).unwrap();
        history.clear().unwrap();

        assert!(history.is_empty());
        assert!(!history.store().contains(HISTORY_KEY));
        assert!(history.load_all().is_empty());
    }

    #[test]
    fn corrupt_data_loads_empty() {
        let store = MemoryStore::new().with_raw(HISTORY_KEY, "{not json");
        let history = HistoryStore::load(store);
        assert!(history.is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let store = MemoryStore::new().with_raw(HISTORY_KEY, r#"[{"date": 5}]"#);
        let history = HistoryStore::load(store);
        assert!(history.is_empty());
    }

    #[test]
    fn oversized_stored_history_is_truncated_on_load() {
        let records: Vec<HistoryRecord> = (0..15).map(record).collect();
        let raw = serde_json::to_string(&records).unwrap();
        let history = HistoryStore::load(MemoryStore::new().with_raw(HISTORY_KEY, &raw));

        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.records()[0].score, 0);
        assert_eq!(history.records()[9].score, 9);
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let mut history = HistoryStore::load(MemoryStore::new().rejecting_writes());
        let err = history.append(record(1)).unwrap_err();

        assert!(matches!(err, StorageError::WriteRejected(_)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.records()[0].score, 1);
    }

    #[test]
    fn quota_exceeded_is_reported() {
        let mut history = HistoryStore::load(MemoryStore::new().with_quota(64));
        let err = history.append(record(1)).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn file_backed_history_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = HistoryStore::load(FileStore::new(dir.path()));
        history.append(record(1)).unwrap();
        history.append(record(2)).unwrap();

        let reloaded = HistoryStore::load(FileStore::new(dir.path()));
        assert_eq!(reloaded.records(), history.records());
    }

    #[test]
    fn file_backed_clear_then_reload_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = HistoryStore::load(FileStore::new(dir.path()));
        history.append(record(1)).unwrap();
        history.clear().unwrap();

        assert!(!dir.path().join(format!("{HISTORY_KEY}.json")).exists());
        let reloaded = HistoryStore::load(FileStore::new(dir.path()));
        assert!(reloaded.is_empty());
    }
}
