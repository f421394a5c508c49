// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! String Store
//!
//! In-memory record store keyed by content hash, with an optional JSON
//! snapshot on disk.
//!
//! # Layout
//!
//! ```text
//! by_hash:  content_hash -> seq
//! records:  seq -> AnalyzedString      (BTreeMap, seq = creation order)
//! ```
//!
//! When opened on a data directory every mutation rewrites
//! `{data_dir}/strings.json` (previous version kept as `strings.json.bak`).
//! A failed write rolls the mutation back so memory and disk never diverge.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use stringlens_core::{content_hash, AnalyzedString};
use tracing::{debug, info, warn};

use crate::record_store::{RecordPredicate, RecordStore, StoreError};

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE: &str = "strings.json";

#[derive(Default)]
struct StoreInner {
    next_seq: u64,
    by_hash: HashMap<String, u64>,
    records: BTreeMap<u64, AnalyzedString>,
}

impl StoreInner {
    fn push(&mut self, record: AnalyzedString) -> Result<u64, StoreError> {
        if !record.hash_is_consistent() {
            return Err(StoreError::Corrupt(format!(
                "content hash {} does not match its value",
                record.content_hash
            )));
        }
        if self.by_hash.contains_key(&record.content_hash) {
            return Err(StoreError::Duplicate(record.content_hash));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_hash.insert(record.content_hash.clone(), seq);
        self.records.insert(seq, record);
        Ok(seq)
    }

    fn seq_for_value(&self, value: &str) -> Option<u64> {
        let hash = content_hash(value);
        let seq = *self.by_hash.get(&hash)?;
        // Guard against a digest collision rather than trusting the hash alone
        match self.records.get(&seq) {
            Some(record) if record.original_value == value => Some(seq),
            _ => None,
        }
    }

    fn remove(&mut self, seq: u64) -> Option<AnalyzedString> {
        let record = self.records.remove(&seq)?;
        self.by_hash.remove(&record.content_hash);
        Some(record)
    }

    fn restore(&mut self, seq: u64, record: AnalyzedString) {
        self.by_hash.insert(record.content_hash.clone(), seq);
        self.records.insert(seq, record);
    }
}

/// In-memory analyzed string store.
pub struct StringStore {
    inner: RwLock<StoreInner>,
    snapshot_path: Option<PathBuf>,
}

impl Default for StringStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StringStore {
    /// Volatile store, lost on drop.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            snapshot_path: None,
        }
    }

    /// Store backed by `{data_dir}/strings.json`, loading it when present.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let path = data_dir.join(SNAPSHOT_FILE);
        let inner = Self::load(&path)?;
        info!(
            "Opened string store at {:?} with {} records",
            path,
            inner.records.len()
        );

        Ok(Self {
            inner: RwLock::new(inner),
            snapshot_path: Some(path),
        })
    }

    /// Path of the snapshot file, if durable.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    fn load(path: &Path) -> Result<StoreInner, StoreError> {
        let mut inner = StoreInner::default();
        if !path.exists() {
            return Ok(inner);
        }

        let contents = std::fs::read_to_string(path)?;
        let records: Vec<AnalyzedString> = serde_json::from_str(&contents)?;

        for record in records {
            inner.push(record).map_err(|e| match e {
                StoreError::Duplicate(hash) => {
                    StoreError::Corrupt(format!("duplicate record {} in snapshot", hash))
                }
                other => other,
            })?;
        }

        Ok(inner)
    }

    fn persist(&self, inner: &StoreInner) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let records: Vec<&AnalyzedString> = inner.records.values().collect();
        let json = serde_json::to_string_pretty(&records)?;

        if path.exists() {
            std::fs::copy(path, path.with_extension("json.bak"))?;
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        debug!("Persisted {} records to {:?}", records.len(), path);
        Ok(())
    }
}

impl RecordStore for StringStore {
    fn insert(&self, record: AnalyzedString) -> Result<AnalyzedString, StoreError> {
        let mut inner = self.inner.write();

        let stored = record.clone();
        let seq = inner.push(record)?;

        if let Err(e) = self.persist(&inner) {
            warn!("Rolling back insert of {}: {}", stored.content_hash, e);
            inner.remove(seq);
            return Err(e);
        }

        Ok(stored)
    }

    fn find_by_value(&self, value: &str) -> Result<AnalyzedString, StoreError> {
        let inner = self.inner.read();
        inner
            .seq_for_value(value)
            .and_then(|seq| inner.records.get(&seq).cloned())
            .ok_or_else(|| StoreError::NotFound(content_hash(value)))
    }

    fn query(&self, predicate: &dyn RecordPredicate) -> Result<Vec<AnalyzedString>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .records
            .values()
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect())
    }

    fn delete_by_value(&self, value: &str) -> Result<AnalyzedString, StoreError> {
        let mut inner = self.inner.write();

        let seq = inner
            .seq_for_value(value)
            .ok_or_else(|| StoreError::NotFound(content_hash(value)))?;
        let removed = inner
            .remove(seq)
            .ok_or_else(|| StoreError::NotFound(content_hash(value)))?;

        if let Err(e) = self.persist(&inner) {
            warn!("Rolling back delete of {}: {}", removed.content_hash, e);
            inner.restore(seq, removed);
            return Err(e);
        }

        Ok(removed)
    }

    fn len(&self) -> usize {
        self.inner.read().records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(value: &str) -> AnalyzedString {
        stringlens_core::analyze(value)
            .unwrap()
            .into_record(Utc::now())
    }

    #[test]
    fn test_insert_and_find() {
        let store = StringStore::in_memory();
        store.insert(record("racecar")).unwrap();

        let found = store.find_by_value("racecar").unwrap();
        assert_eq!(found.original_value, "racecar");
        assert!(found.properties.is_palindrome);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let store = StringStore::in_memory();
        store.insert(record("hello")).unwrap();

        let err = store.insert(record("hello")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_is_exact() {
        let store = StringStore::in_memory();
        store.insert(record("Hello")).unwrap();

        assert!(matches!(
            store.find_by_value("hello"),
            Err(StoreError::NotFound(_))
        ));
        assert!(store.find_by_value("Hello").is_ok());
    }

    #[test]
    fn test_delete() {
        let store = StringStore::in_memory();
        store.insert(record("level")).unwrap();

        let removed = store.delete_by_value("level").unwrap();
        assert_eq!(removed.original_value, "level");
        assert!(store.is_empty());
        assert!(matches!(
            store.delete_by_value("level"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_query_keeps_creation_order() {
        let store = StringStore::in_memory();
        for value in ["noon", "abc", "kayak", "xyz", "refer"] {
            store.insert(record(value)).unwrap();
        }

        let palindromes = store
            .query(&|r: &AnalyzedString| r.properties.is_palindrome)
            .unwrap();
        let values: Vec<_> = palindromes.iter().map(|r| r.original_value.as_str()).collect();
        assert_eq!(values, vec!["noon", "kayak", "refer"]);
    }

    #[test]
    fn test_rejects_inconsistent_hash() {
        let store = StringStore::in_memory();
        let mut bad = record("abc");
        bad.content_hash = "0".repeat(64);

        assert!(matches!(store.insert(bad), Err(StoreError::Corrupt(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_duplicate_inserts() {
        let store = Arc::new(StringStore::in_memory());

        let successes: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    scope.spawn(move || store.insert(record("same value")).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();

        {
            let store = StringStore::open(dir.path()).unwrap();
            store.insert(record("first")).unwrap();
            store.insert(record("second")).unwrap();
            store.insert(record("third")).unwrap();
            store.delete_by_value("second").unwrap();
        }

        let reopened = StringStore::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 2);

        let all = reopened.query(&|_: &AnalyzedString| true).unwrap();
        let values: Vec<_> = all.iter().map(|r| r.original_value.as_str()).collect();
        assert_eq!(values, vec!["first", "third"]);
        assert!(dir.path().join("strings.json.bak").exists());
    }

    #[test]
    fn test_failed_snapshot_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        let store = StringStore::open(dir.path()).unwrap();
        store.insert(record("keep")).unwrap();
        store.insert(record("other")).unwrap();

        // A directory in place of the temp file makes every write fail
        std::fs::create_dir(dir.path().join("strings.json.tmp")).unwrap();

        assert!(matches!(store.insert(record("new")), Err(StoreError::Io(_))));
        assert_eq!(store.len(), 2);
        assert!(matches!(
            store.find_by_value("new"),
            Err(StoreError::NotFound(_))
        ));

        assert!(matches!(store.delete_by_value("keep"), Err(StoreError::Io(_))));
        assert_eq!(store.len(), 2);
        assert!(store.find_by_value("keep").is_ok());

        let all = store.query(&|_: &AnalyzedString| true).unwrap();
        let values: Vec<_> = all.iter().map(|r| r.original_value.as_str()).collect();
        assert_eq!(values, vec!["keep", "other"]);

        // The rolled-back insert can be retried once writes succeed again
        std::fs::remove_dir(dir.path().join("strings.json.tmp")).unwrap();
        store.insert(record("new")).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_snapshot_with_tampered_hash_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let mut tampered = record("abc");
        tampered.original_value = "abd".to_string();
        std::fs::write(
            dir.path().join(SNAPSHOT_FILE),
            serde_json::to_string(&vec![tampered]).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            StringStore::open(dir.path()),
            Err(StoreError::Corrupt(_))
        ));
    }
}
