//! Dataset Store for holding ingested multi-frame datasets.
//!
//! The store is the only owner allowed to insert, overwrite or drop records.
//! Records are handed out as `Arc<DatasetRecord>` so readers never observe a
//! record changing underneath them; a re-`put` replaces the entry, it does not
//! mutate the old record.
//!
//! There is no eviction policy. Capacity is bounded only by the caller keeping
//! one record per active dataset and calling [`DatasetStore::clear`] on
//! teardown.
//!
//! # Example
//!
//! ```
//! use multiframe_loader::dataset::{DatasetRecord, DatasetStore};
//!
//! let store = DatasetStore::new();
//! store.put("ct-1", DatasetRecord::new("ct-1", vec![0u8; 32], 4, 4, 2, 8));
//!
//! let record = store.get("ct-1").unwrap();
//! assert_eq!(record.number_of_frames, 2);
//!
//! store.clear();
//! assert!(store.get("ct-1").is_none());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use super::record::DatasetRecord;

/// Process-wide keyed cache of dataset records.
///
/// Reads take a shared lock; `put` and `clear` take the exclusive lock. The
/// host may prefetch several frames of one source at once, so `get` must be
/// callable from many tasks concurrently.
#[derive(Debug, Default)]
pub struct DatasetStore {
    records: RwLock<HashMap<String, Arc<DatasetRecord>>>,
}

impl DatasetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record already stored under `source_id`.
    ///
    /// The key is authoritative: the stored record's `source_id` is set to it.
    /// The record contents are not validated here.
    pub fn put(&self, source_id: impl Into<String>, mut record: DatasetRecord) {
        let source_id = source_id.into();
        if record.source_id != source_id {
            debug!(
                source_id = %source_id,
                record_id = %record.source_id,
                "Record id differs from store key, using key"
            );
            record.source_id = source_id.clone();
        }
        debug!(
            source_id = %source_id,
            frames = record.number_of_frames,
            rows = record.rows,
            columns = record.columns,
            bytes = record.buffer.len(),
            "Storing dataset"
        );

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.insert(source_id.clone(), Arc::new(record)).is_some() {
            debug!(source_id = %source_id, "Replaced existing dataset");
        }
    }

    /// Look up a record.
    pub fn get(&self, source_id: &str) -> Option<Arc<DatasetRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(source_id).cloned()
    }

    /// Whether a record is stored under `source_id`.
    pub fn contains(&self, source_id: &str) -> bool {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.contains_key(source_id)
    }

    /// Drop every stored record.
    pub fn clear(&self) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let count = records.len();
        records.clear();
        info!(cleared = count, "Cleared dataset store");
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored source ids, sorted.
    pub fn source_ids(&self) -> Vec<String> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = records.keys().cloned().collect();
        ids.sort();
        ids
    }
}

// =============================================================================
// Tests
// =============================================================================
