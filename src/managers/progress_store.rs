//! Progress Store for MangaHub.
//!
//! Keeps one [`ProgressRecord`] per series under the `manga_history` key.
//! The whole map is re-serialized on every write. Reads and writes never fail
//! from the caller's point of view: a malformed blob is treated as an empty
//! history, and a failed write is logged while the in-memory copy stays current.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::services::storage::{read_json, write_json, KeyValueStorage};
use crate::types::progress::{ProgressMap, ProgressRecord};

/// Storage key of the progress map.
pub const HISTORY_KEY: &str = "manga_history";

/// Trait defining reading-progress persistence.
pub trait ProgressStoreTrait {
    fn get(&self, series_id: &str) -> Option<ProgressRecord>;
    fn set(&mut self, series_id: &str, chapter_id: &str, page_index: usize);
}

pub struct ProgressStore {
    storage: Arc<dyn KeyValueStorage>,
    records: ProgressMap,
    last_timestamp: i64,
}

impl ProgressStore {
    /// Loads the stored history, starting empty if it is absent or malformed.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let records = match read_json::<ProgressMap>(storage.as_ref(), HISTORY_KEY) {
            Ok(Some(records)) => records,
            Ok(None) => ProgressMap::new(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable reading history");
                ProgressMap::new()
            }
        };
        let last_timestamp = records.values().map(|r| r.timestamp).max().unwrap_or(0);
        Self {
            storage,
            records,
            last_timestamp,
        }
    }

    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl ProgressStoreTrait for ProgressStore {
    fn get(&self, series_id: &str) -> Option<ProgressRecord> {
        self.records.get(series_id).cloned()
    }

    /// Overwrites the record for `series_id` and persists the whole map.
    ///
    /// Timestamps are kept non-decreasing across writes, even if the wall
    /// clock steps backwards.
    fn set(&mut self, series_id: &str, chapter_id: &str, page_index: usize) {
        let timestamp = Self::now_millis().max(self.last_timestamp);
        self.last_timestamp = timestamp;
        self.records.insert(
            series_id.to_string(),
            ProgressRecord {
                last_chapter: chapter_id.to_string(),
                last_page: page_index,
                timestamp,
            },
        );
        if let Err(e) = write_json(self.storage.as_ref(), HISTORY_KEY, &self.records) {
            warn!(series_id, error = %e, "failed to persist reading progress");
        }
    }
}
