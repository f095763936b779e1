use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last-read position for one series, as stored under `manga_history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub last_chapter: String,
    /// Zero-based page index within `last_chapter`.
    pub last_page: usize,
    /// Unix time of the last update, in milliseconds.
    pub timestamp: i64,
}

/// Series id → progress record. Ordered so the stored blob is stable.
pub type ProgressMap = BTreeMap<String, ProgressRecord>;
