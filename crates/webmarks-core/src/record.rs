//! Bookmark record and batch types

use serde::{Deserialize, Serialize};

/// A single normalized bookmark.
///
/// Ids are positional: `bookmark-<index>`, where `<index>` is the record's
/// 0-based position within the batch it was normalized from. Re-fetching
/// reordered source data reassigns ids, so they key UI lists but do not
/// identify a bookmark across fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub url: String,
    pub types: Vec<String>,
    pub notes: String,
    pub tags: Vec<String>,
}

/// A snapshot of fetched bookmarks.
///
/// Batches are replaced wholesale: every successful fetch builds a fresh
/// batch and the previous one is dropped. There is no merge and no
/// per-record mutation. Order is source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub records: Vec<Record>,
}

impl RecordBatch {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}
