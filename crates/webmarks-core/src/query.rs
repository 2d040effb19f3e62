//! Query engine: conjunctive filtering and sorting over a batch

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collate::compare_names;
use crate::record::{Record, RecordBatch};

/// How query results are ordered.
///
/// Sorting always applies to the filtered sequence, never to the whole
/// batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Original batch order.
    #[default]
    None,
    /// Ascending by name, case- and diacritic-insensitive.
    NameAsc,
    /// Exact reverse of `NameAsc`.
    NameDesc,
    /// Full reversal of the filtered sequence. Source order is
    /// oldest-first, so this shows newest first.
    LatestFirst,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::NameAsc => "name-asc",
            SortMode::NameDesc => "name-desc",
            SortMode::LatestFirst => "latest-first",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a sort mode from its kebab-case name.
pub fn parse_sort_mode(s: &str) -> Option<SortMode> {
    match s.trim().to_lowercase().as_str() {
        "none" => Some(SortMode::None),
        "name-asc" => Some(SortMode::NameAsc),
        "name-desc" => Some(SortMode::NameDesc),
        "latest-first" => Some(SortMode::LatestFirst),
        _ => None,
    }
}

/// One query over a batch: free-text search, at most one selection per
/// facet field, and a sort mode.
///
/// `Default` is the empty query; running it returns the batch unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search: String,
    pub selected_type: Option<String>,
    pub selected_tag: Option<String>,
    pub sort: SortMode,
}

impl QueryState {
    /// True when no filter criterion is active. Sort may still be set.
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty() && self.selected_type.is_none() && self.selected_tag.is_none()
    }
}

/// Case-insensitive substring match of the whole search string against the
/// scalar fields and each list element individually.
fn matches_search(record: &Record, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&record.name)
        || contains(&record.url)
        || contains(&record.notes)
        || record.types.iter().any(|t| contains(t))
        || record.tags.iter().any(|t| contains(t))
}

/// Exact, case-sensitive membership test. No selection matches everything.
fn matches_facet(values: &[String], selected: &Option<String>) -> bool {
    match selected {
        Some(value) => values.iter().any(|v| v == value),
        None => true,
    }
}

/// Evaluate a query against a batch.
///
/// Filtering is conjunctive: every active criterion must hold. The sort
/// then reorders the filtered records. The batch itself is never touched,
/// and re-running the same query yields the same result.
pub fn run_query(batch: &RecordBatch, state: &QueryState) -> Vec<Record> {
    let needle = state.search.to_lowercase();

    let mut records: Vec<Record> = batch
        .iter()
        .filter(|record| {
            (needle.is_empty() || matches_search(record, &needle))
                && matches_facet(&record.types, &state.selected_type)
                && matches_facet(&record.tags, &state.selected_tag)
        })
        .cloned()
        .collect();

    match state.sort {
        SortMode::None => {}
        SortMode::NameAsc => records.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortMode::NameDesc => records.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortMode::LatestFirst => records.reverse(),
    }

    records
}
