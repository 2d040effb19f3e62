//! Raw rows and the positional column mapping

use serde::{Deserialize, Serialize};

/// An ordered row of string cells as delivered by a provider.
///
/// Backends omit trailing empty cells, so rows are often shorter than the
/// mapped width. Reads past the end yield `""` instead of failing; the
/// normalizer relies on this to stay total. Adapters coerce whatever the
/// wire carries (numbers, booleans, arrays) into cell text before rows
/// cross into this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell at `index`, or `""` when the row is shorter.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<String>> for RawRow {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

/// Field -> column index mapping for the five record fields.
///
/// Constructed once per source and treated as fixed for its lifetime;
/// record ids are stamped from row position, so remapping mid-session
/// would silently repurpose them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub name: usize,
    pub url: usize,
    pub types: usize,
    pub notes: usize,
    pub tags: usize,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: 0,
            url: 1,
            types: 2,
            notes: 3,
            tags: 4,
        }
    }
}
