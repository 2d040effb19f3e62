//! Facet derivation: distinct types and tags across a batch

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordBatch};

/// The two list fields facets are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetField {
    Types,
    Tags,
}

impl FacetField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetField::Types => "types",
            FacetField::Tags => "tags",
        }
    }

    fn values<'a>(&self, record: &'a Record) -> &'a [String] {
        match self {
            FacetField::Types => &record.types,
            FacetField::Tags => &record.tags,
        }
    }
}

/// Distinct values of one list field across a batch.
///
/// Case-sensitive dedup, ascending code-point order. The empty batch
/// yields an empty list. Values are exactly the normalized list elements;
/// no further trimming or case folding.
pub fn distinct_values(batch: &RecordBatch, field: FacetField) -> Vec<String> {
    let set: BTreeSet<&str> = batch
        .iter()
        .flat_map(|record| field.values(record))
        .map(String::as_str)
        .collect();

    set.into_iter().map(str::to_string).collect()
}

/// Sorted distinct facet values for a batch.
///
/// Derived data: rebuilt whenever the batch is replaced, never updated
/// incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetIndex {
    pub types: Vec<String>,
    pub tags: Vec<String>,
}

impl FacetIndex {
    pub fn build(batch: &RecordBatch) -> Self {
        Self {
            types: distinct_values(batch, FacetField::Types),
            tags: distinct_values(batch, FacetField::Tags),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ColumnMapping, RawRow};
    use crate::normalize::normalize;

    fn batch(rows: &[&[&str]]) -> RecordBatch {
        let rows: Vec<RawRow> = rows
            .iter()
            .map(|cells| RawRow::new(cells.iter().map(|c| c.to_string()).collect()))
            .collect();
        normalize(&rows, &ColumnMapping::default())
    }

    #[test]
    fn values_are_sorted_and_distinct() {
        let batch = batch(&[
            &["A", "", "web,cli", "", "rust,tools"],
            &["B", "", "cli", "", "rust"],
            &["C", "", "docs", "", ""],
        ]);

        assert_eq!(
            distinct_values(&batch, FacetField::Types),
            vec!["cli", "docs", "web"]
        );
        assert_eq!(
            distinct_values(&batch, FacetField::Tags),
            vec!["rust", "tools"]
        );
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let batch = batch(&[&["A", "", "Web,web"], &["B", "", "WEB"]]);
        assert_eq!(
            distinct_values(&batch, FacetField::Types),
            vec!["WEB", "Web", "web"]
        );
    }

    #[test]
    fn empty_batch_yields_empty_facets() {
        let index = FacetIndex::build(&RecordBatch::default());
        assert!(index.is_empty());
        assert!(index.types.is_empty());
        assert!(index.tags.is_empty());
    }

    #[test]
    fn index_covers_both_fields() {
        let batch = batch(&[&["A", "", "t2,t1", "", "g1"]]);
        let index = FacetIndex::build(&batch);

        assert_eq!(index.types, vec!["t1", "t2"]);
        assert_eq!(index.tags, vec!["g1"]);
        assert!(!index.is_empty());
    }
}
