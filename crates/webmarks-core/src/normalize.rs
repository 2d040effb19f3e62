//! Total normalization of raw rows into records

use crate::mapping::{ColumnMapping, RawRow};
use crate::record::{Record, RecordBatch};

/// Split a list cell on commas, trimming elements and dropping empties.
///
/// `"a, b ,c"` -> `["a", "b", "c"]`; `""` and `" , ,"` -> `[]`.
pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize one raw row into a record.
///
/// Total: any row shape produces a record. Missing cells read as `""`,
/// leaving scalars empty and lists `[]`. Scalar cells are copied verbatim;
/// only list elements are trimmed.
pub fn normalize_row(row: &RawRow, mapping: &ColumnMapping, index: usize) -> Record {
    Record {
        id: format!("bookmark-{}", index),
        name: row.cell(mapping.name).to_string(),
        url: row.cell(mapping.url).to_string(),
        types: split_list(row.cell(mapping.types)),
        notes: row.cell(mapping.notes).to_string(),
        tags: split_list(row.cell(mapping.tags)),
    }
}

/// Normalize a fetched table into a batch.
///
/// Never fails and never drops a row: the batch holds exactly one record
/// per input row, in input order, with ids stamped from that order.
pub fn normalize(rows: &[RawRow], mapping: &ColumnMapping) -> RecordBatch {
    RecordBatch::new(
        rows.iter()
            .enumerate()
            .map(|(index, row)| normalize_row(row, mapping, index))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        RawRow::new(cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn splits_trims_and_drops_empties() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("single"), vec!["single"]);
        assert_eq!(split_list(""), Vec::<String>::new());
        assert_eq!(split_list(" , ,"), Vec::<String>::new());
        assert_eq!(split_list(",,a,"), vec!["a"]);
    }

    #[test]
    fn full_row_maps_all_fields() {
        let mapping = ColumnMapping::default();
        let record = normalize_row(
            &row(&["Rust Book", "https://rust-lang.org", "docs,tutorial", "start here", "rust"]),
            &mapping,
            3,
        );

        assert_eq!(record.id, "bookmark-3");
        assert_eq!(record.name, "Rust Book");
        assert_eq!(record.url, "https://rust-lang.org");
        assert_eq!(record.types, vec!["docs", "tutorial"]);
        assert_eq!(record.notes, "start here");
        assert_eq!(record.tags, vec!["rust"]);
    }

    #[test]
    fn short_row_fills_with_empties() {
        let mapping = ColumnMapping::default();
        let record = normalize_row(&row(&["Only Name"]), &mapping, 0);

        assert_eq!(record.name, "Only Name");
        assert_eq!(record.url, "");
        assert!(record.types.is_empty());
        assert_eq!(record.notes, "");
        assert!(record.tags.is_empty());
    }

    #[test]
    fn scalar_cells_keep_their_whitespace() {
        let mapping = ColumnMapping::default();
        let record = normalize_row(&row(&["  padded  ", " u ", " a , b "]), &mapping, 0);

        assert_eq!(record.name, "  padded  ");
        assert_eq!(record.url, " u ");
        assert_eq!(record.types, vec!["a", "b"]);
    }

    #[test]
    fn custom_mapping_reorders_columns() {
        let mapping = ColumnMapping {
            name: 1,
            url: 0,
            types: 4,
            notes: 2,
            tags: 3,
        };
        let record = normalize_row(&row(&["u", "n", "note", "t1,t2", "x"]), &mapping, 0);

        assert_eq!(record.name, "n");
        assert_eq!(record.url, "u");
        assert_eq!(record.types, vec!["x"]);
        assert_eq!(record.notes, "note");
        assert_eq!(record.tags, vec!["t1", "t2"]);
    }

    #[test]
    fn batch_keeps_every_row_in_order() {
        let mapping = ColumnMapping::default();
        let rows = vec![row(&["A"]), row(&[]), row(&["C", "", "t"])];
        let batch = normalize(&rows, &mapping);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records[0].id, "bookmark-0");
        assert_eq!(batch.records[1].id, "bookmark-1");
        assert_eq!(batch.records[2].id, "bookmark-2");
        assert_eq!(batch.records[1].name, "");
        assert_eq!(batch.records[2].types, vec!["t"]);
    }
}
