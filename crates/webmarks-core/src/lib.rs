//! webmarks-core: pure bookmark pipeline for webmarks
//!
//! This library provides the I/O-free half of webmarks:
//! - Raw row and column mapping types shared with source adapters
//! - Normalization of raw rows into typed records
//! - Facet index derivation (distinct types/tags)
//! - The query engine (text search, facet selection, sorting)
//!
//! Everything here is a pure function of its inputs: no network, no
//! filesystem, no async runtime. Fetching lives in webmarks-sources.

pub mod collate;
pub mod facet;
pub mod mapping;
pub mod normalize;
pub mod query;
pub mod record;

// Re-export main types for convenience
pub use facet::{FacetField, FacetIndex};
pub use mapping::{ColumnMapping, RawRow};
pub use normalize::{normalize, normalize_row, split_list};
pub use query::{parse_sort_mode, run_query, QueryState, SortMode};
pub use record::{Record, RecordBatch};
