//! webmarks-sources: fetching bookmarks into webmarks
//!
//! Everything that touches the outside world lives here:
//! - HTTP transport wrapper (timeouts, params, bearer auth)
//! - Google Sheets and Airtable adapters returning raw rows
//! - Connection config resolution (environment, stored file) and
//!   wholesale JSON persistence
//! - The fetch session owning batch snapshots and refresh coordination
//!
//! The pure pipeline (normalization, facets, queries) lives in
//! webmarks-core; this crate feeds it.

pub mod airtable;
pub mod config;
pub mod http;
pub mod provider;
pub mod session;
pub mod sheets;

// Re-export main types for convenience
pub use airtable::AirtableSource;
pub use config::{
    clear_config, default_config_path, parse_provider, resolve_config, ConfigError, ConfigSource,
    ConnectionConfig, Provider, ResolvedConfig,
};
pub use http::{HttpClient, HttpError, HttpResponse};
pub use provider::{available_sources, FetchOutcome, RowSource, SourceError, SourceMetadata};
pub use session::{RefreshOutcome, Session};
pub use sheets::SheetsSource;
