//! Common contract for source adapters

use serde_json::Value;
use thiserror::Error;
use webmarks_core::RawRow;

use crate::airtable::AirtableSource;
use crate::config::{ConnectionConfig, Provider};
use crate::http::HttpError;
use crate::sheets::SheetsSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(HttpError),
    #[error("{provider} request failed (HTTP {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("Invalid response: {0}")]
    Parse(String),
    #[error("Rate limited, try again later")]
    RateLimit,
    #[error("Invalid table locator {0:?}: expected <base>/<table>")]
    InvalidLocator(String),
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SourceError::RateLimit,
            other => SourceError::Http(other),
        }
    }
}

/// Metadata about a provider
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
    pub requires_api_key: bool,
}

/// What a fetch produced.
///
/// `NotConfigured` is the idle outcome, not an error: required connection
/// fields were blank, so no request was made and no state should change.
/// A failed request is the `Err` side and carries a displayable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    NotConfigured,
    Rows(Vec<RawRow>),
}

/// The closed set of row sources, dispatched by config.
pub enum RowSource {
    Sheets(SheetsSource),
    Airtable(AirtableSource),
}

impl RowSource {
    pub fn from_config(config: &ConnectionConfig) -> Self {
        match config.provider {
            Provider::GoogleSheets => RowSource::Sheets(SheetsSource::new(
                &config.api_key,
                &config.locator,
                &config.view,
            )),
            Provider::Airtable => RowSource::Airtable(AirtableSource::new(
                &config.api_key,
                &config.locator,
                &config.view,
            )),
        }
    }

    /// One fetch, no retries. The caller decides when to try again.
    pub async fn fetch(&self) -> Result<FetchOutcome, SourceError> {
        match self {
            RowSource::Sheets(source) => source.fetch().await,
            RowSource::Airtable(source) => source.fetch().await,
        }
    }

    pub fn metadata(&self) -> SourceMetadata {
        match self {
            RowSource::Sheets(_) => SheetsSource::metadata(),
            RowSource::Airtable(_) => AirtableSource::metadata(),
        }
    }
}

/// Metadata for every supported provider, for discovery listings.
pub fn available_sources() -> Vec<SourceMetadata> {
    vec![SheetsSource::metadata(), AirtableSource::metadata()]
}

/// Coerce a wire cell value to text.
///
/// Providers hand back JSON scalars even for formatted reads, and Airtable
/// fields can be arrays. Null becomes `""`, arrays join their coerced
/// elements with `", "` so they re-split downstream, everything else
/// renders through its JSON form.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_text_coerces_scalars() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("plain")), "plain");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(3.5)), "3.5");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn cell_text_joins_arrays_for_resplitting() {
        assert_eq!(cell_text(&json!(["a", "b", 3])), "a, b, 3");
        assert_eq!(cell_text(&json!([])), "");
    }

    #[test]
    fn rate_limits_map_to_their_own_variant() {
        let error: SourceError = HttpError::RateLimited.into();
        assert!(matches!(error, SourceError::RateLimit));

        let error: SourceError = HttpError::Timeout.into();
        assert!(matches!(error, SourceError::Http(HttpError::Timeout)));
    }

    #[test]
    fn api_errors_read_like_sentences() {
        let error = SourceError::Api {
            provider: "Google Sheets",
            status: 403,
            message: "The caller does not have permission".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Google Sheets request failed (HTTP 403): The caller does not have permission"
        );
    }

    #[test]
    fn every_provider_is_discoverable() {
        let sources = available_sources();
        let ids: Vec<&str> = sources.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["google-sheets", "airtable"]);
        assert!(sources.iter().all(|s| s.requires_api_key));
    }

    #[tokio::test]
    async fn dispatch_respects_the_configured_provider() {
        let config = ConnectionConfig {
            provider: Provider::Airtable,
            ..Default::default()
        };
        let source = RowSource::from_config(&config);
        assert_eq!(source.metadata().id, "airtable");

        // Blank credentials: idle outcome straight away, no request.
        assert_eq!(source.fetch().await.unwrap(), FetchOutcome::NotConfigured);
    }
}
