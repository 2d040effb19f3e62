//! Google Sheets source adapter
//!
//! API docs: https://developers.google.com/sheets/api/reference/rest
//! Reads one range via `spreadsheets.values.get`, authorized by API key.
//! The sheet must be link-readable; no OAuth flow.

use serde::Deserialize;
use serde_json::Value;
use webmarks_core::RawRow;

use crate::http::HttpClient;
use crate::provider::{cell_text, FetchOutcome, SourceError, SourceMetadata};

/// A1 range used when the config leaves the range blank.
pub const DEFAULT_RANGE: &str = "Sheet1!A:E";

/// values.get response wrapper
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[allow(dead_code)]
    range: Option<String>,
    #[serde(rename = "majorDimension")]
    #[allow(dead_code)]
    major_dimension: Option<String>,
    /// Omitted entirely when the range holds no data.
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Error envelope: `{ "error": { "code", "message", "status" } }`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i64>,
    message: Option<String>,
    #[allow(dead_code)]
    status: Option<String>,
}

pub struct SheetsSource {
    client: HttpClient,
    base_url: String,
    api_key: String,
    spreadsheet_id: String,
    range: String,
    header_rows: usize,
}

impl SheetsSource {
    pub fn new(api_key: &str, spreadsheet_id: &str, range: &str) -> Self {
        Self {
            client: HttpClient::new("webmarks/0.1"),
            base_url: "https://sheets.googleapis.com/v4".to_string(),
            api_key: api_key.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            header_rows: 1,
        }
    }

    /// Override how many leading rows are dropped as headers (default 1).
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "google-sheets",
            name: "Google Sheets",
            description: "Bookmark rows from a link-readable spreadsheet range",
            base_url: "https://sheets.googleapis.com",
            requires_api_key: true,
        }
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.spreadsheet_id.trim().is_empty()
    }

    /// Fetch the configured range once.
    ///
    /// A blank key or spreadsheet id short-circuits to `NotConfigured`
    /// without touching the network. Whatever the range read returns is
    /// passed through; there is no re-request on truncation.
    pub async fn fetch(&self) -> Result<FetchOutcome, SourceError> {
        if !self.is_configured() {
            return Ok(FetchOutcome::NotConfigured);
        }

        let range = if self.range.trim().is_empty() {
            DEFAULT_RANGE
        } else {
            self.range.as_str()
        };

        // The range is a path segment, so "Sheet1!A:E" needs encoding.
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .client
            .get_with_params(
                &url,
                &[
                    ("key", self.api_key.as_str()),
                    ("majorDimension", "ROWS"),
                ],
            )
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(SourceError::Api {
                provider: "Google Sheets",
                status: response.status,
                message: parse_error_message(&response.body),
            });
        }

        let rows = Self::parse_values_response(&response.body)?;
        Ok(FetchOutcome::Rows(self.drop_header_rows(rows)))
    }

    /// Parse a values.get body into raw rows. Pure; header rows included.
    pub fn parse_values_response(json: &str) -> Result<Vec<RawRow>, SourceError> {
        let response: ValuesResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Sheets JSON: {}", e)))?;

        Ok(response
            .values
            .into_iter()
            .map(|cells| RawRow::new(cells.iter().map(cell_text).collect()))
            .collect())
    }

    fn drop_header_rows(&self, mut rows: Vec<RawRow>) -> Vec<RawRow> {
        rows.drain(..self.header_rows.min(rows.len()));
        rows
    }
}

/// Pull the display message out of an error body, falling back to the raw
/// body when it is not the documented envelope.
fn parse_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(message) = parsed.error.message {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error details".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webmarks_core::{normalize, run_query, ColumnMapping, FacetIndex, QueryState};

    const SAMPLE_RESPONSE: &str = r#"{
        "range": "Sheet1!A1:E100",
        "majorDimension": "ROWS",
        "values": [
            ["Name", "URL", "Types", "Notes", "Tags"],
            ["Rust Book", "https://doc.rust-lang.org/book/", "docs,tutorial", "start here", "rust"],
            ["Crates.io", "https://crates.io", "registry", "", "rust,packages"]
        ]
    }"#;

    #[test]
    fn parses_rows_with_headers_intact() {
        let rows = SheetsSource::parse_values_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cell(0), "Name");
        assert_eq!(rows[1].cell(0), "Rust Book");
        assert_eq!(rows[2].cell(4), "rust,packages");
    }

    #[test]
    fn missing_values_key_means_empty_table() {
        let rows =
            SheetsSource::parse_values_response(r#"{"range": "Empty!A:E"}"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn non_string_cells_coerce_to_text() {
        let json = r#"{"values": [["Name", 42, true, null, ["a", "b"]]]}"#;
        let rows = SheetsSource::parse_values_response(json).unwrap();

        assert_eq!(rows[0].cell(0), "Name");
        assert_eq!(rows[0].cell(1), "42");
        assert_eq!(rows[0].cell(2), "true");
        assert_eq!(rows[0].cell(3), "");
        assert_eq!(rows[0].cell(4), "a, b");
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        let result = SheetsSource::parse_values_response("<html>quota</html>");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn header_skip_defaults_to_one_row() {
        let source = SheetsSource::new("key", "sheet", "");
        let rows = SheetsSource::parse_values_response(SAMPLE_RESPONSE).unwrap();
        let data = source.drop_header_rows(rows);

        assert_eq!(data.len(), 2);
        assert_eq!(data[0].cell(0), "Rust Book");
    }

    #[test]
    fn header_skip_never_underflows() {
        let source = SheetsSource::new("key", "sheet", "").with_header_rows(5);
        assert!(source.drop_header_rows(Vec::new()).is_empty());

        let one = vec![RawRow::new(vec!["only".to_string()])];
        assert!(source.drop_header_rows(one).is_empty());
    }

    #[test]
    fn error_message_extraction_prefers_the_envelope() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(
            parse_error_message(body),
            "The caller does not have permission"
        );

        assert_eq!(parse_error_message("  "), "no error details");
        assert_eq!(parse_error_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn blank_credentials_are_idle_not_errors() {
        let source = SheetsSource::new("", "sheet", "");
        assert_eq!(source.fetch().await.unwrap(), FetchOutcome::NotConfigured);

        let source = SheetsSource::new("key", "   ", "");
        assert_eq!(source.fetch().await.unwrap(), FetchOutcome::NotConfigured);
    }

    // Two header rows, then three data rows, then the rest of the pipeline.
    #[test]
    fn two_header_sheet_flows_into_facet_queries() {
        let json = r#"{
            "values": [
                ["My Bookmarks", "", "", "", ""],
                ["Name", "URL", "Types", "Notes", "Tags"],
                ["N1", "U1", "t1,t2", "note1", "g1"],
                ["N2", "U2", "", "", ""],
                ["N3", "U3", "t1", "note3", "g1,g2"]
            ]
        }"#;

        let source = SheetsSource::new("key", "sheet", "").with_header_rows(2);
        let rows = source.drop_header_rows(SheetsSource::parse_values_response(json).unwrap());
        let batch = normalize(&rows, &ColumnMapping::default());

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records[0].id, "bookmark-0");
        assert_eq!(batch.records[2].id, "bookmark-2");

        let facets = FacetIndex::build(&batch);
        assert_eq!(facets.types, vec!["t1", "t2"]);
        assert_eq!(facets.tags, vec!["g1", "g2"]);

        let state = QueryState {
            selected_type: Some("t1".to_string()),
            ..Default::default()
        };
        let results = run_query(&batch, &state);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["bookmark-0", "bookmark-2"]);
    }
}
