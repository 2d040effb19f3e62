//! Airtable source adapter
//!
//! API docs: https://airtable.com/developers/web/api/list-records
//! Lists records from one base/table with bearer auth, following the
//! `offset` cursor until the listing is complete.

use serde::Deserialize;
use serde_json::{Map, Value};
use webmarks_core::RawRow;

use crate::http::HttpClient;
use crate::provider::{cell_text, FetchOutcome, SourceError, SourceMetadata};

/// View used when the config leaves it blank.
pub const DEFAULT_VIEW: &str = "Grid view";

/// Field names projected to cells, in column order.
pub const DEFAULT_FIELD_ORDER: [&str; 5] = ["Name", "URL", "Types", "Notes", "Tags"];

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    #[allow(dead_code)]
    id: String,
    #[serde(rename = "createdTime")]
    #[allow(dead_code)]
    created_time: Option<String>,
    /// Omitted entirely when the record has no populated fields.
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Error bodies come in two shapes: `{"error": "NOT_FOUND"}` and
/// `{"error": {"type": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Plain(String),
    Detailed {
        #[serde(rename = "type")]
        #[allow(dead_code)]
        kind: Option<String>,
        message: Option<String>,
    },
}

pub struct AirtableSource {
    client: HttpClient,
    base_url: String,
    api_key: String,
    locator: String,
    view: String,
    field_order: Vec<String>,
}

impl AirtableSource {
    /// `locator` is `<base>/<table>`, e.g. `appXXXX/Bookmarks`.
    pub fn new(api_key: &str, locator: &str, view: &str) -> Self {
        Self {
            client: HttpClient::new("webmarks/0.1"),
            base_url: "https://api.airtable.com/v0".to_string(),
            api_key: api_key.to_string(),
            locator: locator.to_string(),
            view: view.to_string(),
            field_order: DEFAULT_FIELD_ORDER.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Override which named fields land in which column.
    pub fn with_field_order(mut self, field_order: Vec<String>) -> Self {
        self.field_order = field_order;
        self
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "airtable",
            name: "Airtable",
            description: "Bookmark records from an Airtable base view",
            base_url: "https://api.airtable.com",
            requires_api_key: true,
        }
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.locator.trim().is_empty()
    }

    fn split_locator(&self) -> Result<(&str, &str), SourceError> {
        match self.locator.split_once('/') {
            Some((base, table)) if !base.trim().is_empty() && !table.trim().is_empty() => {
                Ok((base.trim(), table.trim()))
            }
            _ => Err(SourceError::InvalidLocator(self.locator.clone())),
        }
    }

    /// Fetch every page of the configured view.
    ///
    /// Blank key or locator short-circuits to `NotConfigured`. A present
    /// but malformed locator is a displayable error instead; the user
    /// typed something, so silence would hide the mistake. Pages are
    /// concatenated in listing order.
    pub async fn fetch(&self) -> Result<FetchOutcome, SourceError> {
        if !self.is_configured() {
            return Ok(FetchOutcome::NotConfigured);
        }

        let (base, table) = self.split_locator()?;
        let view = if self.view.trim().is_empty() {
            DEFAULT_VIEW
        } else {
            self.view.as_str()
        };
        let url = format!("{}/{}/{}", self.base_url, base, urlencoding::encode(table));

        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = vec![("view", view), ("pageSize", "100")];
            if let Some(cursor) = offset.as_deref() {
                params.push(("offset", cursor));
            }

            let response = self
                .client
                .get_with_bearer(&url, &params, &self.api_key)
                .await?;

            if !(200..300).contains(&response.status) {
                return Err(SourceError::Api {
                    provider: "Airtable",
                    status: response.status,
                    message: parse_error_message(&response.body),
                });
            }

            let page = self.parse_records_response(&response.body)?;
            rows.extend(page.rows);

            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        Ok(FetchOutcome::Rows(rows))
    }

    /// Parse one listing page into projected rows plus the continuation
    /// cursor. Pure; pagination is the caller's loop.
    pub fn parse_records_response(&self, json: &str) -> Result<RecordsPage, SourceError> {
        let response: RecordsResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Airtable JSON: {}", e)))?;

        let rows = response
            .records
            .into_iter()
            .map(|record| self.project_row(&record.fields))
            .collect();

        Ok(RecordsPage {
            rows,
            offset: response.offset,
        })
    }

    /// Named fields -> positional cells through the field order. Missing
    /// fields read as empty cells, same as a short spreadsheet row.
    fn project_row(&self, fields: &Map<String, Value>) -> RawRow {
        RawRow::new(
            self.field_order
                .iter()
                .map(|name| fields.get(name).map(cell_text).unwrap_or_default())
                .collect(),
        )
    }
}

/// One parsed listing page.
pub struct RecordsPage {
    pub rows: Vec<RawRow>,
    pub offset: Option<String>,
}

fn parse_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return match parsed.error {
            ErrorBody::Plain(code) => code,
            ErrorBody::Detailed { message, .. } => {
                message.unwrap_or_else(|| "no error details".to_string())
            }
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error details".to_string()
    } else {
        trimmed.to_string()
    }
}
