//! Fetch session: batch snapshots and refresh coordination
//!
//! One owned value holds the current batch, its facet index, the last
//! fetch error, and the memoized view. Reads always see a consistent
//! snapshot. Overlapping refreshes resolve last-started-wins: completions
//! of older fetches are discarded without touching state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use webmarks_core::{
    normalize, run_query, ColumnMapping, FacetIndex, QueryState, Record, RecordBatch,
};

use crate::config::ConnectionConfig;
use crate::provider::{FetchOutcome, RowSource, SourceError, SourceMetadata};

/// How a refresh ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new batch was applied, replacing the previous one wholesale.
    Applied { records: usize },
    /// A newer refresh started while this one was in flight; the result
    /// was discarded and state is untouched.
    Superseded,
    /// The source is not configured. Nothing was fetched, state is
    /// untouched; this is idle, not failure.
    NotConfigured,
}

#[derive(Debug, Default)]
struct SessionState {
    batch: RecordBatch,
    facets: FacetIndex,
    last_error: Option<String>,
    last_fetched_at: Option<DateTime<Utc>>,
    cached_view: Option<(QueryState, Vec<Record>)>,
}

pub struct Session {
    source: RowSource,
    mapping: ColumnMapping,
    fetch_seq: AtomicU64,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self::with_mapping(config, ColumnMapping::default())
    }

    pub fn with_mapping(config: &ConnectionConfig, mapping: ColumnMapping) -> Self {
        Self {
            source: RowSource::from_config(config),
            mapping,
            fetch_seq: AtomicU64::new(0),
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn source_metadata(&self) -> SourceMetadata {
        self.source.metadata()
    }

    /// Fetch once and apply the outcome under last-started-wins.
    ///
    /// On success the batch and facets are replaced wholesale, the error
    /// cleared, and the view cache dropped. On failure the previous batch
    /// is retained and stays queryable; the displayable error is recorded
    /// and also returned. `NotConfigured` changes nothing.
    pub async fn refresh(&self) -> Result<RefreshOutcome, SourceError> {
        let seq = self.begin_refresh();
        let outcome = self.source.fetch().await;
        self.finish_refresh(seq, outcome)
    }

    fn begin_refresh(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn finish_refresh(
        &self,
        seq: u64,
        outcome: Result<FetchOutcome, SourceError>,
    ) -> Result<RefreshOutcome, SourceError> {
        let mut state = self.state.write().expect("session state lock poisoned");

        // Seq is stamped at fetch start, so "a newer one started" is
        // enough to discard this completion, finished or failed.
        if self.fetch_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "Discarding superseded fetch");
            return Ok(RefreshOutcome::Superseded);
        }

        match outcome {
            Ok(FetchOutcome::NotConfigured) => Ok(RefreshOutcome::NotConfigured),
            Ok(FetchOutcome::Rows(rows)) => {
                let batch = normalize(&rows, &self.mapping);
                let records = batch.len();

                state.facets = FacetIndex::build(&batch);
                state.batch = batch;
                state.last_error = None;
                state.last_fetched_at = Some(Utc::now());
                state.cached_view = None;

                tracing::info!(records, "Applied fetched batch");
                Ok(RefreshOutcome::Applied { records })
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                tracing::warn!("Fetch failed: {}", e);
                Err(e)
            }
        }
    }

    /// Evaluate a query against the current batch.
    ///
    /// The last `(query, result)` pair is memoized; repeating the previous
    /// query returns the cached records. The cache drops whenever a new
    /// batch is applied, so cached and fresh results are indistinguishable.
    pub fn view(&self, query: &QueryState) -> Vec<Record> {
        {
            let state = self.state.read().expect("session state lock poisoned");
            if let Some((cached_query, cached)) = &state.cached_view {
                if cached_query == query {
                    return cached.clone();
                }
            }
        }

        let mut state = self.state.write().expect("session state lock poisoned");
        let results = run_query(&state.batch, query);
        state.cached_view = Some((query.clone(), results.clone()));
        results
    }

    /// Records of the current batch, in batch order.
    pub fn records(&self) -> Vec<Record> {
        self.state
            .read()
            .expect("session state lock poisoned")
            .batch
            .records
            .clone()
    }

    pub fn record_count(&self) -> usize {
        self.state
            .read()
            .expect("session state lock poisoned")
            .batch
            .len()
    }

    pub fn facets(&self) -> FacetIndex {
        self.state
            .read()
            .expect("session state lock poisoned")
            .facets
            .clone()
    }

    /// Displayable message from the most recent failed fetch, cleared by
    /// the next applied batch.
    pub fn last_error(&self) -> Option<String> {
        self.state
            .read()
            .expect("session state lock poisoned")
            .last_error
            .clone()
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .expect("session state lock poisoned")
            .last_fetched_at
    }
}
