//! Work dispatcher running bounded concurrent valuation workers

use crate::inventory::{extract_identifier, FetchOutcome, InventoryFetcher, RecordBuilder, ValuationRecord};
use crate::status::StatusSink;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default number of concurrent workers
const DEFAULT_CONCURRENCY: usize = 4;

/// Configuration for the dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound on identifiers processed at the same time
    pub concurrency: usize,
    /// Return records in input order instead of completion order
    pub preserve_order: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            preserve_order: true,
        }
    }
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }
}

/// Shared, lock-protected collection of finished records
///
/// Each record is tagged with the index of the input line it came from.
#[derive(Debug, Default)]
pub struct ResultSink {
    records: Mutex<Vec<(usize, ValuationRecord)>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, index: usize, record: ValuationRecord) {
        self.records.lock().await.push((index, record));
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Drain the sink, sorted by input index when `preserve_order` is set
    pub fn into_records(self, preserve_order: bool) -> Vec<ValuationRecord> {
        let mut records = self.records.into_inner();
        if preserve_order {
            records.sort_by_key(|(index, _)| *index);
        }
        records.into_iter().map(|(_, record)| record).collect()
    }
}

/// Fans input lines out to a bounded set of concurrent workers
pub struct WorkDispatcher {
    config: DispatcherConfig,
    fetcher: InventoryFetcher,
    builder: RecordBuilder,
    status: Arc<dyn StatusSink>,
}

impl WorkDispatcher {
    pub fn new(
        config: DispatcherConfig,
        fetcher: InventoryFetcher,
        builder: RecordBuilder,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            fetcher,
            builder,
            status,
        }
    }

    /// Process every non-blank line and wait for all of them
    ///
    /// Exactly one record comes back per non-blank line, whatever happened
    /// while fetching it.
    pub async fn run<S: AsRef<str>>(
        &self,
        lines: &[S],
        cancel: &CancellationToken,
    ) -> Vec<ValuationRecord> {
        let work: Vec<(usize, &str)> = lines
            .iter()
            .map(AsRef::as_ref)
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let concurrency = self.config.concurrency.max(1);
        info!(tasks = work.len(), concurrency, "Dispatching inventory lookups");

        let sink = ResultSink::new();
        let sink_ref = &sink;
        stream::iter(work)
            .for_each_concurrent(concurrency, move |(index, line)| async move {
                self.process(index, line, sink_ref, cancel).await;
            })
            .await;

        sink.into_records(self.config.preserve_order)
    }

    async fn process(
        &self,
        index: usize,
        line: &str,
        sink: &ResultSink,
        cancel: &CancellationToken,
    ) {
        let line = line.trim();
        let record = match extract_identifier(line) {
            Some(steam_id) => {
                let outcome = self.fetcher.fetch(&steam_id, cancel).await;
                if outcome == FetchOutcome::Exhausted {
                    info!(steam_id = %steam_id, "All attempts exhausted");
                }
                self.builder.normalize(&steam_id, &outcome)
            }
            None => {
                self.status
                    .report_status(&format!("Invalid Steam URL format: {}", line));
                self.builder.normalize(line, &FetchOutcome::InvalidInput)
            }
        };

        debug!(index, steam_id = %record.identifier, total = %record.total_value, "Record ready");
        sink.push(index, record).await;
        self.status.advance_progress();
    }
}
