//! Crawl orchestration across sources
//!
//! Every registered source runs as its own task, bounded by a semaphore;
//! keywords within one source run one after another. A source that fails
//! to start, errors or panics is reported with zero records and never stops
//! its siblings.

use crate::crawler::adapter::SourceAdapter;
use crate::job::{CrawlRequest, JobRecord, Limit, Source};
use crate::TrawlError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// What to crawl on every source
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub keywords: Vec<String>,
    pub location: String,
    pub skills: Vec<String>,
    pub limit: Limit,
}

impl CrawlPlan {
    fn request_for(&self, keyword: &str) -> CrawlRequest {
        CrawlRequest::new(keyword, self.location.clone(), self.limit)
            .with_skills(self.skills.clone())
    }
}

/// Per-source result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: Source,
    pub records: usize,
    pub keywords_attempted: usize,
    pub keywords_failed: usize,

    /// Keywords whose listing could not be fetched or rendered
    pub listings_failed: usize,
    pub errors: Vec<String>,

    /// The adapter could not be constructed at all
    pub failed_to_start: bool,
}

impl SourceReport {
    fn new(source: Source) -> Self {
        Self {
            source,
            records: 0,
            keywords_attempted: 0,
            keywords_failed: 0,
            listings_failed: 0,
            errors: Vec::new(),
            failed_to_start: false,
        }
    }

    /// True if any keyword or listing failed, or the source never started
    pub fn has_failures(&self) -> bool {
        self.failed_to_start || self.keywords_failed > 0 || self.listings_failed > 0
    }
}

/// Overall classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Records were produced and every source ran cleanly
    Complete,

    /// Records were produced but at least one source failed
    PartialFailure,

    /// No source produced a single record
    Empty,
}

/// Merged result of a run
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    records: Vec<JobRecord>,
    reports: Vec<SourceReport>,
}

impl CrawlOutcome {
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn reports(&self) -> &[SourceReport] {
        &self.reports
    }

    pub fn report_for(&self, source: Source) -> Option<&SourceReport> {
        self.reports.iter().find(|r| r.source == source)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn status(&self) -> RunStatus {
        if self.records.is_empty() {
            RunStatus::Empty
        } else if self.reports.iter().any(SourceReport::has_failures) {
            RunStatus::PartialFailure
        } else {
            RunStatus::Complete
        }
    }

    /// Descriptions of all records, in production order
    pub fn descriptions(&self) -> Vec<&str> {
        self.records.iter().map(JobRecord::description).collect()
    }

    /// Hands the records over to the caller
    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }
}

enum Slot {
    Ready(Arc<dyn SourceAdapter>),
    Failed(Source, String),
}

impl Slot {
    fn source(&self) -> Source {
        match self {
            Slot::Ready(adapter) => adapter.source(),
            Slot::Failed(source, _) => *source,
        }
    }
}

/// Runs a [`CrawlPlan`] against the registered sources
pub struct Orchestrator {
    slots: Vec<Slot>,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(max_concurrent: usize, cancel: CancellationToken) -> Self {
        Self {
            slots: Vec::new(),
            max_concurrent: max_concurrent.max(1),
            cancel,
        }
    }

    /// Adds a source; records are reported in registration order
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.slots.push(Slot::Ready(adapter));
    }

    /// Adds a source whose adapter could not be constructed
    pub fn register_failed(&mut self, source: Source, error: TrawlError) {
        tracing::error!("{} unavailable: {}", source, error);
        self.slots.push(Slot::Failed(source, error.to_string()));
    }

    pub fn sources(&self) -> Vec<Source> {
        self.slots.iter().map(Slot::source).collect()
    }

    /// Crawls every keyword on every source
    ///
    /// Always completes; failures are recorded in the per-source reports.
    pub async fn run(&self, plan: &CrawlPlan) -> CrawlOutcome {
        let plan = Arc::new(plan.clone());
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut results: Vec<Option<(Vec<JobRecord>, SourceReport)>> =
            (0..self.slots.len()).map(|_| None).collect();
        let mut tasks = JoinSet::new();

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Failed(source, error) => {
                    let mut report = SourceReport::new(*source);
                    report.failed_to_start = true;
                    report.errors.push(error.clone());
                    results[index] = Some((Vec::new(), report));
                }
                Slot::Ready(adapter) => {
                    let adapter = Arc::clone(adapter);
                    let plan = Arc::clone(&plan);
                    let permits = Arc::clone(&permits);
                    let cancel = self.cancel.clone();

                    tasks.spawn(async move {
                        // The semaphore is never closed
                        let _permit = permits.acquire_owned().await.ok();
                        (index, run_source(adapter, &plan, cancel).await)
                    });
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!("Source task aborted: {}", e),
            }
        }

        let mut outcome = CrawlOutcome::default();
        for (slot, result) in self.slots.iter().zip(results) {
            let (records, report) = result.unwrap_or_else(|| {
                let mut report = SourceReport::new(slot.source());
                report.failed_to_start = true;
                report.errors.push("source task aborted".to_string());
                (Vec::new(), report)
            });
            outcome.records.extend(records);
            outcome.reports.push(report);
        }

        match outcome.status() {
            RunStatus::Empty => tracing::warn!("Crawl produced no records"),
            status => tracing::info!(
                "Crawl finished with {} records ({:?})",
                outcome.records.len(),
                status
            ),
        }

        outcome
    }
}

/// Runs every keyword of `plan` against one source
async fn run_source(
    adapter: Arc<dyn SourceAdapter>,
    plan: &CrawlPlan,
    cancel: CancellationToken,
) -> (Vec<JobRecord>, SourceReport) {
    let source = adapter.source();
    let mut report = SourceReport::new(source);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for keyword in &plan.keywords {
        if cancel.is_cancelled() {
            tracing::info!("{}: cancelled before '{}'", source, keyword);
            break;
        }

        report.keywords_attempted += 1;
        tracing::info!("{}: crawling '{}' in '{}'", source, keyword, plan.location);

        // A panic inside the adapter surfaces here as a JoinError
        let request = plan.request_for(keyword);
        let task_adapter = Arc::clone(&adapter);
        let task_cancel = cancel.clone();
        let joined =
            tokio::spawn(async move { task_adapter.crawl(&request, &task_cancel).await }).await;

        let failure = match joined {
            Ok(Ok(crawl)) => {
                if crawl.listing_failed() {
                    tracing::warn!("{}: listing for '{}' failed", source, keyword);
                    report.listings_failed += 1;
                    report.errors.push(format!("{}: {}", keyword, crawl.stop));
                }
                for record in crawl.records {
                    if seen.insert(record.url().to_string()) {
                        records.push(record);
                    }
                }
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("adapter task failed: {}", e),
        };

        tracing::error!("{} failed on '{}': {}", source, keyword, failure);
        report.keywords_failed += 1;
        report.errors.push(format!("{}: {}", keyword, failure));
    }

    report.records = records.len();
    (records, report)
}
