//! Run summary data
//!
//! A `RunSummary` is the snapshot of one finished crawl that the console
//! report and the markdown summary are rendered from.

use crate::crawler::{CrawlOutcome, CrawlPlan, RunStatus, SourceReport};
use crate::job::JobRecord;
use chrono::{DateTime, Local};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One collected job as listed in the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLine {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub source: String,
    pub url: String,
}

impl From<&JobRecord> for JobLine {
    fn from(record: &JobRecord) -> Self {
        Self {
            title: record.title().to_string(),
            company: record.company().to_string(),
            location: record.location().map(str::to_string),
            source: record.source().to_string(),
            url: record.url().to_string(),
        }
    }
}

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct RunSummary {
    // Run metadata
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub config_hash: String,
    pub status: RunStatus,

    // What was asked for
    pub keywords: Vec<String>,
    pub location: String,
    pub limit: String,

    // What came back
    pub total_records: usize,
    pub sources: Vec<SourceReport>,
    pub jobs: Vec<JobLine>,
}

impl RunSummary {
    pub fn new(
        outcome: &CrawlOutcome,
        plan: &CrawlPlan,
        config_hash: impl Into<String>,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            config_hash: config_hash.into(),
            status: outcome.status(),
            keywords: plan.keywords.clone(),
            location: plan.location.clone(),
            limit: plan.limit.to_string(),
            total_records: outcome.records().len(),
            sources: outcome.reports().to_vec(),
            jobs: outcome.records().iter().map(JobLine::from).collect(),
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }

    /// Sources that produced no records
    pub fn empty_sources(&self) -> Vec<&SourceReport> {
        self.sources.iter().filter(|s| s.records == 0).collect()
    }

    /// Sources with a failed keyword or listing, or that never started
    pub fn failed_sources(&self) -> Vec<&SourceReport> {
        self.sources.iter().filter(|s| s.has_failures()).collect()
    }
}
