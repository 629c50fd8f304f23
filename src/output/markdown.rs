//! Markdown summary generation
//!
//! This module renders a [`RunSummary`] as a human-readable markdown report
//! and writes it into a timestamped run directory.

use crate::crawler::RunStatus;
use crate::output::summary::{OutputError, OutputResult, RunSummary};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the summary file inside a run directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Jobs listed in the summary before the rest are elided
const MAX_LISTED_JOBS: usize = 100;

/// Directory for the run started at `started_at`, under `data_dir`
pub fn run_directory(data_dir: &Path, started_at: &DateTime<Local>) -> PathBuf {
    data_dir.join(started_at.format("%Y%m%d_%H%M%S").to_string())
}

/// Writes `summary.md` into the run's directory, creating it if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written summary
/// * `Err(OutputError)` - Failed to create the directory or write the file
pub fn generate_markdown_summary(summary: &RunSummary, data_dir: &Path) -> OutputResult<PathBuf> {
    let dir = run_directory(data_dir, &summary.started_at);
    fs::create_dir_all(&dir)
        .map_err(|e| OutputError::Write(format!("{}: {}", dir.display(), e)))?;

    let path = dir.join(SUMMARY_FILE);
    let mut file = File::create(&path)
        .map_err(|e| OutputError::Write(format!("{}: {}", path.display(), e)))?;
    file.write_all(format_markdown_summary(summary).as_bytes())?;

    Ok(path)
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Job-Trawl Run Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!("- **Status**: {}\n", status_label(summary.status)));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Search
    md.push_str("## Search\n\n");
    md.push_str(&format!("- **Keywords**: {}\n", summary.keywords.join(", ")));
    md.push_str(&format!("- **Location**: {}\n", summary.location));
    md.push_str(&format!(
        "- **Limit per source and keyword**: {}\n\n",
        summary.limit
    ));

    // Per-source breakdown
    md.push_str("## Records per Source\n\n");
    md.push_str("| Source | Records | Keywords | Failed | Listings Failed |\n");
    md.push_str("|--------|---------|----------|--------|-----------------|\n");
    for report in &summary.sources {
        let failed = if report.failed_to_start {
            "did not start".to_string()
        } else {
            report.keywords_failed.to_string()
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            report.source,
            report.records,
            report.keywords_attempted,
            failed,
            report.listings_failed
        ));
    }
    md.push_str(&format!("| **Total** | {} | | | |\n\n", summary.total_records));

    let failed = summary.failed_sources();
    if !failed.is_empty() {
        md.push_str("## Errors\n\n");
        for report in failed {
            for error in &report.errors {
                md.push_str(&format!("- **{}**: {}\n", report.source, error));
            }
        }
        md.push('\n');
    }

    if summary.jobs.is_empty() {
        md.push_str("No job postings were collected.\n");
        return md;
    }

    md.push_str("## Jobs\n\n");
    md.push_str("| Title | Company | Location | Source |\n");
    md.push_str("|-------|---------|----------|--------|\n");
    for job in summary.jobs.iter().take(MAX_LISTED_JOBS) {
        md.push_str(&format!(
            "| [{}]({}) | {} | {} | {} |\n",
            escape_cell(&job.title),
            job.url,
            escape_cell(&job.company),
            escape_cell(job.location.as_deref().unwrap_or("-")),
            job.source
        ));
    }
    if summary.jobs.len() > MAX_LISTED_JOBS {
        md.push_str(&format!(
            "\n... and {} more\n",
            summary.jobs.len() - MAX_LISTED_JOBS
        ));
    }

    md
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Complete => "complete",
        RunStatus::PartialFailure => "partial failure",
        RunStatus::Empty => "empty",
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
