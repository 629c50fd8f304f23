//! Console run report

use crate::crawler::RunStatus;
use crate::output::summary::RunSummary;

/// Prints the per-source record counts and the run outcome to stdout
pub fn print_report(summary: &RunSummary) {
    println!("=== Crawl Report ===\n");

    println!("Records per source:");
    for report in &summary.sources {
        if report.failed_to_start {
            println!("  {}: did not start", report.source);
        } else {
            println!(
                "  {}: {} records ({} of {} keywords failed, {} listings failed)",
                report.source,
                report.records,
                report.keywords_failed,
                report.keywords_attempted,
                report.listings_failed
            );
        }
    }
    println!();

    println!("{}", outcome_line(summary));

    let failed = summary.failed_sources();
    if !failed.is_empty() {
        println!("\nErrors:");
        for report in failed {
            for error in &report.errors {
                println!("  - {}: {}", report.source, error);
            }
        }
    }
}

/// One-line verdict; an empty run reads differently from a partial one
pub fn outcome_line(summary: &RunSummary) -> String {
    match summary.status {
        RunStatus::Empty => format!(
            "No job postings collected from any of {} sources",
            summary.sources.len()
        ),
        RunStatus::PartialFailure => format!(
            "Collected {}; {} of {} sources reported failures",
            postings(summary.total_records),
            summary.failed_sources().len(),
            summary.sources.len()
        ),
        RunStatus::Complete => format!(
            "Collected {} in {} seconds",
            postings(summary.total_records),
            summary.duration_seconds()
        ),
    }
}

fn postings(count: usize) -> String {
    match count {
        1 => "1 job posting".to_string(),
        n => format!("{} job postings", n),
    }
}
