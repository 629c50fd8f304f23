//! Output module for run reports
//!
//! This module handles:
//! - Summarizing a finished crawl
//! - Printing the per-source report to the console
//! - Writing the markdown run summary

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary, run_directory, SUMMARY_FILE};
pub use stats::{outcome_line, print_report};
pub use summary::{JobLine, OutputError, OutputResult, RunSummary};
