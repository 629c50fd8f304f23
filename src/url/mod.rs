//! URL handling for job postings
//!
//! Listing pages hand out job links in many shapes: relative paths, links
//! decorated with tracking parameters, links with fragments. Everything that
//! enters a seen-set or a `JobRecord` goes through this module first so the
//! URL can serve as the de-duplication key.

mod canonical;

pub use canonical::{canonical_job_url, resolve_href};

/// Percent-encodes a search term for use in a query string or path segment
///
/// Spaces become `+`, matching what the listing sites emit in their own
/// search forms.
pub fn encode_query_term(term: &str) -> String {
    ::url::form_urlencoded::byte_serialize(term.trim().as_bytes()).collect()
}
