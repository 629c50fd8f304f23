//! Job data model
//!
//! This module defines the values that flow through a crawl:
//!
//! - `Source`: the closed set of listing sites
//! - `CrawlRequest` and `Limit`: the input to one source crawl
//! - `JobRecord`: one extracted posting, immutable once constructed

mod record;
mod request;
mod source;

pub(crate) use record::collapse_whitespace;
pub use record::JobRecord;
pub use request::{CrawlRequest, Limit};
pub use source::Source;
