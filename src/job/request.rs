use crate::ConfigError;
use std::fmt;
use std::num::NonZeroUsize;

/// Maximum number of records a single source crawl may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Stop after this many records
    Bounded(NonZeroUsize),

    /// Crawl until the listing is exhausted (or the page ceiling is hit)
    Unbounded,
}

impl Limit {
    /// Sentinel used in configuration for an unbounded limit
    pub const UNBOUNDED_SENTINEL: i64 = -1;

    /// Parses the configuration form of a limit
    ///
    /// `-1` means unbounded, positive values are bounded. Zero and any other
    /// negative value are rejected.
    pub fn from_config(value: i64) -> Result<Self, ConfigError> {
        if value == Self::UNBOUNDED_SENTINEL {
            return Ok(Self::Unbounded);
        }

        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Bounded)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "max_jobs_per_site must be -1 (unbounded) or >= 1, got {}",
                    value
                ))
            })
    }

    /// Builds a bounded limit; None for zero
    pub fn bounded(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self::Bounded)
    }

    /// Returns true once `collected` records satisfy this limit
    pub fn is_reached(&self, collected: usize) -> bool {
        match self {
            Self::Bounded(n) => collected >= n.get(),
            Self::Unbounded => false,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{}", n),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Input to one source crawl: a single keyword against a single location
///
/// Built once per (source, keyword) pair by the orchestrator and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub keyword: String,
    pub location: String,
    pub limit: Limit,
    /// Carried for adapters that want it for query construction; not used
    /// for filtering
    pub skills: Vec<String>,
}

impl CrawlRequest {
    pub fn new(keyword: impl Into<String>, location: impl Into<String>, limit: Limit) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
            limit,
            skills: Vec::new(),
        }
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }
}
