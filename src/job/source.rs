use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a job-listing site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Offset-paged HTTP search results
    Indeed,

    /// HTTP search results linked by a "next" control
    Glassdoor,

    /// Infinite-scroll results rendered by a browser
    LinkedIn,
}

impl Source {
    /// Returns the lowercase identifier used in configuration and output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indeed => "indeed",
            Self::Glassdoor => "glassdoor",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Returns all supported sources
    pub fn all() -> [Self; 3] {
        [Self::Indeed, Self::Glassdoor, Self::LinkedIn]
    }

    /// Returns true if this source needs a rendered browser session
    pub fn needs_browser(&self) -> bool {
        matches!(self, Self::LinkedIn)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indeed" => Ok(Self::Indeed),
            "glassdoor" => Ok(Self::Glassdoor),
            "linkedin" => Ok(Self::LinkedIn),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}
