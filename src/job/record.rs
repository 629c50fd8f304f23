use crate::job::Source;
use serde::Serialize;

/// One job posting extracted from a listing site
///
/// A `JobRecord` can only be built through [`JobRecord::new`], which refuses
/// blank required fields, so every value in circulation has a non-empty
/// title, company and description. An unknown location is `None`, never an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    title: String,
    company: String,
    location: Option<String>,
    description: String,
    url: String,
    source: Source,
}

impl JobRecord {
    /// Builds a record from extracted field text
    ///
    /// All text is whitespace-collapsed first. Returns None if title, company
    /// or description is missing or blank.
    pub fn new(
        title: Option<String>,
        company: Option<String>,
        location: Option<String>,
        description: Option<String>,
        url: impl Into<String>,
        source: Source,
    ) -> Option<Self> {
        let title = non_blank(title)?;
        let company = non_blank(company)?;
        let description = non_blank(description)?;

        Some(Self {
            title,
            company,
            location: non_blank(location),
            description,
            url: url.into(),
            source,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The canonical posting URL, unique per source within a run
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> Source {
        self.source
    }
}

/// Collapses runs of whitespace and drops values that end up empty
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| collapse_whitespace(&v))
        .filter(|v| !v.is_empty())
}
