//! Pagination state machine
//!
//! Every source walks its results through the same three states:
//!
//! ```text
//! Start --start()--> HasPage(cursor) --advance()--> HasPage(cursor') ...
//!                                    \--advance()--> Exhausted(reason)
//! ```
//!
//! The adapter reports what the current page produced (`PageOutcome`) and the
//! paginator decides whether there is a next cursor. `Exhausted` is terminal.

use crate::job::Limit;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Position within one source's result listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// Result offset for offset-paged sources
    Offset(u32),

    /// Listing URL for sources that link to their next page
    Link(Url),

    /// Scroll position for infinite-scroll sources
    Scroll { step: u32, height: u64 },
}

/// Why a paginator stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The current page yielded zero job links
    NoLinks,

    /// No next-page marker, or the scroll height stopped growing
    NoMoreResults,

    /// The requested number of records was collected
    LimitReached,

    /// The next cursor would revisit a page, or the page had only seen links
    NoProgress,

    /// The hard page ceiling was reached
    PageCeiling,

    /// The listing page could not be fetched or rendered
    PageFailed,

    /// The crawl was cancelled
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoLinks => "no job links on page",
            Self::NoMoreResults => "no more results",
            Self::LimitReached => "limit reached",
            Self::NoProgress => "no progress",
            Self::PageCeiling => "page ceiling reached",
            Self::PageFailed => "listing page failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorState {
    Start,
    HasPage(PageCursor),
    Exhausted(StopReason),
}

/// What the adapter observed on the current page
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Job links found on the page (after in-page de-duplication)
    pub links_found: usize,

    /// Links not seen earlier in this crawl
    pub new_links: usize,

    /// The "more results" signal: where the next page would be, if anywhere
    pub next: Option<PageCursor>,

    /// Records collected so far in this crawl
    pub collected: usize,
}

/// Per-crawl pagination state
#[derive(Debug)]
pub struct Paginator {
    state: PaginatorState,
    limit: Limit,
    max_pages: u32,
    pages_issued: u32,
    visited_links: HashSet<Url>,
}

impl Paginator {
    /// Creates a paginator for one crawl
    ///
    /// `max_pages` bounds the number of cursors handed out, whatever the limit.
    pub fn new(limit: Limit, max_pages: u32) -> Self {
        Self {
            state: PaginatorState::Start,
            limit,
            max_pages: max_pages.max(1),
            pages_issued: 0,
            visited_links: HashSet::new(),
        }
    }

    pub fn state(&self) -> &PaginatorState {
        &self.state
    }

    /// Number of cursors handed out so far
    pub fn pages_issued(&self) -> u32 {
        self.pages_issued
    }

    /// The reason the paginator stopped, if it has
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state {
            PaginatorState::Exhausted(reason) => Some(reason),
            _ => None,
        }
    }

    /// Moves from `Start` to the first page
    ///
    /// Calling this in any other state returns the current cursor unchanged.
    pub fn start(&mut self, initial: PageCursor) -> Option<&PageCursor> {
        if self.state == PaginatorState::Start {
            self.issue(initial);
        }
        self.current()
    }

    pub fn current(&self) -> Option<&PageCursor> {
        match &self.state {
            PaginatorState::HasPage(cursor) => Some(cursor),
            _ => None,
        }
    }

    /// Decides the next cursor from what the current page produced
    pub fn advance(&mut self, outcome: PageOutcome) -> Option<&PageCursor> {
        let current = match &self.state {
            PaginatorState::HasPage(cursor) => cursor.clone(),
            _ => return None,
        };

        let reason = if self.limit.is_reached(outcome.collected) {
            Some(StopReason::LimitReached)
        } else if outcome.links_found == 0 {
            Some(StopReason::NoLinks)
        } else if outcome.new_links == 0 {
            Some(StopReason::NoProgress)
        } else if self.pages_issued >= self.max_pages {
            Some(StopReason::PageCeiling)
        } else {
            match &outcome.next {
                None => Some(StopReason::NoMoreResults),
                Some(next) if !self.is_progress(&current, next) => Some(StopReason::NoProgress),
                Some(_) => None,
            }
        };

        match (reason, outcome.next) {
            (Some(reason), _) => self.exhaust(reason),
            (None, Some(next)) => self.issue(next),
            (None, None) => self.exhaust(StopReason::NoMoreResults),
        }

        self.current()
    }

    /// Stops the paginator from outside (page failure, cancellation)
    pub fn exhaust(&mut self, reason: StopReason) {
        if !matches!(self.state, PaginatorState::Exhausted(_)) {
            self.state = PaginatorState::Exhausted(reason);
        }
    }

    fn issue(&mut self, cursor: PageCursor) {
        if let PageCursor::Link(url) = &cursor {
            self.visited_links.insert(url.clone());
        }
        self.pages_issued += 1;
        self.state = PaginatorState::HasPage(cursor);
    }

    fn is_progress(&self, current: &PageCursor, next: &PageCursor) -> bool {
        match (current, next) {
            (PageCursor::Offset(a), PageCursor::Offset(b)) => b > a,
            (PageCursor::Link(_), PageCursor::Link(url)) => !self.visited_links.contains(url),
            (PageCursor::Scroll { height: a, .. }, PageCursor::Scroll { height: b, .. }) => b > a,
            _ => false,
        }
    }
}
