//! Per-source request pacing
//!
//! Each source owns one pacing token: an async mutex around the time of its
//! last request. A caller holds the token while it waits out the remaining
//! delay, so requests to one source are serialized and spaced, while other
//! sources proceed independently.

use crate::job::Source;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Time of the last request to one source
#[derive(Debug, Clone, Default)]
pub struct SourceClock {
    last_request_time: Option<Instant>,
    request_count: u64,
}

impl SourceClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the remaining wait before the next request, or None if a
    /// request can be made now
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < min_delay {
            Some(min_delay - elapsed)
        } else {
            None
        }
    }

    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }
}

/// Minimum spacing between consecutive requests to the same source
#[derive(Debug)]
pub struct PacingPolicy {
    min_delay: Duration,
    clocks: Mutex<HashMap<Source, Arc<tokio::sync::Mutex<SourceClock>>>>,
}

impl PacingPolicy {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            clocks: Mutex::new(HashMap::new()),
        }
    }

    /// A policy that never delays
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    fn clock(&self, source: Source) -> Arc<tokio::sync::Mutex<SourceClock>> {
        let mut clocks = self.clocks.lock().unwrap_or_else(|e| e.into_inner());
        clocks.entry(source).or_default().clone()
    }

    /// Waits until `source` may receive another request, then records it
    ///
    /// Returns false, without recording, if `cancel` fires while waiting.
    pub async fn wait_turn(&self, source: Source, cancel: &CancellationToken) -> bool {
        let clock = self.clock(source);
        let mut clock = clock.lock().await;

        if let Some(wait) = clock.time_until_next_request(self.min_delay, Instant::now()) {
            tracing::trace!("Pacing {} for {:?}", source, wait);
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if cancel.is_cancelled() {
            return false;
        }

        clock.record_request(Instant::now());
        true
    }

    /// Sleeps one delay period so dynamic content can load
    ///
    /// Returns false if `cancel` fires first.
    pub async fn settle(&self, cancel: &CancellationToken) -> bool {
        if self.min_delay.is_zero() {
            return !cancel.is_cancelled();
        }

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.min_delay) => true,
        }
    }

    /// Requests recorded for `source` so far
    pub async fn request_count(&self, source: Source) -> u64 {
        self.clock(source).lock().await.request_count()
    }
}
