//! Time-bounded accumulation of per-frame detection summaries

use std::time::{Duration, Instant};

/// Rolling window of frame summaries between two flush events.
///
/// Owned exclusively by the loop controller; `try_flush` is a pure function
/// of the injected instant, so the flush logic tests without a real clock.
#[derive(Debug)]
pub struct DetectionWindow {
    interval: Duration,
    started_at: Instant,
    summaries: Vec<String>,
}

impl DetectionWindow {
    /// Create a window whose clock starts now
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Create a window whose clock starts at the given instant
    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            started_at: now,
            summaries: Vec::new(),
        }
    }

    /// Append one frame summary in arrival order
    pub fn push(&mut self, summary: String) {
        self.summaries.push(summary);
    }

    /// Check the window clock and flush if the interval has elapsed.
    ///
    /// Once elapsed, the clock resets to `now` whether or not anything was
    /// collected, keeping window starts anchored to flush instants across
    /// idle periods. Text comes back only for a non-empty buffer: an empty
    /// window carries no information worth reasoning about, so the caller
    /// must skip the reasoner entirely.
    pub fn try_flush(&mut self, now: Instant) -> Option<String> {
        if now.duration_since(self.started_at) <= self.interval {
            return None;
        }

        self.started_at = now;
        if self.summaries.is_empty() {
            return None;
        }

        let text = self.summaries.join(" ");
        self.summaries.clear();
        Some(text)
    }

    /// Number of summaries collected so far in the current window
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Instant the current window started at
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}
