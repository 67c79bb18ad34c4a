//! Sliding-window record keeping for a single client.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};

/// Timestamps of admitted requests for one client, oldest first.
///
/// Records are purged lazily on each access, never swept proactively. The
/// retained set always satisfies `now - timestamp < window`: a record
/// exactly `window` old is already expired.
#[derive(Debug, Default)]
pub struct SlidingWindow {
    records: VecDeque<DateTime<Utc>>,
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit one attempt at `now` if fewer than `limit` records remain in
    /// the window, recording it on success. A denied attempt is never
    /// recorded and leaves the window untouched.
    pub fn try_admit(&mut self, now: DateTime<Utc>, limit: usize, window: TimeDelta) -> bool {
        // The purge below relies on records being time-ordered. If the
        // caller's clock ran backwards the invariant is gone; reset the
        // window rather than reason about a corrupted sequence.
        if self.records.back().is_some_and(|newest| *newest > now) {
            self.records.clear();
        }

        self.purge_expired(now, window);

        if self.records.len() >= limit {
            return false;
        }

        self.records.push_back(now);
        true
    }

    /// Drop records that have aged out of the window, oldest first,
    /// stopping at the first record still inside it.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, window: TimeDelta) {
        while let Some(oldest) = self.records.front() {
            if now - *oldest >= window {
                self.records.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of records in the window as of the last purge.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the window holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
