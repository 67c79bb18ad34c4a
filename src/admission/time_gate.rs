//! Time-of-day admission gate.

use chrono::{DateTime, NaiveTime, Utc};
use tracing::debug;

use super::decision::{AdmissionStage, Decision, DenyReason};
use crate::request::Request;

/// Admits requests only while the clock is inside an allowed interval.
///
/// Both bounds are inclusive: a request at exactly the start or end of the
/// interval is admitted. A gate whose start is later than its end spans
/// midnight (22:00–02:00 admits at 23:00 and at 01:00).
#[derive(Debug, Clone)]
pub struct TimeGate {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeGate {
    /// Create a gate for the inclusive interval `[start, end]`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether the gate is open at the given time of day.
    pub fn is_open(&self, time_of_day: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time_of_day && time_of_day <= self.end
        } else {
            // Interval spans midnight.
            time_of_day >= self.start || time_of_day <= self.end
        }
    }
}

impl AdmissionStage for TimeGate {
    fn check(&self, _request: &Request, now: DateTime<Utc>) -> Decision {
        let time_of_day = now.time();
        if self.is_open(time_of_day) {
            Decision::Allow
        } else {
            debug!(start = %self.start, end = %self.end, at = %time_of_day, "time gate closed");
            Decision::Deny(DenyReason::OutsideAllowedHours)
        }
    }
}
