//! Keyed sliding-window rate limiter.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::identity::ClientKey;
use super::window::SlidingWindow;
use crate::admission::{AdmissionStage, Decision, DenyReason};
use crate::config::RateLimitConfig;
use crate::request::Request;

/// Admission checks between idle-client sweep attempts.
const SWEEP_INTERVAL: u64 = 1000;

/// Sliding-window rate limiter keyed by client identity.
///
/// Windows live in a sharded map. The purge-check-append sequence for one
/// key runs while holding that key's shard guard, so two concurrent
/// requests cannot both take the last slot of a nearly full window.
///
/// Windows are created lazily on a client's first request and normally live
/// for the lifetime of the limiter; once the map outgrows the configured
/// client bound, fully expired windows are dropped by an opportunistic
/// sweep (see [`Self::check_and_record`]).
pub struct SlidingWindowLimiter {
    /// Maximum admitted records per window
    limit: usize,
    /// Sliding window length
    window: TimeDelta,
    /// Tracked-client count that arms the sweep
    max_tracked_clients: usize,
    /// Per-client windows
    windows: DashMap<ClientKey, SlidingWindow>,
    /// Total admission checks, used to pace the sweep
    checks: AtomicU64,
    /// Keeps concurrent callers from running the sweep at the same time
    sweep_gate: Mutex<()>,
}

impl SlidingWindowLimiter {
    /// Create a limiter from rate limit settings.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limit: config.limit,
            window: TimeDelta::seconds(config.window_seconds as i64),
            max_tracked_clients: config.max_tracked_clients,
            windows: DashMap::new(),
            checks: AtomicU64::new(0),
            sweep_gate: Mutex::new(()),
        }
    }

    /// Record an attempt by `client` at `now`, admitting it if quota
    /// remains in the client's window.
    pub fn check_and_record(&self, client: &ClientKey, now: DateTime<Utc>) -> bool {
        let admitted = {
            // The entry guard is the critical section: purge, check and
            // append happen under the key's shard lock.
            let mut window = self.windows.entry(client.clone()).or_default();
            window.try_admit(now, self.limit, self.window)
        };

        if admitted {
            trace!(client = %client, "request within rate limit");
        } else {
            debug!(client = %client, limit = self.limit, "rate limit exceeded");
        }

        self.maybe_sweep(now);
        admitted
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Records currently held for `client`, or `None` if the client has no
    /// window yet.
    pub fn client_record_count(&self, client: &ClientKey) -> Option<usize> {
        self.windows.get(client).map(|w| w.len())
    }

    /// Drop all tracked windows.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.windows.clear();
    }

    /// Every `SWEEP_INTERVAL` checks, drop clients whose windows have
    /// fully expired — but only once the map holds more than the
    /// configured client bound. Clients with live records are never
    /// evicted, so the sweep cannot change an admission outcome.
    fn maybe_sweep(&self, now: DateTime<Utc>) {
        let checks = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if checks % SWEEP_INTERVAL != 0 {
            return;
        }
        if self.windows.len() <= self.max_tracked_clients {
            return;
        }

        // try_lock: a sweep already in flight covers this caller too.
        if let Some(_guard) = self.sweep_gate.try_lock() {
            let before = self.windows.len();
            let window = self.window;
            self.windows.retain(|_, records| {
                records.purge_expired(now, window);
                !records.is_empty()
            });
            debug!(
                before,
                after = self.windows.len(),
                "swept idle client windows"
            );
        }
    }
}

impl AdmissionStage for SlidingWindowLimiter {
    fn check(&self, request: &Request, now: DateTime<Utc>) -> Decision {
        let client = ClientKey::from_request(request);
        if self.check_and_record(&client, now) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::RateLimitExceeded)
        }
    }
}
