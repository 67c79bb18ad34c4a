//! Admission decisions and the stage abstraction.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::request::Request;

/// Reason a request was refused admission.
///
/// The display string is the human-readable reason the pipeline is expected
/// to surface with its rejection response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The time gate is closed at the request's time of day.
    OutsideAllowedHours,
    /// The client has spent its sliding-window quota.
    RateLimitExceeded,
    /// An unsafe method was attempted without an authenticated user.
    AuthenticationRequired,
    /// The authenticated user's role is not in the allowed set.
    InsufficientRole,
}

impl DenyReason {
    /// Reason string for the client-visible rejection.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::OutsideAllowedHours => "outside allowed hours",
            DenyReason::RateLimitExceeded => "rate limit exceeded",
            DenyReason::AuthenticationRequired => "authentication required",
            DenyReason::InsufficientRole => "insufficient role permissions",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed to business logic.
    Allow,
    /// The request is refused; denial is terminal for this request.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The denial reason, if the request was refused.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// One admission stage.
///
/// A stage is a policy check over the request and the current time, with no
/// side effects beyond its own state. The controller runs stages in order
/// and stops at the first denial; `Allow` means "no objection from this
/// stage", not "skip the rest".
pub trait AdmissionStage: Send + Sync {
    /// Evaluate this stage for `request` at time `now`.
    fn check(&self, request: &Request, now: DateTime<Utc>) -> Decision;
}
