//! Role-based admission gate for unsafe methods.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::decision::{AdmissionStage, Decision, DenyReason};
use crate::request::{Request, Role};

/// Denies state-changing requests from callers without a sufficient role.
///
/// Safe methods (GET, HEAD, OPTIONS) pass through untouched. Unsafe
/// methods require an authenticated user whose role is in the allowed set.
#[derive(Debug, Clone)]
pub struct RoleGate {
    allowed_roles: Vec<Role>,
}

impl RoleGate {
    /// Create a gate admitting the given roles.
    pub fn new(allowed_roles: Vec<Role>) -> Self {
        Self { allowed_roles }
    }
}

impl AdmissionStage for RoleGate {
    fn check(&self, request: &Request, _now: DateTime<Utc>) -> Decision {
        if !request.method.is_unsafe() {
            return Decision::Allow;
        }

        match &request.user {
            None => {
                debug!(method = %request.method, path = %request.path, "unauthenticated unsafe request");
                Decision::Deny(DenyReason::AuthenticationRequired)
            }
            Some(user) if self.allowed_roles.contains(&user.role) => Decision::Allow,
            Some(user) => {
                debug!(user = %user.username, role = ?user.role, "role not permitted");
                Decision::Deny(DenyReason::InsufficientRole)
            }
        }
    }
}
