//! The admission controller: route scoping plus ordered stages.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::decision::{AdmissionStage, Decision};
use super::role_gate::RoleGate;
use super::routes::RouteMatcher;
use super::time_gate::TimeGate;
use crate::config::AdmissionConfig;
use crate::ratelimit::SlidingWindowLimiter;
use crate::request::Request;

/// Gate in front of a request-handling pipeline.
///
/// Requests on configured routes pass through the admission stages in
/// order — time gate, role gate, rate limiter, then any caller-appended
/// stages — and the first denial wins, so a request refused by an early
/// gate never consumes rate-limit quota. Requests outside the configured
/// routes are admitted unconditionally.
///
/// The controller is constructed from configuration and injected into the
/// pipeline by the caller; it holds all of its state and can be shared
/// across workers behind an `Arc`. Admission never fails: the only
/// outcomes are [`Decision::Allow`] and [`Decision::Deny`].
pub struct AdmissionController {
    routes: RouteMatcher,
    stages: Vec<Arc<dyn AdmissionStage>>,
}

impl AdmissionController {
    /// Build a controller from configuration.
    pub fn new(config: AdmissionConfig) -> Self {
        let mut stages: Vec<Arc<dyn AdmissionStage>> = Vec::new();

        if let Some(gate) = &config.time_gate {
            stages.push(Arc::new(TimeGate::new(gate.start, gate.end)));
        }
        if let Some(gate) = &config.role_gate {
            stages.push(Arc::new(RoleGate::new(gate.allowed_roles.clone())));
        }
        stages.push(Arc::new(SlidingWindowLimiter::new(&config.rate_limit)));

        Self {
            routes: RouteMatcher::new(config.routes.methods, config.routes.path_prefixes),
            stages,
        }
    }

    /// Append a caller-provided stage, evaluated after the built-in ones.
    pub fn push_stage(&mut self, stage: Arc<dyn AdmissionStage>) {
        self.stages.push(stage);
    }

    /// Decide whether `request` may proceed, evaluated at time `now`.
    pub fn admit(&self, request: &Request, now: DateTime<Utc>) -> Decision {
        if !self.routes.matches(request.method, &request.path) {
            trace!(method = %request.method, path = %request.path, "route exempt from admission control");
            return Decision::Allow;
        }

        for stage in &self.stages {
            if let Decision::Deny(reason) = stage.check(request, now) {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    reason = %reason,
                    "request denied"
                );
                return Decision::Deny(reason);
            }
        }

        trace!(method = %request.method, path = %request.path, "request admitted");
        Decision::Allow
    }

    /// Decide using the system clock.
    pub fn admit_now(&self, request: &Request) -> Decision {
        self.admit(request, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    use super::super::decision::DenyReason;
    use crate::config::{RoleGateConfig, TimeGateConfig};
    use crate::request::{Method, Role};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    fn gated_config() -> AdmissionConfig {
        let mut config = AdmissionConfig::default();
        config.time_gate = Some(TimeGateConfig {
            start: chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end: chrono::NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        });
        config
    }

    fn message_post(peer: &str) -> Request {
        Request::new(Method::Post, "/api/messages/1").with_peer_addr(peer.parse().unwrap())
    }

    #[test]
    fn test_exempt_route_is_always_allowed() {
        let controller = AdmissionController::new(AdmissionConfig::default());
        let request = message_post("10.0.0.1");

        // Exhaust the client's quota on a matching route.
        for _ in 0..5 {
            assert!(controller.admit(&request, at(19, 0, 0)).is_allowed());
        }
        assert_eq!(
            controller.admit(&request, at(19, 0, 0)),
            Decision::Deny(DenyReason::RateLimitExceeded)
        );

        // A non-matching path from the same client sails through.
        let exempt = Request::new(Method::Post, "/health")
            .with_peer_addr("10.0.0.1".parse().unwrap());
        assert!(controller.admit(&exempt, at(19, 0, 0)).is_allowed());

        // So does a safe method on a matching path.
        let get = Request::new(Method::Get, "/api/messages/1")
            .with_peer_addr("10.0.0.1".parse().unwrap());
        assert!(controller.admit(&get, at(19, 0, 0)).is_allowed());
    }

    #[test]
    fn test_time_gate_precedes_rate_counting() {
        let controller = AdmissionController::new(gated_config());
        let request = message_post("10.0.0.1");

        // Denied before opening, with zero prior requests.
        assert_eq!(
            controller.admit(&request, at(17, 59, 59)),
            Decision::Deny(DenyReason::OutsideAllowedHours)
        );

        // Gate-denied attempts consumed no quota: the full window is
        // still available at opening time.
        for i in 0..5 {
            assert!(
                controller
                    .admit(&request, at(18, 0, 0) + TimeDelta::seconds(i))
                    .is_allowed()
            );
        }
        assert_eq!(
            controller.admit(&request, at(18, 0, 10)),
            Decision::Deny(DenyReason::RateLimitExceeded)
        );
    }

    #[test]
    fn test_time_gate_boundaries() {
        let controller = AdmissionController::new(gated_config());
        let request = message_post("10.0.0.1");

        assert!(controller.admit(&request, at(18, 0, 0)).is_allowed());
        assert!(controller.admit(&request, at(21, 0, 0)).is_allowed());
        assert_eq!(
            controller.admit(&request, at(21, 0, 1)),
            Decision::Deny(DenyReason::OutsideAllowedHours)
        );
    }

    #[test]
    fn test_sliding_window_scenario() {
        let controller = AdmissionController::new(AdmissionConfig::default());
        let request = message_post("203.0.113.7");
        let base = at(19, 0, 0);

        for i in 0..5 {
            assert!(
                controller
                    .admit(&request, base + TimeDelta::seconds(i * 10))
                    .is_allowed(),
                "request {}",
                i + 1
            );
        }
        assert_eq!(
            controller.admit(&request, base + TimeDelta::seconds(45)),
            Decision::Deny(DenyReason::RateLimitExceeded)
        );
        assert!(
            controller
                .admit(&request, base + TimeDelta::seconds(61))
                .is_allowed()
        );
    }

    #[test]
    fn test_forwarded_clients_are_bucketed_separately_from_peer() {
        let controller = AdmissionController::new(AdmissionConfig::default());
        let now = at(19, 0, 0);

        // Two clients behind the same proxy peer address.
        let first = message_post("10.0.0.1").with_forwarded_for("203.0.113.7");
        let second = message_post("10.0.0.1").with_forwarded_for("198.51.100.4");

        for _ in 0..5 {
            assert!(controller.admit(&first, now).is_allowed());
        }
        assert!(!controller.admit(&first, now).is_allowed());
        assert!(controller.admit(&second, now).is_allowed());
    }

    #[test]
    fn test_role_gate_runs_before_rate_limiter() {
        let mut config = AdmissionConfig::default();
        config.role_gate = Some(RoleGateConfig::default());
        let controller = AdmissionController::new(config);
        let now = at(19, 0, 0);

        let anonymous = message_post("10.0.0.1");
        assert_eq!(
            controller.admit(&anonymous, now),
            Decision::Deny(DenyReason::AuthenticationRequired)
        );

        let user = message_post("10.0.0.1").with_user("bob", Role::User);
        assert_eq!(
            controller.admit(&user, now),
            Decision::Deny(DenyReason::InsufficientRole)
        );

        // Role-denied attempts consumed no quota.
        let admin = message_post("10.0.0.1").with_user("alice", Role::Admin);
        for _ in 0..5 {
            assert!(controller.admit(&admin, now).is_allowed());
        }
        assert!(!controller.admit(&admin, now).is_allowed());
    }

    #[test]
    fn test_caller_appended_stage_is_evaluated() {
        struct DenyAll;

        impl AdmissionStage for DenyAll {
            fn check(&self, _request: &Request, _now: DateTime<Utc>) -> Decision {
                Decision::Deny(DenyReason::InsufficientRole)
            }
        }

        let mut controller = AdmissionController::new(AdmissionConfig::default());
        controller.push_stage(Arc::new(DenyAll));

        let request = message_post("10.0.0.1");
        assert_eq!(
            controller.admit(&request, at(19, 0, 0)),
            Decision::Deny(DenyReason::InsufficientRole)
        );

        // Exempt routes still bypass every stage, including appended ones.
        let exempt = Request::new(Method::Get, "/health");
        assert!(controller.admit(&exempt, at(19, 0, 0)).is_allowed());
    }

    #[test]
    fn test_request_with_no_identity_uses_shared_bucket() {
        let controller = AdmissionController::new(AdmissionConfig::default());
        let now = at(19, 0, 0);
        let request = Request::new(Method::Post, "/chats/1");

        for _ in 0..5 {
            assert!(controller.admit(&request, now).is_allowed());
        }
        // A different identity-less request shares the anonymous bucket.
        let other = Request::new(Method::Post, "/chats/2");
        assert!(!controller.admit(&other, now).is_allowed());
    }
}
