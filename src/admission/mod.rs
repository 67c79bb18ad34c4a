//! Admission stages and the controller that composes them.

mod controller;
mod decision;
mod role_gate;
mod routes;
mod time_gate;

pub use controller::AdmissionController;
pub use decision::{AdmissionStage, Decision, DenyReason};
pub use role_gate::RoleGate;
pub use routes::RouteMatcher;
pub use time_gate::TimeGate;
