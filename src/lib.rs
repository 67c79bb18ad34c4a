//! Gatehouse - Request Admission Control
//!
//! This crate implements an admission controller that sits in front of a
//! request-handling pipeline and decides, before business logic runs,
//! whether each request may proceed. Admission is the composition of
//! explicit stages: an optional time-of-day gate, an optional role gate for
//! unsafe methods, and a per-client sliding-window rate limiter. All state
//! lives in process memory and every check is synchronous.

pub mod admission;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod request;
