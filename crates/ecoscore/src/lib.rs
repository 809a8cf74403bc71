//! Sustainability scoring for product submissions.
//!
//! Product payloads are validated, scored against normalized GWP, cost and
//! circularity ceilings, and stored with improvement suggestions in an
//! append-only history that feeds the aggregate summary.

pub mod config;
pub mod error;
pub mod products;
pub mod telemetry;
