//! Domain layer for the Worktime backend.
//!
//! This crate contains:
//! - Domain models (WorkInterval, LeaveInterval, AuditEntry, compliance types)
//! - Business logic services (aggregation, compliance evaluation, audit building)
//! - Domain error types

pub mod models;
pub mod services;

use thiserror::Error;

/// Errors raised by domain rules, independent of any storage or transport.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid leave status transition from {from} to {to}")]
    InvalidLeaveTransition { from: String, to: String },

    #[error("Rejection requires a rejection reason")]
    MissingRejectionReason,
}
