//! Shared utilities and common types for the Worktime backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Validation of time intervals, report periods and leave date ranges

pub mod validation;
