//! Orchestration layer for the Worktime backend.
//!
//! This crate wires the domain services to the persistence layer:
//! - Configuration loading and validation
//! - Logging initialization
//! - The typed error taxonomy
//! - Business services (time tracking, leave workflow, audit recording,
//!   compliance reporting)
//! - Background jobs (audit retention sweep, pool metrics)

pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod services;

pub use config::EngineConfig;
pub use error::EngineError;
