//! Background jobs.

pub mod audit_retention;
pub mod pool_metrics;
pub mod scheduler;

pub use audit_retention::AuditRetentionJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
