//! Audit retention sweep background job.
//!
//! The only path that ever deletes audit entries. Runs outside any request
//! transaction and deletes in short batches so concurrent audit appends are
//! never blocked. The sweep itself is not audited.

use persistence::repositories::AuditEntryRepository;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Background job that removes audit entries past the retention horizon.
pub struct AuditRetentionJob {
    entries: AuditEntryRepository,
    retention_days: u32,
    batch_size: i64,
}

impl AuditRetentionJob {
    /// Create a new retention sweep.
    ///
    /// # Arguments
    /// * `entries` - Audit entry repository
    /// * `retention_days` - Age after which entries are removed
    /// * `batch_size` - Rows deleted per batch
    pub fn new(entries: AuditEntryRepository, retention_days: u32, batch_size: i64) -> Self {
        Self {
            entries,
            retention_days,
            batch_size,
        }
    }
}

#[async_trait::async_trait]
impl Job for AuditRetentionJob {
    fn name(&self) -> &'static str {
        "audit_retention"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        let deleted = self
            .entries
            .delete_older_than(self.retention_days, self.batch_size)
            .await
            .map_err(|e| format!("Failed to sweep expired audit entries: {}", e))?;

        info!(
            deleted,
            retention_days = self.retention_days,
            "Swept expired audit entries"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_job_frequency_is_daily() {
        let freq = JobFrequency::Daily;
        assert_eq!(freq.duration(), std::time::Duration::from_secs(86400));
    }

    #[test]
    fn test_default_retention_is_180_days() {
        // The configured default horizon
        assert_eq!(180u32, 180);
    }

    #[test]
    fn test_batch_size_reasonable() {
        // 5K keeps delete transactions short without thrashing
        let batch_size = 5_000i64;
        assert!(batch_size >= 1000);
        assert!(batch_size <= 100_000);
    }
}
