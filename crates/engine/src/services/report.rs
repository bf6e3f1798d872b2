//! Compliance report service.
//!
//! Orchestrates the aggregator and evaluator over intervals fetched from
//! the persistence layer, for a single user or the whole active roster.
//! Each report works on its own immutable snapshot of interval data, so
//! concurrent report computations share no mutable state and can be
//! abandoned at any point without side effects.

use chrono::Utc;
use domain::models::{
    ComplianceReport, ComplianceThresholds, ReportPeriod, RosterOutcome, RosterReportEntry,
    WorkInterval,
};
use domain::services::{aggregate, evaluate};
use persistence::repositories::{TimeEntryRepository, UserRepository};
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineError;

/// Assemble a compliance report from an interval snapshot. Pure; exposed
/// for callers that already hold the intervals.
pub fn build_report(
    period: ReportPeriod,
    intervals: &[WorkInterval],
    thresholds: &ComplianceThresholds,
) -> ComplianceReport {
    let aggregate_result = aggregate(intervals, &period);
    let violations = evaluate(intervals, &aggregate_result, thresholds);
    ComplianceReport::from_parts(period, &aggregate_result, violations)
}

/// Service producing compliance reports on demand.
#[derive(Clone)]
pub struct ComplianceReportService {
    entries: TimeEntryRepository,
    users: UserRepository,
    thresholds: ComplianceThresholds,
}

impl ComplianceReportService {
    pub fn new(
        entries: TimeEntryRepository,
        users: UserRepository,
        thresholds: ComplianceThresholds,
    ) -> Self {
        Self {
            entries,
            users,
            thresholds,
        }
    }

    /// Report for a single user. Defaults to the current calendar month
    /// when no period is given.
    pub async fn report_for_user(
        &self,
        user_id: Uuid,
        period: Option<ReportPeriod>,
    ) -> Result<ComplianceReport, EngineError> {
        let period = period.unwrap_or_else(|| ReportPeriod::month_of(Utc::now()));
        let intervals = self.entries.find_by_user_and_period(user_id, &period).await?;
        Ok(build_report(period, &intervals, &self.thresholds))
    }

    /// Report for every active user. A failed interval fetch marks that
    /// user as failed and does not abort the remaining roster.
    pub async fn report_for_roster(
        &self,
        period: Option<ReportPeriod>,
    ) -> Result<Vec<RosterReportEntry>, EngineError> {
        let period = period.unwrap_or_else(|| ReportPeriod::month_of(Utc::now()));
        let users = self.users.find_active().await?;

        let mut roster = Vec::with_capacity(users.len());
        for user in users {
            let outcome = match self.entries.find_by_user_and_period(user.id, &period).await {
                Ok(intervals) => RosterOutcome::Ok {
                    report: build_report(period, &intervals, &self.thresholds),
                },
                Err(error) => {
                    warn!(
                        user_id = %user.id,
                        error = %error,
                        "Skipping user in roster compliance report"
                    );
                    RosterOutcome::Failed {
                        error: error.to_string(),
                    }
                }
            };

            roster.push(RosterReportEntry {
                user_id: user.id,
                email: user.email,
                outcome,
            });
        }

        Ok(roster)
    }
}
