//! Working-time compliance evaluation.
//!
//! Applies the two regulatory rules to aggregated interval data:
//! a minimum rest period between shifts on different calendar days, and a
//! maximum of worked hours per ISO week. Thresholds are caller-supplied
//! configuration, not constants.
//!
//! Same-date gaps are exempt from the rest rule by policy: a split shift
//! with a short midday break is not a rest-period violation.

use crate::models::{AggregateResult, ComplianceThresholds, ViolationReport, WorkInterval};

/// Evaluate the rest-period and weekly-hour rules.
///
/// Pure function over its inputs: no clock, no side effects. Open intervals
/// never participate (they are excluded from the aggregate upstream and
/// skipped in the rest scan here).
pub fn evaluate(
    intervals: &[WorkInterval],
    aggregate: &AggregateResult,
    thresholds: &ComplianceThresholds,
) -> ViolationReport {
    let mut report = ViolationReport::default();

    report.rest_violations = count_rest_violations(intervals, thresholds.min_daily_rest_hours);

    for (week, &seconds) in &aggregate.weekly_seconds {
        if seconds as f64 / 3600.0 > thresholds.max_weekly_hours {
            report.violating_weeks.insert(*week);
        }
    }
    report.weekly_violations = report.violating_weeks.len() as u32;

    report
}

/// Count adjacent completed-interval pairs whose gap crosses a calendar
/// date boundary and falls short of the minimum rest.
fn count_rest_violations(intervals: &[WorkInterval], min_rest_hours: f64) -> u32 {
    let mut completed: Vec<&WorkInterval> =
        intervals.iter().filter(|iv| iv.is_completed()).collect();
    completed.sort_by_key(|iv| iv.start_time);

    let min_rest_seconds = (min_rest_hours * 3600.0) as i64;
    let mut violations = 0;

    for pair in completed.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let end = current.end_time.expect("filtered to completed intervals");

        // Pairs on the same calendar date are exempt regardless of gap size
        if end.date_naive() == next.start_time.date_naive() {
            continue;
        }

        let gap_seconds = (next.start_time - end).num_seconds();
        if gap_seconds < min_rest_seconds {
            violations += 1;
        }
    }

    violations
}
