//! Work interval aggregation.
//!
//! Turns a set of work intervals into the totals the compliance evaluator
//! and report service consume: total worked seconds, per-calendar-day
//! totals and per-ISO-week totals.
//!
//! Known limitation: an interval spanning midnight is attributed wholly to
//! its start date rather than split across the boundary. Day attribution
//! uses the start timestamp's calendar date in the recording timezone (UTC).

use crate::models::{AggregateResult, ReportPeriod, WorkInterval, WorkWeek};

/// Aggregate completed intervals over a period.
///
/// Only intervals with an end are counted; open intervals are excluded from
/// totals (callers may report them separately as in-progress). Intervals
/// that do not touch the period at all are skipped. Pure and deterministic:
/// no clock access, identical inputs give identical outputs.
pub fn aggregate(intervals: &[WorkInterval], period: &ReportPeriod) -> AggregateResult {
    let mut result = AggregateResult::default();

    for interval in intervals {
        let Some(seconds) = interval.duration_seconds() else {
            continue;
        };
        if !period.overlaps_interval(interval.start_time, interval.end_time) {
            continue;
        }

        result.total_seconds += seconds;

        let day = interval.start_time.date_naive();
        *result.daily_seconds.entry(day).or_insert(0) += seconds;

        let week = WorkWeek::from_datetime(interval.start_time);
        *result.weekly_seconds.entry(week).or_insert(0) += seconds;
    }

    result
}
