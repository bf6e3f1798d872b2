//! Compliance domain models.
//!
//! Types shared by the aggregator, the evaluator and the report service:
//! report periods, ISO week keys, thresholds and the externally consumed
//! compliance report.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidationError;

/// A reporting window over timestamped intervals. Both bounds are inclusive
/// instants; callers construct the end bound at end-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Build a period, rejecting `end < start`. Malformed bounds are an
    /// error, never clamped.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        shared::validation::validate_period(start, end)?;
        Ok(Self { start, end })
    }

    /// The default reporting window: first through last calendar day of the
    /// month containing `at`, with the end bound at 23:59:59.
    pub fn month_of(at: DateTime<Utc>) -> Self {
        let first = at
            .date_naive()
            .with_day(1)
            .expect("day 1 exists in every month");
        let first_of_next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        }
        .expect("first of month is always valid");
        let last = first_of_next
            .checked_sub_days(Days::new(1))
            .expect("month has at least one day");

        let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap());
        let end = Utc.from_utc_datetime(&last.and_hms_opt(23, 59, 59).unwrap());
        Self { start, end }
    }

    /// Whether an interval with the given bounds touches this period.
    pub fn overlaps_interval(
        &self,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> bool {
        let interval_end = end_time.unwrap_or(start_time);
        start_time <= self.end && interval_end >= self.start
    }
}

/// ISO-8601 week key. Year and week are kept jointly because ISO week 1 of
/// a year may contain days of the prior calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkWeek {
    pub iso_year: i32,
    pub week: u32,
}

impl WorkWeek {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let iso = at.iso_week();
        Self {
            iso_year: iso.year(),
            week: iso.week(),
        }
    }
}

impl std::fmt::Display for WorkWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-W{:02}", self.iso_year, self.week)
    }
}

impl FromStr for WorkWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, week) = s
            .split_once("-W")
            .ok_or_else(|| format!("Invalid ISO week key: {}", s))?;
        let iso_year = year
            .parse::<i32>()
            .map_err(|_| format!("Invalid ISO week year: {}", s))?;
        let week = week
            .parse::<u32>()
            .map_err(|_| format!("Invalid ISO week number: {}", s))?;
        if !(1..=53).contains(&week) {
            return Err(format!("ISO week number out of range: {}", s));
        }
        Ok(Self { iso_year, week })
    }
}

// Serialized as the "YYYY-Www" string so WorkWeek can key JSON maps.
impl Serialize for WorkWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorkWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Regulatory thresholds. Explicit configuration passed into every
/// evaluation; callers may override per jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComplianceThresholds {
    pub max_weekly_hours: f64,
    pub min_daily_rest_hours: f64,
}

impl Default for ComplianceThresholds {
    /// EU Working Time Directive defaults.
    fn default() -> Self {
        Self {
            max_weekly_hours: 48.0,
            min_daily_rest_hours: 11.0,
        }
    }
}

/// Totals produced by the aggregator. Accumulation happens in whole
/// seconds; hours are derived once on read so repeated float additions
/// cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub total_seconds: i64,
    pub daily_seconds: BTreeMap<NaiveDate, i64>,
    pub weekly_seconds: BTreeMap<WorkWeek, i64>,
}

impl AggregateResult {
    pub fn total_hours(&self) -> f64 {
        self.total_seconds as f64 / 3600.0
    }

    pub fn daily_hours(&self) -> BTreeMap<NaiveDate, f64> {
        self.daily_seconds
            .iter()
            .map(|(day, secs)| (*day, *secs as f64 / 3600.0))
            .collect()
    }

    pub fn weekly_hours(&self) -> BTreeMap<WorkWeek, f64> {
        self.weekly_seconds
            .iter()
            .map(|(week, secs)| (*week, *secs as f64 / 3600.0))
            .collect()
    }
}

/// Violations found by the compliance evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ViolationReport {
    pub rest_violations: u32,
    pub weekly_violations: u32,
    /// The ISO weeks that exceeded the weekly maximum, kept for reporting.
    pub violating_weeks: BTreeSet<WorkWeek>,
}

/// The externally consumed compliance report for one user and period.
/// Computed on demand from work intervals; never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ComplianceReport {
    pub period: ReportPeriod,
    pub total_hours: f64,
    pub daily_hours: BTreeMap<NaiveDate, f64>,
    pub weekly_hours: BTreeMap<WorkWeek, f64>,
    pub rest_violations: u32,
    pub weekly_violations: u32,
    pub violating_weeks: BTreeSet<WorkWeek>,
    pub is_compliant: bool,
}

impl ComplianceReport {
    /// Assemble the report from aggregator and evaluator output.
    pub fn from_parts(
        period: ReportPeriod,
        aggregate: &AggregateResult,
        violations: ViolationReport,
    ) -> Self {
        let is_compliant = violations.rest_violations == 0 && violations.weekly_violations == 0;
        Self {
            period,
            total_hours: aggregate.total_hours(),
            daily_hours: aggregate.daily_hours(),
            weekly_hours: aggregate.weekly_hours(),
            rest_violations: violations.rest_violations,
            weekly_violations: violations.weekly_violations,
            violating_weeks: violations.violating_weeks,
            is_compliant,
        }
    }
}

/// Per-user outcome within a roster report. A failed user does not abort
/// the rest of the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RosterOutcome {
    Ok { report: ComplianceReport },
    Failed { error: String },
}

/// One roster row: the user plus their report or failure marker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RosterReportEntry {
    pub user_id: Uuid,
    pub email: String,
    #[serde(flatten)]
    pub outcome: RosterOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_rejects_reversed_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(ReportPeriod::new(start, end).is_err());
        assert!(ReportPeriod::new(end, start).is_ok());
    }

    #[test]
    fn test_month_of_regular_month() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        let period = ReportPeriod::month_of(at);
        assert_eq!(
            period.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            period.end,
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_month_of_december_wraps_year() {
        let at = Utc.with_ymd_and_hms(2023, 12, 5, 8, 0, 0).unwrap();
        let period = ReportPeriod::month_of(at);
        assert_eq!(
            period.start,
            Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            period.end,
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_month_of_february_leap_year() {
        let at = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let period = ReportPeriod::month_of(at);
        assert_eq!(
            period.end,
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_overlaps_interval() {
        let period = ReportPeriod::month_of(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        // Interval fully inside
        assert!(period.overlaps_interval(
            Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 4, 16, 0, 0).unwrap()),
        ));
        // Open interval starting inside
        assert!(
            period.overlaps_interval(Utc.with_ymd_and_hms(2024, 3, 30, 8, 0, 0).unwrap(), None)
        );
        // Interval entirely in the prior month
        assert!(!period.overlaps_interval(
            Utc.with_ymd_and_hms(2024, 2, 27, 8, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 2, 27, 16, 0, 0).unwrap()),
        ));
        // Interval straddling the period start
        assert!(period.overlaps_interval(
            Utc.with_ymd_and_hms(2024, 2, 29, 22, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()),
        ));
    }

    #[test]
    fn test_work_week_joint_key_across_year_boundary() {
        // 2024-12-30 (Monday) belongs to ISO week 1 of 2025
        let at = Utc.with_ymd_and_hms(2024, 12, 30, 9, 0, 0).unwrap();
        let week = WorkWeek::from_datetime(at);
        assert_eq!(
            week,
            WorkWeek {
                iso_year: 2025,
                week: 1
            }
        );
    }

    #[test]
    fn test_work_week_display_roundtrip() {
        let week = WorkWeek {
            iso_year: 2024,
            week: 9,
        };
        assert_eq!(week.to_string(), "2024-W09");
        assert_eq!("2024-W09".parse::<WorkWeek>().unwrap(), week);
        assert!("2024-W54".parse::<WorkWeek>().is_err());
        assert!("2024".parse::<WorkWeek>().is_err());
    }

    #[test]
    fn test_work_week_serializes_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(
            WorkWeek {
                iso_year: 2024,
                week: 10,
            },
            40.0f64,
        );
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-W10":40.0}"#);
    }

    #[test]
    fn test_default_thresholds_are_directive_values() {
        let thresholds = ComplianceThresholds::default();
        assert_eq!(thresholds.max_weekly_hours, 48.0);
        assert_eq!(thresholds.min_daily_rest_hours, 11.0);
    }

    #[test]
    fn test_aggregate_result_hours_derivation() {
        let mut result = AggregateResult::default();
        result.total_seconds = 5400;
        result
            .daily_seconds
            .insert(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 5400);
        assert_eq!(result.total_hours(), 1.5);
        assert_eq!(
            result.daily_hours()[&NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()],
            1.5
        );
    }

    #[test]
    fn test_report_compliance_flag() {
        let period = ReportPeriod::month_of(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let aggregate = AggregateResult::default();

        let clean = ComplianceReport::from_parts(period, &aggregate, ViolationReport::default());
        assert!(clean.is_compliant);

        let dirty = ComplianceReport::from_parts(
            period,
            &aggregate,
            ViolationReport {
                rest_violations: 1,
                weekly_violations: 0,
                violating_weeks: BTreeSet::new(),
            },
        );
        assert!(!dirty.is_compliant);
    }
}
