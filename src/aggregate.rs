//! Pure reduction of raw test results into summary statistics.
//!
//! Nothing in this module errors or panics: empty input produces the
//! all-zero [`Summary`], and records whose timestamp failed to parse are
//! excluded from time-based computations (and surfaced via
//! [`missing_timestamp_count`]) instead of aborting the aggregation.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};

use crate::model::{RunStatus, Summary, TestResult};

/// Reduce a record set into its [`Summary`].
///
/// Empty input yields the all-zero summary with no last run; the pass rate
/// is defined as 0 there, never NaN. Output is independent of input order.
pub fn summarize(records: &[TestResult]) -> Summary {
    let total = records.len() as u64;
    if total == 0 {
        return Summary::default();
    }

    let passed = records
        .iter()
        .filter(|r| r.status == RunStatus::Pass)
        .count() as u64;
    let failed = total - passed;

    let pass_rate = ((passed as f64 / total as f64) * 100.0).round() as u32;
    let avg_duration_seconds =
        records.iter().map(|r| r.duration_seconds).sum::<f64>() / total as f64;

    // Records without a parseable timestamp still count toward totals but
    // cannot contribute a last-run time.
    let last_run = records.iter().filter_map(|r| r.timestamp).max();

    Summary {
        total,
        passed,
        failed,
        pass_rate,
        avg_duration_seconds,
        last_run,
    }
}

/// Count records whose timestamp could not be parsed. Exposed as a
/// diagnostic so silently skipped records stay observable.
pub fn missing_timestamp_count(records: &[TestResult]) -> usize {
    records.iter().filter(|r| r.timestamp.is_none()).count()
}

/// Group records by their owning project, preserving input order within
/// each bucket. Records without a `project_id` are excluded rather than
/// collected into a synthetic bucket.
pub fn group_by_project(records: &[TestResult]) -> BTreeMap<String, Vec<TestResult>> {
    let mut buckets: BTreeMap<String, Vec<TestResult>> = BTreeMap::new();
    for record in records {
        if let Some(project_id) = &record.project_id {
            buckets
                .entry(project_id.clone())
                .or_default()
                .push(record.clone());
        }
    }
    buckets
}

/// Records whose timestamp falls on `day` in the dashboard's local zone.
///
/// "Today" is recomputed from the record timestamps on every call; nothing
/// is cached across days, since the local date rolls over at midnight.
pub fn filter_by_day(records: &[TestResult], day: NaiveDate) -> Vec<TestResult> {
    filter_by_day_in(records, day, &Local)
}

/// Zone-explicit variant of [`filter_by_day`]. A record belongs to `day`
/// iff its timestamp, converted to `zone`, lands on that calendar date.
/// Records without a parseable timestamp never match.
pub fn filter_by_day_in<Tz: TimeZone>(
    records: &[TestResult],
    day: NaiveDate,
    zone: &Tz,
) -> Vec<TestResult> {
    records
        .iter()
        .filter(|r| {
            r.timestamp
                .map(|t| t.with_timezone(zone).date_naive() == day)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Newest-first ordering. The sort is stable: equal timestamps keep their
/// input order, and timestampless records sort last.
pub fn sort_by_timestamp_desc(records: &[TestResult]) -> Vec<TestResult> {
    let mut sorted = records.to_vec();
    // Option<DateTime> orders None first, so comparing b to a puts None last.
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Round to 2 decimal places for display. Internal values keep full
/// precision.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
