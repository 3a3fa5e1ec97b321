//! Read surface over the cached aggregated view. These handlers never call
//! the backend; they serve whatever the refresher last applied.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate;
use crate::model::{Summary, TestResult};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub summary: Summary,
    /// Newest results first, truncated to the configured limit. The full
    /// history lives on the results route.
    pub recent: Vec<TestResult>,
    pub missing_timestamps: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub async fn overview(State(state): State<SharedState>) -> Json<OverviewView> {
    let cache = state.overview.read().await;
    let mut recent = cache.results.clone();
    recent.truncate(state.config.recent_limit);
    Json(OverviewView {
        summary: cache.summary.clone(),
        recent,
        missing_timestamps: cache.missing_timestamps,
        refreshed_at: cache.refreshed_at,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyView {
    pub day: NaiveDate,
    pub summary: Summary,
    pub by_project: BTreeMap<String, Summary>,
    pub results: Vec<TestResult>,
}

/// Today's results, bucketed in the dashboard's local zone at request time.
///
/// The cached slice comes from the backend's own (server-zone) daily
/// endpoint; re-filtering here keeps the day boundary local and drops
/// anything that slid out of "today" since the last refresh.
pub async fn daily(State(state): State<SharedState>) -> Json<DailyView> {
    let cached_today = {
        let cache = state.overview.read().await;
        cache.today.clone()
    };

    let day = Local::now().date_naive();
    let results = aggregate::filter_by_day(&cached_today, day);
    let summary = aggregate::summarize(&results);
    let by_project = aggregate::group_by_project(&results)
        .into_iter()
        .map(|(project_id, records)| (project_id, aggregate::summarize(&records)))
        .collect();

    Json(DailyView {
        day,
        summary,
        by_project,
        results,
    })
}
