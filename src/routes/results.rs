use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::TestResult;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    /// Newest first, with per-record detail (message, errorStack,
    /// screenshot) intact.
    pub results: Vec<TestResult>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// The full cached result history. Backs a results browser the way the
/// overview backs the landing page; served from cache, never a backend
/// round trip.
pub async fn list(State(state): State<SharedState>) -> Json<ResultsView> {
    let cache = state.overview.read().await;
    Json(ResultsView {
        results: cache.results.clone(),
        refreshed_at: cache.refreshed_at,
    })
}
