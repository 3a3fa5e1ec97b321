use axum::extract::State;
use axum::response::Json;

use crate::state::{RefreshDiagnostics, SharedState};

/// Refresher cycle and failure counters. Lets an operator see that cycles
/// are running and whether malformed records are being skipped.
pub async fn diagnostics(State(state): State<SharedState>) -> Json<RefreshDiagnostics> {
    Json(state.diagnostics.read().await.clone())
}
