use axum::extract::State;
use axum::response::Json;

use crate::state::{SharedState, WorkerCache};

/// Cached worker online/offline status from the worker refresher.
pub async fn worker(State(state): State<SharedState>) -> Json<WorkerCache> {
    Json(state.worker.read().await.clone())
}
