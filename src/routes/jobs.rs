use axum::extract::State;
use axum::response::Json;
use serde_json::Value;
use tracing::info;

use crate::error::DashboardError;
use crate::model::QueueJobRequest;
use crate::state::SharedState;

/// Queue a test run on the backend. Execution itself belongs to the
/// external worker; a 403 here means local execution is disabled and its
/// message passes through verbatim.
pub async fn queue(
    State(state): State<SharedState>,
    Json(body): Json<QueueJobRequest>,
) -> Result<Json<Value>, DashboardError> {
    info!(
        "queueing {:?} job for project {:?}",
        body.job_type, body.project_id
    );
    Ok(Json(state.api.queue_job(&body).await?))
}
