//! Case management passthrough. Cases are created and deleted only by
//! explicit user action; there is no automatic lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::error::DashboardError;
use crate::model::{CaseInput, ProjectCase};
use crate::state::SharedState;

pub async fn list(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectCase>>, DashboardError> {
    Ok(Json(state.api.project_cases(&project_id).await?))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
    Json(body): Json<CaseInput>,
) -> Result<Json<ProjectCase>, DashboardError> {
    validate_case(&body)?;
    Ok(Json(state.api.create_case(&project_id, &body).await?))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(case_id): Path<String>,
    Json(body): Json<CaseInput>,
) -> Result<Json<ProjectCase>, DashboardError> {
    validate_case(&body)?;
    Ok(Json(state.api.update_case(&case_id, &body).await?))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(case_id): Path<String>,
) -> Result<StatusCode, DashboardError> {
    state.api.delete_case(&case_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_case(body: &CaseInput) -> Result<(), DashboardError> {
    if body.name.trim().is_empty() {
        return Err(DashboardError::InvalidInput(
            "case name must not be empty".into(),
        ));
    }
    if body.identifier.trim().is_empty() {
        return Err(DashboardError::InvalidInput(
            "case identifier must not be empty".into(),
        ));
    }
    Ok(())
}
