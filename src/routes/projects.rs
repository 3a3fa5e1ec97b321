//! Project passthrough routes. These call the backend live; errors map
//! through [`DashboardError`] so a missing project becomes a 404 body
//! rather than a crashed view.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;

use crate::aggregate;
use crate::error::DashboardError;
use crate::model::{NewProject, Project, Summary, TestResult};
use crate::state::SharedState;

pub async fn list(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Project>>, DashboardError> {
    Ok(Json(state.api.projects().await?))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(body): Json<NewProject>,
) -> Result<Json<Project>, DashboardError> {
    body.validate()?;
    Ok(Json(state.api.create_project(&body).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project: Project,
    pub summary: Summary,
    /// Newest first.
    pub results: Vec<TestResult>,
    /// Test names discovered in the project's suite; empty when the suite
    /// file is missing.
    pub tests: Vec<String>,
}

pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetail>, DashboardError> {
    let project = state.api.project(&id).await?;
    let results = state.api.project_results(&id).await?;
    // A project with no discoverable suite is still viewable.
    let tests = state.api.project_tests(&id).await.unwrap_or_default();

    let summary = aggregate::summarize(&results);
    let results = aggregate::sort_by_timestamp_desc(&results);

    Ok(Json(ProjectDetail {
        project,
        summary,
        results,
        tests,
    }))
}
