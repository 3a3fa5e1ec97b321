//! Typed client for the results backend REST API.
//!
//! All endpoints except `/worker-status` wrap their payload in the
//! `{success, data}` envelope; this module unwraps it and maps HTTP-level
//! failures onto [`DashboardError`] variants. HTTP 403 from the queue
//! endpoint is special-cased: the backend uses it to say "local execution
//! is disabled", which callers surface verbatim.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::DashboardError;
use crate::model::{
    BackendStats, CaseInput, Envelope, NewProject, Project, ProjectCase, QueueJobRequest,
    TestResult, WorkerStatus,
};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self { http, base }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    // ------------------------------------------------------------------
    // Results and statistics
    // ------------------------------------------------------------------

    pub async fn results(&self) -> Result<Vec<TestResult>, DashboardError> {
        self.get_enveloped("/results").await
    }

    /// Results the backend considers "today". Note the backend buckets from
    /// midnight in its own local zone; callers re-filter in theirs.
    pub async fn daily_results(&self) -> Result<Vec<TestResult>, DashboardError> {
        self.get_enveloped("/results/daily").await
    }

    pub async fn stats(&self) -> Result<BackendStats, DashboardError> {
        self.get_enveloped("/stats").await
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub async fn projects(&self) -> Result<Vec<Project>, DashboardError> {
        self.get_enveloped("/projects").await
    }

    pub async fn project(&self, id: &str) -> Result<Project, DashboardError> {
        self.get_enveloped(&format!("/projects/{id}")).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, DashboardError> {
        self.post_enveloped("/projects", project).await
    }

    pub async fn project_results(&self, id: &str) -> Result<Vec<TestResult>, DashboardError> {
        self.get_enveloped(&format!("/projects/{id}/results")).await
    }

    /// Names of the tests available in a project's suite.
    pub async fn project_tests(&self, id: &str) -> Result<Vec<String>, DashboardError> {
        self.get_enveloped(&format!("/projects/{id}/tests")).await
    }

    // ------------------------------------------------------------------
    // Cases
    // ------------------------------------------------------------------

    pub async fn project_cases(&self, id: &str) -> Result<Vec<ProjectCase>, DashboardError> {
        self.get_enveloped(&format!("/projects/{id}/cases")).await
    }

    pub async fn create_case(
        &self,
        project_id: &str,
        case: &CaseInput,
    ) -> Result<ProjectCase, DashboardError> {
        self.post_enveloped(&format!("/projects/{project_id}/cases"), case)
            .await
    }

    pub async fn update_case(
        &self,
        case_id: &str,
        case: &CaseInput,
    ) -> Result<ProjectCase, DashboardError> {
        let path = format!("/cases/{case_id}");
        let resp = self.http.put(self.url(&path)).json(case).send().await?;
        decode_enveloped(resp, &path).await
    }

    pub async fn delete_case(&self, case_id: &str) -> Result<(), DashboardError> {
        let path = format!("/cases/{case_id}");
        let resp = self.http.delete(self.url(&path)).send().await?;
        let _: Value = decode_enveloped(resp, &path).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Jobs and worker
    // ------------------------------------------------------------------

    /// Ask the backend to schedule a run. 403 means local execution is
    /// disabled in this environment and maps to
    /// [`DashboardError::ExecutionDisabled`].
    pub async fn queue_job(&self, job: &QueueJobRequest) -> Result<Value, DashboardError> {
        self.post_enveloped("/queue-job", job).await
    }

    /// The worker endpoint is the one un-enveloped response on the API.
    pub async fn worker_status(&self) -> Result<WorkerStatus, DashboardError> {
        let path = "/worker-status";
        let resp = self.http.get(self.url(path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::Envelope(format!(
                "{path} returned HTTP {status}"
            )));
        }
        Ok(resp.json().await?)
    }

    // ------------------------------------------------------------------
    // Transport helpers
    // ------------------------------------------------------------------

    async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        debug!("GET {}", path);
        let resp = self.http.get(self.url(path)).send().await?;
        decode_enveloped(resp, path).await
    }

    async fn post_enveloped<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DashboardError> {
        debug!("POST {}", path);
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode_enveloped(resp, path).await
    }
}

/// Map an HTTP response onto the error taxonomy, then unwrap the
/// `{success, data}` envelope: 403 carries the backend's own message, 404
/// becomes [`DashboardError::NotFound`], any other non-success status is a
/// malformed-backend error.
pub async fn decode_enveloped<T: DeserializeOwned>(
    resp: Response,
    path: &str,
) -> Result<T, DashboardError> {
    let status = resp.status();

    if status == StatusCode::FORBIDDEN {
        let msg = extract_error_message(resp)
            .await
            .unwrap_or_else(|| "Local execution is disabled in this environment".to_string());
        return Err(DashboardError::ExecutionDisabled(msg));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(DashboardError::NotFound(path.to_string()));
    }
    if !status.is_success() {
        let detail = extract_error_message(resp)
            .await
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(DashboardError::Envelope(format!("{path}: {detail}")));
    }

    let envelope: Envelope<T> = resp.json().await?;
    envelope.into_data(path)
}

/// Pull the backend's own error text out of a failure body, if any.
async fn extract_error_message(resp: Response) -> Option<String> {
    let body: Value = resp.json().await.ok()?;
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
