//! Wire and domain types for the results backend.
//!
//! All shapes are camelCase on the wire to match the backend's JSON. Most
//! endpoints wrap their payload in a `{success, data}` envelope; the worker
//! status endpoint is the one exception and returns its body bare.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DashboardError;

/// Outcome of a single test execution. Only these two values exist on the
/// wire; anything else is a malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

/// One recorded test execution.
///
/// `status` implies nothing about which optional fields are present: a PASS
/// may carry a message, a FAIL may lack a screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    /// Absent means the result is not owned by any project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub test_name: String,
    pub status: RunStatus,
    /// Seconds. Negative wire values are clamped to zero on ingest.
    #[serde(rename = "duration", default, deserialize_with = "de_duration")]
    pub duration_seconds: f64,
    /// `None` when the backend sent a missing or unparseable timestamp.
    /// Such records still count toward totals but are excluded from
    /// last-run and day-bucket computations.
    #[serde(default, deserialize_with = "de_lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// A target system under automated test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub base_url: String,
    #[serde(default, deserialize_with = "de_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub base_url: String,
}

impl NewProject {
    /// The backend stores `baseUrl` verbatim, so the dashboard enforces
    /// syntactic URL validity before forwarding.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.name.trim().is_empty() {
            return Err(DashboardError::InvalidInput(
                "project name must not be empty".into(),
            ));
        }
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| DashboardError::InvalidInput(format!("invalid baseUrl: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(DashboardError::InvalidInput(format!(
                "invalid baseUrl scheme: {other}"
            ))),
        }
    }
}

/// A named test selector scoped to a project. `identifier` is the filter
/// string passed along when queueing a single-test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCase {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseInput {
    pub name: String,
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Derived pass/fail statistics over a set of results. Always recomputed
/// from the record set, never stored, so it cannot drift from its source.
///
/// The default value is the empty-input policy: all zeros and no last run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    /// Rounded percentage in 0..=100; 0 on empty input, never NaN.
    pub pass_rate: u32,
    /// Full precision internally; serialized rounded to 2 decimals.
    #[serde(serialize_with = "ser_round2")]
    pub avg_duration_seconds: f64,
    pub last_run: Option<DateTime<Utc>>,
}

/// The backend's `/stats` shape. Compatibility adapter only: the dashboard
/// standardizes on [`Summary`] and uses this solely to cross-check its own
/// aggregation against the server's counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStats {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
}

/// Online/offline view of the external worker process. The backend reports
/// it online while a heartbeat has been seen within its window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub online: bool,
    /// `None` when no heartbeat was ever recorded (the backend sends the
    /// zero time in that case).
    #[serde(default, deserialize_with = "de_worker_last_seen")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Kind of run to queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    FullSuite,
    SingleTest,
}

/// Body for `POST /queue-job` on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueJobRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_filter: Option<String>,
}

/// The backend's `{success, data}` response wrapper.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, surfacing the backend's own error text when the
    /// envelope reports failure.
    pub fn into_data(self, context: &str) -> Result<T, DashboardError> {
        if !self.success {
            let detail = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "no error detail".into());
            return Err(DashboardError::Envelope(format!("{context}: {detail}")));
        }
        self.data
            .ok_or_else(|| DashboardError::Envelope(format!("{context}: missing data field")))
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp, returning `None` on failure.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn de_lenient_timestamp<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Anything that is not a parseable timestamp string is treated as
    // absent rather than failing the whole record.
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(v.as_ref()
        .and_then(|v| v.as_str())
        .and_then(parse_timestamp))
}

fn de_worker_last_seen<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Go's zero time ("0001-01-01T00:00:00Z") parses fine but means "never
    // seen"; anything before the epoch is treated as absent.
    let ts = de_lenient_timestamp(d)?;
    Ok(ts.filter(|t| t.timestamp() > 0))
}

fn de_duration<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<f64>::deserialize(d)?.unwrap_or(0.0);
    Ok(if v.is_finite() && v > 0.0 { v } else { 0.0 })
}

fn ser_round2<S>(v: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_f64(crate::aggregate::round2(*v))
}
