use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::backend::ApiClient;
use crate::config::{DashboardConfig, BACKEND_TIMEOUT_SECS};
use crate::model::{Summary, TestResult, WorkerStatus};

pub type SharedState = Arc<DashboardState>;

pub struct DashboardState {
    pub config: DashboardConfig,
    pub api: ApiClient,
    pub overview: RwLock<OverviewCache>,
    pub worker: RwLock<WorkerCache>,
    pub diagnostics: RwLock<RefreshDiagnostics>,
    pub shutdown_tx: broadcast::Sender<()>,
}

/// Latest aggregated view of the result set. Replaced wholesale on each
/// successful refresh cycle; a failed cycle leaves the previous view in
/// place, so readers never see a flash back to empty.
#[derive(Debug, Clone)]
pub struct OverviewCache {
    pub summary: Summary,
    /// Full result set, newest first. The read routes slice this: the
    /// overview serves the top few, the results route serves everything.
    pub results: Vec<TestResult>,
    /// The backend's "today" slice; re-filtered by local day at read time.
    pub today: Vec<TestResult>,
    /// Records excluded from time-based aggregation because their
    /// timestamp failed to parse.
    pub missing_timestamps: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Default for OverviewCache {
    fn default() -> Self {
        // "No data yet" is the empty summary, not an absent one.
        Self {
            summary: Summary::default(),
            results: Vec::new(),
            today: Vec::new(),
            missing_timestamps: 0,
            refreshed_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCache {
    pub status: Option<WorkerStatus>,
    pub checked_at: Option<DateTime<Utc>>,
}

/// Counters for the background refreshers, served by `/diagnostics`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshDiagnostics {
    pub overview_cycles: u64,
    pub overview_failures: u64,
    pub consecutive_overview_failures: u64,
    pub worker_cycles: u64,
    pub worker_failures: u64,
    pub last_error: Option<String>,
}

impl DashboardState {
    pub fn new(config: DashboardConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(BACKEND_TIMEOUT_SECS))
            .pool_max_idle_per_host(4)
            .build()
            .expect("Failed to create HTTP client");
        let api = ApiClient::new(http, config.backend_url.clone());
        Self {
            config,
            api,
            overview: RwLock::new(OverviewCache::default()),
            worker: RwLock::new(WorkerCache::default()),
            diagnostics: RwLock::new(RefreshDiagnostics::default()),
            shutdown_tx,
        }
    }
}
