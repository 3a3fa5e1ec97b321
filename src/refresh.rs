//! Background refreshers that keep the cached views fresh.
//!
//! Each refresher is one poller (see [`crate::poller`]): the overview
//! refresher re-aggregates the full result set every few seconds, the
//! worker refresher checks worker liveness on a slower cadence. A failed
//! cycle logs, bumps the diagnostic counters, and leaves the previous
//! cached view untouched.

use chrono::Utc;
use tracing::{debug, warn};

use crate::aggregate;
use crate::poller::{self, PollerHandle};
use crate::state::{OverviewCache, SharedState, WorkerCache};

pub fn spawn_overview_refresher(state: SharedState) -> PollerHandle {
    let every = state.config.poll_interval;

    let fetch_state = state.clone();
    let update_state = state.clone();
    let error_state = state;

    poller::start(
        every,
        move |seq| {
            let api = fetch_state.api.clone();
            async move {
                debug!("overview refresh cycle {}", seq);
                let (results, today, backend_stats) =
                    futures::try_join!(api.results(), api.daily_results(), api.stats())?;

                let summary = aggregate::summarize(&results);

                // The backend computes its stats independently; identical
                // inputs must yield identical counts. A mismatch usually
                // means the /results page limit is hiding older records.
                if backend_stats.total != summary.total
                    || backend_stats.passed != summary.passed
                    || backend_stats.failed != summary.failed
                {
                    warn!(
                        "stats mismatch: backend {}/{}/{} vs local {}/{}/{}",
                        backend_stats.total,
                        backend_stats.passed,
                        backend_stats.failed,
                        summary.total,
                        summary.passed,
                        summary.failed,
                    );
                }

                let missing_timestamps = aggregate::missing_timestamp_count(&results);

                Ok(OverviewCache {
                    summary,
                    results: aggregate::sort_by_timestamp_desc(&results),
                    missing_timestamps,
                    today,
                    refreshed_at: Some(Utc::now()),
                })
            }
        },
        move |snapshot: OverviewCache| {
            let state = update_state.clone();
            async move {
                *state.overview.write().await = snapshot;
                let mut diag = state.diagnostics.write().await;
                diag.overview_cycles += 1;
                diag.consecutive_overview_failures = 0;
            }
        },
        move |err| {
            let state = error_state.clone();
            async move {
                warn!("overview refresh failed: {}", err);
                let mut diag = state.diagnostics.write().await;
                diag.overview_failures += 1;
                diag.consecutive_overview_failures += 1;
                diag.last_error = Some(err.to_string());
            }
        },
    )
}

pub fn spawn_worker_refresher(state: SharedState) -> PollerHandle {
    let every = state.config.worker_poll_interval;

    let fetch_state = state.clone();
    let update_state = state.clone();
    let error_state = state;

    poller::start(
        every,
        move |_seq| {
            let api = fetch_state.api.clone();
            async move { api.worker_status().await }
        },
        move |status| {
            let state = update_state.clone();
            async move {
                let mut cache = state.worker.write().await;
                *cache = WorkerCache {
                    status: Some(status),
                    checked_at: Some(Utc::now()),
                };
                drop(cache);
                state.diagnostics.write().await.worker_cycles += 1;
            }
        },
        move |err| {
            let state = error_state.clone();
            async move {
                warn!("worker status check failed: {}", err);
                let mut diag = state.diagnostics.write().await;
                diag.worker_failures += 1;
                diag.last_error = Some(err.to_string());
            }
        },
    )
}
