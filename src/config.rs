use clap::Parser;
use std::time::Duration;

/// autodash — headless dashboard for an automated-test results backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "autodash")]
pub struct CliArgs {
    /// Base URL of the results backend API
    #[arg(short = 'b', long = "backend-url", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Dashboard HTTP port
    #[arg(long = "port", default_value_t = DEFAULT_DASHBOARD_PORT)]
    pub port: u16,

    /// Seconds between results/stats refresh cycles
    #[arg(long = "poll-interval", default_value_t = RESULTS_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Seconds between worker status checks
    #[arg(long = "worker-poll-interval", default_value_t = WORKER_POLL_INTERVAL_SECS)]
    pub worker_poll_interval_secs: u64,

    /// How many recent results the overview keeps
    #[arg(long = "recent-limit", default_value_t = RECENT_RESULTS_LIMIT)]
    pub recent_limit: usize,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub backend_url: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub worker_poll_interval: Duration,
    pub recent_limit: usize,
}

// Port constants
pub const DEFAULT_DASHBOARD_PORT: u16 = 8460;
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api";

// Polling cadence. The results cycle matches the original dashboard's
// 3-second refresh; worker status changes more slowly.
pub const RESULTS_POLL_INTERVAL_SECS: u64 = 3;
pub const WORKER_POLL_INTERVAL_SECS: u64 = 5;

// Overview constants
pub const RECENT_RESULTS_LIMIT: usize = 5;

// Backend HTTP constants
pub const BACKEND_TIMEOUT_SECS: u64 = 10;

impl DashboardConfig {
    pub fn from_args(args: CliArgs) -> Self {
        DashboardConfig {
            backend_url: args.backend_url.trim_end_matches('/').to_string(),
            port: args.port,
            poll_interval: Duration::from_secs(args.poll_interval_secs.max(1)),
            worker_poll_interval: Duration::from_secs(args.worker_poll_interval_secs.max(1)),
            recent_limit: args.recent_limit,
        }
    }
}
