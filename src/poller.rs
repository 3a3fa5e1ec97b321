//! Fixed-interval polling with at-most-one-in-flight fetch cycles.
//!
//! [`start`] spawns a loop that runs one fetch cycle immediately, then one
//! per interval tick. A cycle that is still in flight when the next tick is
//! due causes the tick to be skipped, never an overlapping request. Results
//! are applied in issue order through an [`UpdateGate`], so a stale cycle
//! that somehow resolves after a later one is discarded. Stopping wakes any
//! in-flight cycle and suppresses its result; the loop exits and releases
//! its timer, so repeated start/stop never leaks tasks.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use crate::error::DashboardError;

/// Issue-order gate. Cycle sequence numbers increase monotonically as
/// cycles are issued; a result may only be applied if its sequence number
/// is higher than everything applied so far. This is stricter than "last
/// write wins by completion order": an earlier-issued cycle completing late
/// loses.
#[derive(Debug, Default)]
pub struct UpdateGate {
    applied: AtomicU64,
}

impl UpdateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `seq` if it is newer than the last applied
    /// cycle; false means the result must be discarded.
    pub fn try_apply(&self, seq: u64) -> bool {
        let mut current = self.applied.load(Ordering::Acquire);
        loop {
            if seq <= current {
                return false;
            }
            match self.applied.compare_exchange(
                current,
                seq,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(now) => current = now,
            }
        }
    }

    /// Sequence number of the newest applied cycle (0 before any apply).
    pub fn last_applied(&self) -> u64 {
        self.applied.load(Ordering::Acquire)
    }
}

struct Shared {
    stopped: AtomicBool,
    stop_notify: Notify,
    issued: AtomicU64,
    failures: AtomicU64,
    gate: UpdateGate,
}

impl Shared {
    fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
            stop_notify: Notify::new(),
            issued: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            gate: UpdateGate::new(),
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Handle to a running poller. Dropping it stops the loop.
pub struct PollerHandle {
    shared: Arc<Shared>,
    task: Option<tokio::task::JoinHandle<()>>,
}

/// Cheap cloneable stop control, safe to call from inside an `on_update`
/// callback. Stopping only flips a flag and wakes the loop; the loop itself
/// tears down at its next checkpoint.
#[derive(Clone)]
pub struct Stopper {
    shared: Arc<Shared>,
}

impl Stopper {
    pub fn stop(&self) {
        self.shared.stop();
    }
}

impl PollerHandle {
    /// Stop polling. Terminal: a stopped poller never runs another cycle;
    /// resuming requires a fresh [`start`]. An in-flight fetch is woken and
    /// its result discarded without reaching `on_update`.
    pub fn stop(&self) {
        self.shared.stop();
    }

    pub fn stopper(&self) -> Stopper {
        Stopper {
            shared: self.shared.clone(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// Cycles issued so far (skipped ticks issue nothing).
    pub fn cycles_issued(&self) -> u64 {
        self.shared.issued.load(Ordering::Acquire)
    }

    /// Sequence number of the newest successfully applied cycle.
    pub fn last_applied_cycle(&self) -> u64 {
        self.shared.gate.last_applied()
    }

    /// Failed cycles so far. A failure never disturbs the schedule.
    pub fn failures(&self) -> u64 {
        self.shared.failures.load(Ordering::Acquire)
    }

    /// Stop and wait for the loop to finish.
    pub async fn join(mut self) {
        self.shared.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

/// Start polling: one fetch cycle immediately, then one per `every`.
///
/// `fetch` receives the cycle's sequence number (starting at 1). On success
/// the value passes the issue-order gate and reaches `on_update`; on
/// failure `on_error` is invoked and the previously applied value stays
/// current — one bad cycle never halts polling.
pub fn start<T, F, Fut, U, UFut, E, EFut>(
    every: Duration,
    mut fetch: F,
    mut on_update: U,
    mut on_error: E,
) -> PollerHandle
where
    T: Send + 'static,
    F: FnMut(u64) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, DashboardError>> + Send,
    U: FnMut(T) -> UFut + Send + 'static,
    UFut: Future<Output = ()> + Send,
    E: FnMut(DashboardError) -> EFut + Send + 'static,
    EFut: Future<Output = ()> + Send,
{
    let shared = Arc::new(Shared::new());
    let loop_shared = shared.clone();

    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        // A fetch outlasting the interval must skip ticks, not burst later.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = loop_shared.stop_notify.notified() => {}
            }
            if loop_shared.is_stopped() {
                break;
            }

            let seq = loop_shared.issued.fetch_add(1, Ordering::AcqRel) + 1;

            let outcome = tokio::select! {
                result = fetch(seq) => Some(result),
                _ = loop_shared.stop_notify.notified() => None,
            };

            match outcome {
                // Stopped mid-flight: the cycle's result is discarded.
                None => break,
                Some(Ok(value)) => {
                    if loop_shared.is_stopped() {
                        break;
                    }
                    if loop_shared.gate.try_apply(seq) {
                        on_update(value).await;
                    } else {
                        debug!("poller: discarding stale cycle {}", seq);
                    }
                }
                Some(Err(e)) => {
                    // A stopped cycle is a no-op on the error channel too.
                    if loop_shared.is_stopped() {
                        break;
                    }
                    loop_shared.failures.fetch_add(1, Ordering::AcqRel);
                    on_error(e).await;
                }
            }

            // `stop()` may have been called from within a callback.
            if loop_shared.is_stopped() {
                break;
            }
        }
        debug!("poller loop exited");
    });

    PollerHandle {
        shared,
        task: Some(task),
    }
}
