//! Poller contract tests under tokio's paused clock: time advances
//! virtually whenever all tasks are idle, so the cadence assertions are
//! deterministic and run instantly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;

use autodash::error::DashboardError;
use autodash::poller::{self, UpdateGate};

fn fetch_error() -> DashboardError {
    DashboardError::Envelope("simulated fetch failure".into())
}

#[tokio::test(start_paused = true)]
async fn test_first_cycle_runs_immediately() {
    let applied: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let applied_in = applied.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        |seq| async move { Ok(seq) },
        move |seq| {
            let applied = applied_in.clone();
            async move {
                applied.lock().await.push(seq);
            }
        },
        |_| async {},
    );

    // Well before the first interval elapses
    sleep(Duration::from_millis(100)).await;
    assert_eq!(*applied.lock().await, vec![1]);
    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_fixed_cadence() {
    let applied: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let applied_in = applied.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        |seq| async move { Ok(seq) },
        move |seq| {
            let applied = applied_in.clone();
            async move {
                applied.lock().await.push(seq);
            }
        },
        |_| async {},
    );

    // Cycles at t=0, 3, 6, 9
    sleep(Duration::from_secs(10)).await;
    assert_eq!(*applied.lock().await, vec![1, 2, 3, 4]);
    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_retains_previous_value() {
    let latest: Arc<Mutex<Option<u64>>> = Arc::new(Mutex::new(None));
    let latest_in = latest.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        |seq| async move {
            if seq == 2 {
                Err(fetch_error())
            } else {
                Ok(seq)
            }
        },
        move |seq| {
            let latest = latest_in.clone();
            async move {
                *latest.lock().await = Some(seq);
            }
        },
        |_| async {},
    );

    // After cycle 1
    sleep(Duration::from_secs(1)).await;
    assert_eq!(*latest.lock().await, Some(1));
    assert_eq!(handle.failures(), 0);

    // After cycle 2 fails, cycle 1's value is still current
    sleep(Duration::from_secs(3)).await;
    assert_eq!(*latest.lock().await, Some(1));
    assert_eq!(handle.failures(), 1);

    // Cycle 3 succeeds and replaces it; the schedule never stalled
    sleep(Duration::from_secs(3)).await;
    assert_eq!(*latest.lock().await, Some(3));
    assert_eq!(handle.failures(), 1);

    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_discards_in_flight_result() {
    let applied = Arc::new(AtomicU64::new(0));
    let applied_in = applied.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        |seq| async move {
            // Slow fetch: still in flight when stop() arrives
            sleep(Duration::from_secs(5)).await;
            Ok(seq)
        },
        move |_seq| {
            let applied = applied_in.clone();
            async move {
                applied.fetch_add(1, Ordering::SeqCst);
            }
        },
        |_| async {},
    );

    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.cycles_issued(), 1);
    handle.stop();

    // The fetch would have resolved at t=5; its result must never apply
    sleep(Duration::from_secs(20)).await;
    assert_eq!(applied.load(Ordering::SeqCst), 0);
    assert!(handle.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_skips_ticks_instead_of_overlapping() {
    let in_flight = Arc::new(AtomicU64::new(0));
    let max_in_flight = Arc::new(AtomicU64::new(0));
    let in_flight_c = in_flight.clone();
    let max_c = max_in_flight.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        move |seq| {
            let in_flight = in_flight_c.clone();
            let max = max_c.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                // Fetch takes over two intervals
                sleep(Duration::from_secs(7)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(seq)
            }
        },
        |_| async {},
        |_| async {},
    );

    // Cycle 1 runs t=0..7, next tick after it lands at t=9 (runs 9..16),
    // then t=18. Ticks at 3, 6, 12, 15 are skipped, never queued.
    sleep(Duration::from_secs(20)).await;
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(handle.cycles_issued(), 3);
    handle.stop();
}

#[test]
fn test_update_gate_discards_stale_cycle() {
    // Simulated out-of-order completion: the later-issued cycle 2 resolves
    // first; cycle 1's result arriving afterwards must lose.
    let gate = UpdateGate::new();

    assert!(gate.try_apply(2));
    assert!(!gate.try_apply(1));
    assert_eq!(gate.last_applied(), 2);

    // Later-issued cycles still apply
    assert!(gate.try_apply(3));
    assert_eq!(gate.last_applied(), 3);

    // Re-applying the same cycle is also rejected
    assert!(!gate.try_apply(3));
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_reentrant_from_on_update() {
    let applied: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let applied_in = applied.clone();
    // std Mutex: the slot is filled synchronously after start(), before the
    // runtime ever polls the poller task.
    let stopper_slot: Arc<std::sync::Mutex<Option<poller::Stopper>>> =
        Arc::new(std::sync::Mutex::new(None));
    let stopper_in = stopper_slot.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        |seq| async move { Ok(seq) },
        move |seq| {
            let applied = applied_in.clone();
            let stopper = stopper_in.clone();
            async move {
                applied.lock().await.push(seq);
                // Tear down from inside the callback
                if let Some(s) = stopper.lock().expect("slot lock").as_ref() {
                    s.stop();
                }
            }
        },
        |_| async {},
    );
    *stopper_slot.lock().expect("slot lock") = Some(handle.stopper());

    sleep(Duration::from_secs(10)).await;

    // First cycle applied, then the re-entrant stop ended the loop
    assert_eq!(*applied.lock().await, vec![1]);
    assert!(handle.is_stopped());
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_failing_cycle_suppresses_error_callback() {
    let errors = Arc::new(AtomicU64::new(0));
    let errors_in = errors.clone();
    let stopper_slot: Arc<std::sync::Mutex<Option<poller::Stopper>>> =
        Arc::new(std::sync::Mutex::new(None));
    let stopper_in = stopper_slot.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        move |_seq| {
            let stopper = stopper_in.clone();
            async move {
                // Stop lands while the cycle is in flight, then it errors
                if let Some(s) = stopper.lock().expect("slot lock").as_ref() {
                    s.stop();
                }
                Err::<u64, _>(fetch_error())
            }
        },
        |_| async {},
        move |_| {
            let errors = errors_in.clone();
            async move {
                errors.fetch_add(1, Ordering::SeqCst);
            }
        },
    );
    *stopper_slot.lock().expect("slot lock") = Some(handle.stopper());

    sleep(Duration::from_secs(10)).await;

    // A stopped cycle is discarded on the error channel like on the
    // success channel: no callback, no failure count
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(handle.failures(), 0);
    assert!(handle.is_stopped());
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_the_loop() {
    let fetch_count = Arc::new(AtomicU64::new(0));
    let fetch_in = fetch_count.clone();

    let handle = poller::start(
        Duration::from_secs(3),
        move |seq| {
            let count = fetch_in.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(seq)
            }
        },
        |_: u64| async {},
        |_| async {},
    );
    drop(handle);

    // The loop observes the stop flag before its first cycle
    sleep(Duration::from_secs(10)).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resume_requires_a_fresh_start() {
    let first_applied: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let first_in = first_applied.clone();

    let first = poller::start(
        Duration::from_secs(3),
        |seq| async move { Ok(seq) },
        move |seq| {
            let applied = first_in.clone();
            async move {
                applied.lock().await.push(seq);
            }
        },
        |_| async {},
    );

    sleep(Duration::from_secs(1)).await;
    first.join().await;
    let frozen = first_applied.lock().await.clone();

    // A second poller starts its own cycle sequence from 1
    let second_applied: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let second_in = second_applied.clone();
    let second = poller::start(
        Duration::from_secs(3),
        |seq| async move { Ok(seq) },
        move |seq| {
            let applied = second_in.clone();
            async move {
                applied.lock().await.push(seq);
            }
        },
        |_| async {},
    );

    sleep(Duration::from_secs(1)).await;
    assert_eq!(*first_applied.lock().await, frozen);
    assert_eq!(*second_applied.lock().await, vec![1]);
    second.stop();
}
