//! Integration Tests - Emitter Loop Against Mock Collaborators
//!
//! Tests the interaction between the emitter use case, its ports and
//! the metrics adapter. Uses mockall where call-count expectations
//! matter, hand-rolled recording fakes where accumulated state is
//! easier to assert, and virtual clocks so no test sleeps for real.

use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::broadcast;
use tokio_test::assert_ok;

use metric_pulse::adapters::metrics::MetricsRegistry;
use metric_pulse::config::EmitterSettings;
use metric_pulse::ports::clock::Clock;
use metric_pulse::ports::counter::Counter;
use metric_pulse::usecases::emitter::{EmitterError, EmitterLoop};

// ---- Mock Definitions ----

mock! {
    pub DemoCounter {}

    impl Counter for DemoCounter {
        fn increment(&self, amount: u64);
        fn value(&self) -> u64;
        fn name(&self) -> &str;
    }
}

/// Counter fake that accumulates like the registry handle and records
/// every increment amount for assertions.
#[derive(Default)]
struct RecordingCounter {
    value: AtomicU64,
    amounts: Mutex<Vec<u64>>,
}

impl RecordingCounter {
    fn amounts(&self) -> Vec<u64> {
        self.amounts.lock().unwrap().clone()
    }
}

impl Counter for RecordingCounter {
    fn increment(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::SeqCst);
        self.amounts.lock().unwrap().push(amount);
    }

    fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "test_metric1"
    }
}

/// Clock fake: virtual time that advances only when the emitter
/// sleeps, recording each requested sleep duration.
struct VirtualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl VirtualClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.offset.lock().unwrap() += duration;
        tokio::task::yield_now().await;
    }
}

/// Clock fake that broadcasts shutdown during its Nth sleep and never
/// completes that sleep, forcing the emitter's cancellation branch.
struct CancellingClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: AtomicU64,
    cancel_on_sleep: u64,
    shutdown_tx: broadcast::Sender<()>,
}

impl CancellingClock {
    fn new(cancel_on_sleep: u64, shutdown_tx: broadcast::Sender<()>) -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: AtomicU64::new(0),
            cancel_on_sleep,
            shutdown_tx,
        }
    }
}

#[async_trait]
impl Clock for CancellingClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        let nth = self.sleeps.fetch_add(1, Ordering::SeqCst) + 1;
        if nth == self.cancel_on_sleep {
            let _ = self.shutdown_tx.send(());
            std::future::pending::<()>().await;
        }
        *self.offset.lock().unwrap() += duration;
        tokio::task::yield_now().await;
    }
}

fn settings(
    duration_seconds: u64,
    increment: (u64, u64),
    wait_ms: (u64, u64),
    seed: Option<u64>,
) -> EmitterSettings {
    EmitterSettings {
        duration_seconds,
        min_increment: increment.0,
        max_increment: increment.1,
        min_wait_ms: wait_ms.0,
        max_wait_ms: wait_ms.1,
        seed,
        ..EmitterSettings::default()
    }
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_increments_and_waits_stay_within_ranges() {
    let counter = Arc::new(RecordingCounter::default());
    let clock = Arc::new(VirtualClock::new());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        Arc::clone(&clock),
        settings(2, (5, 50), (10, 100), Some(99)),
        shutdown_rx,
    );
    let report = emitter.run().await.unwrap();
    drop(shutdown_tx);

    let amounts = counter.amounts();
    assert!(!amounts.is_empty());
    assert!(amounts.iter().all(|a| (5..50).contains(a)));

    let sleeps = clock.sleeps();
    assert_eq!(sleeps.len(), amounts.len());
    assert!(sleeps
        .iter()
        .all(|s| (10..100).contains(&u64::try_from(s.as_millis()).unwrap())));

    assert_eq!(report.iterations, amounts.len() as u64);
    assert_eq!(report.total_emitted, amounts.iter().sum::<u64>());
    assert_eq!(counter.value(), report.total_emitted);

    // Elapsed covers the window, overshooting by less than one max wait.
    assert!(report.elapsed >= Duration::from_secs(2));
    assert!(report.elapsed < Duration::from_secs(2) + Duration::from_millis(100));
}

#[tokio::test]
async fn test_invalid_increment_range_fails_fast() {
    let mut mock_counter = MockDemoCounter::new();
    mock_counter.expect_name().return_const("mock_metric".to_string());
    mock_counter.expect_increment().times(0);

    let clock = Arc::new(VirtualClock::new());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let emitter = EmitterLoop::new(
        Arc::new(mock_counter),
        clock,
        settings(1, (10, 10), (10, 100), None),
        shutdown_rx,
    );

    let result = emitter.run().await;
    assert!(matches!(result, Err(EmitterError::InvalidConfiguration(_))));
}

#[tokio::test]
async fn test_invalid_wait_range_fails_fast_with_zero_increments() {
    let counter = Arc::new(RecordingCounter::default());
    let clock = Arc::new(VirtualClock::new());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        clock,
        settings(1, (1, 100), (100, 10), None),
        shutdown_rx,
    );

    let result = emitter.run().await;
    assert!(matches!(result, Err(EmitterError::InvalidConfiguration(_))));
    assert!(counter.amounts().is_empty());
    assert_eq!(counter.value(), 0);
}

#[tokio::test]
async fn test_zero_duration_fails_fast() {
    let counter = Arc::new(RecordingCounter::default());
    let clock = Arc::new(VirtualClock::new());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        clock,
        settings(0, (1, 100), (10, 100), None),
        shutdown_rx,
    );

    let result = emitter.run().await;
    assert!(matches!(result, Err(EmitterError::InvalidConfiguration(_))));
    assert!(counter.amounts().is_empty());
}

#[tokio::test]
async fn test_presignalled_cancellation_applies_no_increment() {
    let counter = Arc::new(RecordingCounter::default());
    let clock = Arc::new(VirtualClock::new());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Cancel before the loop ever runs.
    shutdown_tx.send(()).unwrap();

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        clock,
        settings(60, (1, 100), (10, 100), None),
        shutdown_rx,
    );

    let result = emitter.run().await;
    assert!(matches!(result, Err(EmitterError::Cancelled)));
    assert!(counter.amounts().is_empty());
}

#[tokio::test]
async fn test_cancellation_during_sleep_stops_increments() {
    let counter = Arc::new(RecordingCounter::default());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let clock = Arc::new(CancellingClock::new(3, shutdown_tx));

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        clock,
        settings(3600, (1, 100), (10, 100), None),
        shutdown_rx,
    );

    let result = emitter.run().await;
    assert!(matches!(result, Err(EmitterError::Cancelled)));

    // Exactly the increments applied before the signal, none after.
    assert_eq!(counter.amounts().len(), 3);
}

#[tokio::test]
async fn test_unit_increment_scenario_counts_iterations() {
    // duration=1s, increment in [1,2), wait in [10,11): every iteration
    // adds exactly +1 and sleeps exactly 10ms, so the virtual run is
    // fully deterministic without a seed.
    let counter = Arc::new(RecordingCounter::default());
    let clock = Arc::new(VirtualClock::new());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        Arc::clone(&clock),
        settings(1, (1, 2), (10, 11), None),
        shutdown_rx,
    );

    let report = emitter.run().await.unwrap();

    assert_eq!(report.iterations, 100);
    assert_eq!(report.total_emitted, 100);
    assert_eq!(counter.value(), 100);
    assert!(counter.amounts().iter().all(|a| *a == 1));
    assert_eq!(report.elapsed, Duration::from_secs(1));
}

#[tokio::test]
async fn test_sequential_runs_are_independent() {
    for _ in 0..2 {
        let counter = Arc::new(RecordingCounter::default());
        let clock = Arc::new(VirtualClock::new());
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let emitter = EmitterLoop::new(
            Arc::clone(&counter),
            clock,
            settings(1, (1, 100), (10, 100), None),
            shutdown_rx,
        );

        let report = emitter.run().await.unwrap();
        assert!(report.iterations > 0);
        assert_eq!(counter.value(), report.total_emitted);
    }
}

#[tokio::test]
async fn test_emitter_drives_prometheus_counter() {
    let registry = MetricsRegistry::new("it_metric1").unwrap();
    let counter = Arc::new(registry.counter_handle());
    let clock = Arc::new(VirtualClock::new());
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        clock,
        settings(1, (1, 2), (10, 11), None),
        shutdown_rx,
    );

    let report = tokio_test::assert_ok!(emitter.run().await);
    assert_eq!(registry.demo_counter_value(), report.total_emitted);
    assert_eq!(counter.value(), report.total_emitted);
}
