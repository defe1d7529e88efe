//! End-to-end tick behaviour: alignment, cadence and backoff.

use dht_telemetry::app::events::AppEvent;
use dht_telemetry::app::supervisor::ConnectionState;
use dht_telemetry::error::{ConnectError, PublishError, SensorError};
use dht_telemetry::scheduler::{CONNECT_BACKOFF_MS, SchedulerState, TICK_PERIOD_MS, TickOutcome};

use crate::mock_ports::Rig;

// ── Alignment ─────────────────────────────────────────────────

#[test]
fn synced_publishes_once_at_minute_boundary() {
    let mut rig = Rig::new(true, 60, 57);
    rig.connect_now();

    let outcomes: Vec<_> = (0..4).map(|_| (rig.step(), rig.second())).collect();
    assert_eq!(
        outcomes,
        vec![
            (TickOutcome::AwaitingPhaseLock, 58),
            (TickOutcome::AwaitingPhaseLock, 59),
            (TickOutcome::Published, 0),
            (TickOutcome::Idle, 1),
        ]
    );
    assert_eq!(rig.broker.published().len(), 1);
    assert!(rig.scheduler.is_phase_locked());
    assert!(rig.sink.events.contains(&AppEvent::PhaseLocked { minute: 2 }));
}

#[test]
fn unsynced_publishes_on_first_multiple() {
    let mut rig = Rig::new(false, 15, 10);
    rig.connect_now();

    let mut first = None;
    for _ in 0..10 {
        if rig.step() == TickOutcome::Published {
            first = Some(rig.second());
            break;
        }
    }
    assert_eq!(first, Some(15));
    assert!(!rig.scheduler.is_phase_locked());
    assert!(!rig.sink.events.iter().any(|e| matches!(e, AppEvent::PhaseLocked { .. })));
}

#[test]
fn seven_second_interval_free_runs_from_anchor() {
    let mut rig = Rig::new(true, 7, 59);
    rig.connect_now();

    let mut fired = Vec::new();
    for _ in 0..61 {
        if rig.step() == TickOutcome::Published {
            fired.push(rig.second());
        }
    }
    // 14:02:00 through 14:03:00: the anchor, the in-minute multiples,
    // then the next minute's zero.
    assert_eq!(fired, vec![0, 7, 14, 21, 28, 35, 42, 49, 56, 0]);
}

// ── Cold start ────────────────────────────────────────────────

#[test]
fn cold_start_connects_then_waits_for_boundary() {
    let mut rig = Rig::new(true, 60, 30);
    assert_eq!(rig.scheduler.state(), SchedulerState::AwaitingNetwork);

    assert_eq!(rig.step(), TickOutcome::AwaitingPhaseLock);
    assert_eq!(rig.sink.events, vec![AppEvent::NetworkReady]);
    assert_eq!(rig.supervisor.connection_state(), ConnectionState::Ready);
    assert_eq!(rig.scheduler.state(), SchedulerState::AwaitingPhaseLock);
}

// ── Broker failure and backoff ────────────────────────────────

#[test]
fn broker_failure_backs_off_and_clears_phase_lock() {
    let mut rig = Rig::new(true, 15, 58);
    rig.connect_now();
    rig.step(); // :59
    assert_eq!(rig.step(), TickOutcome::Published); // :00
    assert!(rig.scheduler.is_phase_locked());
    let published_before = rig.broker.published().len();

    rig.broker.drop_session();
    rig.broker.fail_next_connect();
    rig.sink.events.clear();

    let tick_n = rig.time.elapsed_ms() + u64::from(TICK_PERIOD_MS);
    assert_eq!(rig.step(), TickOutcome::BackedOff);
    assert_eq!(rig.broker.published().len(), published_before, "no publish on tick N");
    assert!(!rig.scheduler.is_phase_locked());
    assert_eq!(
        rig.sink.events,
        vec![
            AppEvent::ConnectivityLost(ConnectionState::WifiOnly),
            AppEvent::ConnectFailed {
                error: ConnectError::BrokerUnavailable,
                backoff_secs: CONNECT_BACKOFF_MS / 1000,
            },
        ]
    );

    let outcome = rig.step();
    let tick_next = rig.time.elapsed_ms();
    assert!(tick_next >= tick_n + u64::from(CONNECT_BACKOFF_MS));
    // Reconnected at a non-zero second: realignment is required.
    assert_eq!(outcome, TickOutcome::AwaitingPhaseLock);
    assert!(rig.sink.events.contains(&AppEvent::NetworkReady));
    assert!(!rig.scheduler.is_phase_locked());
}

#[test]
fn repeated_failures_report_loss_once() {
    let mut rig = Rig::new(false, 60, 0);
    rig.connect_now();
    rig.step();

    rig.broker.drop_session();
    for _ in 0..3 {
        rig.broker.fail_next_connect();
    }
    rig.sink.events.clear();
    for _ in 0..3 {
        assert_eq!(rig.step(), TickOutcome::BackedOff);
    }

    let lost = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::ConnectivityLost(_)))
        .count();
    assert_eq!(lost, 1);
    assert_eq!(rig.scheduler.state(), SchedulerState::AwaitingNetwork);
}

#[test]
fn bounded_association_backs_off_like_broker_failure() {
    use dht_telemetry::app::supervisor::AssociationPolicy;
    use std::num::NonZeroU32;

    let policy = AssociationPolicy {
        max_attempts: NonZeroU32::new(2),
        retry_delay_ms: 1_000,
    };
    let mut rig = Rig::with_policy(false, 60, 0, policy);
    rig.link.failures.set(5);

    assert_eq!(rig.step(), TickOutcome::BackedOff);
    assert!(rig.sink.events.contains(&AppEvent::ConnectFailed {
        error: ConnectError::LinkUnavailable { attempts: 2 },
        backoff_secs: 10,
    }));
    // tick + one retry delay + backoff
    assert_eq!(rig.time.elapsed_ms(), 1_000 + 1_000 + 10_000);
    assert_eq!(rig.broker.connect_count(), 0);
}

// ── Fail-soft publishing ──────────────────────────────────────

#[test]
fn sensor_error_skips_one_cycle_only() {
    let mut rig = Rig::new(true, 1, 59);
    rig.connect_now();
    rig.sensor.errors.borrow_mut().push_back(SensorError::Timeout);

    assert_eq!(rig.step(), TickOutcome::Published);
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::PublishFailed(PublishError::Sensor(SensorError::Timeout)))
    );
    assert!(rig.broker.published().is_empty());
    assert!(rig.scheduler.is_phase_locked());
    assert_eq!(rig.scheduler.state(), SchedulerState::Armed);
    assert_eq!(rig.supervisor.connection_state(), ConnectionState::Ready);

    assert_eq!(rig.step(), TickOutcome::Published);
    assert_eq!(rig.broker.published().len(), 1);
    assert_eq!(rig.broker.connect_count(), 1, "no reconnect after a sensor error");
}

#[test]
fn no_sampling_while_awaiting_network() {
    let mut rig = Rig::new(false, 1, 0);
    rig.broker.fail_next_connect();
    rig.broker.fail_next_connect();

    rig.step();
    rig.step();
    assert_eq!(rig.sensor.reads.get(), 0);
    assert_eq!(rig.step(), TickOutcome::Published);
    assert_eq!(rig.sensor.reads.get(), 1);
}
