//! Connectivity supervision through the full tick path.

use dht_telemetry::app::events::AppEvent;
use dht_telemetry::app::supervisor::{AssociationPolicy, ConnectOutcome, ConnectionState};
use dht_telemetry::scheduler::TickOutcome;

use crate::mock_ports::{BrokerCall, Rig};

#[test]
fn silent_link_drop_is_noticed_next_tick() {
    let mut rig = Rig::new(false, 60, 10);
    rig.connect_now();
    rig.step();
    let attempts = rig.link.attempts.get();

    rig.link.up.set(false);
    rig.broker.0.borrow_mut().calls.clear();
    rig.sink.events.clear();

    assert_eq!(rig.step(), TickOutcome::Idle);
    assert_eq!(rig.link.attempts.get(), attempts + 1);
    assert_eq!(
        rig.sink.events,
        vec![
            AppEvent::ConnectivityLost(ConnectionState::Disconnected),
            AppEvent::NetworkReady,
        ]
    );
}

#[test]
fn session_never_outlives_its_association() {
    let mut rig = Rig::new(false, 60, 10);
    rig.connect_now();

    rig.link.up.set(false);
    rig.broker.0.borrow_mut().calls.clear();
    rig.step();

    let calls = rig.broker.0.borrow().calls.clone();
    assert_eq!(calls.first(), Some(&BrokerCall::Disconnect));
    assert_eq!(calls.last(), Some(&BrokerCall::Connect));
}

#[test]
fn association_retries_wait_between_attempts() {
    let mut rig = Rig::new(false, 60, 10);
    rig.link.failures.set(3);

    assert_eq!(
        rig.supervisor.ensure_connected(),
        Ok(ConnectOutcome::Restored)
    );
    assert_eq!(rig.link.attempts.get(), 4);
    assert_eq!(
        rig.time.elapsed_ms(),
        3 * u64::from(AssociationPolicy::RETRY_DELAY_MS)
    );
}

#[test]
fn ready_state_needs_no_broker_traffic() {
    let mut rig = Rig::new(false, 60, 10);
    rig.connect_now();
    let before = rig.broker.0.borrow().calls.len();

    for _ in 0..5 {
        rig.step();
    }
    assert_eq!(rig.broker.0.borrow().calls.len(), before);
    assert_eq!(rig.supervisor.observed_state(), ConnectionState::Ready);
}
