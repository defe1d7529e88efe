//! What actually goes over the wire.

use dht_telemetry::app::events::AppEvent;
use dht_telemetry::app::ports::{BrokerPort, ClockPort, Measurement};
use dht_telemetry::error::{BrokerError, PublishError, SensorError};
use dht_telemetry::scheduler::TickOutcome;

use crate::mock_ports::{BrokerCall, Rig};

#[test]
fn payload_matches_subscriber_format() {
    let mut rig = Rig::new(true, 60, 59);
    rig.connect_now();

    assert_eq!(rig.step(), TickOutcome::Published);
    let calls = rig.broker.0.borrow().calls.clone();
    assert_eq!(
        calls.last(),
        Some(&BrokerCall::Publish {
            topic: "home/kitchen/climate".into(),
            payload: r#"{"name":"dht-kitchen","position":"kitchen","date":[2024,3,9,14,2,0,5,69],"temperature":"21.4","humidity":"48.0"}"#.into(),
        })
    );
}

#[test]
fn each_publish_takes_a_fresh_reading() {
    let mut rig = Rig::new(false, 1, 0);
    rig.connect_now();

    rig.step();
    rig.sensor.reading.set(Measurement {
        temperature_c: -3.5,
        humidity_pct: 90.0,
    });
    rig.step();

    let published = rig.broker.published();
    assert_eq!(published.len(), 2);
    assert!(published[0].contains(r#""temperature":"21.4""#));
    assert!(published[1].contains(r#""temperature":"-3.5","humidity":"90.0""#));
    assert_eq!(rig.sensor.reads.get(), 2);
}

#[test]
fn non_finite_reading_is_rejected() {
    let mut rig = Rig::new(false, 1, 0);
    rig.connect_now();
    rig.sensor.reading.set(Measurement {
        temperature_c: f32::NAN,
        humidity_pct: 50.0,
    });

    rig.step();
    assert!(rig.broker.published().is_empty());
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::PublishFailed(PublishError::Sensor(SensorError::OutOfRange)))
    );
}

#[test]
fn successful_publish_reports_byte_count() {
    let mut rig = Rig::new(false, 1, 0);
    rig.connect_now();
    rig.step();

    let bytes = rig.broker.published()[0].len();
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::Published {
            topic: "home/kitchen/climate".into(),
            bytes,
        })
    );
}

#[test]
fn transport_error_is_reported_not_raised() {
    let mut rig = Rig::new(false, 1, 0);
    rig.connect_now();
    let now = rig.clock.now();
    rig.publisher.publish_once(
        &now,
        &mut RejectingBroker,
        &mut rig.sink,
    );
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::PublishFailed(PublishError::Transport(BrokerError::PublishFailed)))
    );
}

/// Session reports up but rejects every publish.
struct RejectingBroker;

impl BrokerPort for RejectingBroker {
    fn is_connected(&self) -> bool {
        true
    }
    fn connect(&mut self) -> Result<(), BrokerError> {
        Ok(())
    }
    fn disconnect(&mut self) {}
    fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), BrokerError> {
        Err(BrokerError::PublishFailed)
    }
}
