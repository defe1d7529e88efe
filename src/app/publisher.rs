//! Sensor publisher — one sample-and-publish cycle.
//!
//! `publish_once` never returns an error: a flaky sensor read or a rejected
//! publish is logged, reported on the event sink, and the loop moves on to
//! the next scheduled tick.

use log::{debug, warn};

use crate::config::DeviceIdentity;
use crate::error::{PublishError, SensorError};
use crate::telemetry::{LocalTime, TelemetryRecord};

use super::events::AppEvent;
use super::ports::{BrokerPort, EventSink, Measurement, SensorPort};

pub struct SensorPublisher<S> {
    sensor: S,
    identity: DeviceIdentity,
}

impl<S: SensorPort> SensorPublisher<S> {
    pub fn new(sensor: S, identity: &DeviceIdentity) -> Self {
        Self {
            sensor,
            identity: identity.clone(),
        }
    }

    /// Sample the sensor and publish one record stamped with `now`.
    pub fn publish_once(
        &mut self,
        now: &LocalTime,
        broker: &mut impl BrokerPort,
        sink: &mut impl EventSink,
    ) {
        match self.try_publish(now, broker) {
            Ok(bytes) => {
                debug!("Publisher: {} bytes to '{}'", bytes, self.identity.topic);
                sink.emit(&AppEvent::Published {
                    topic: self.identity.topic.clone(),
                    bytes,
                });
            }
            Err(e) => {
                warn!("Publisher: unable to send ({})", e);
                sink.emit(&AppEvent::PublishFailed(e));
            }
        }
    }

    fn try_publish(
        &mut self,
        now: &LocalTime,
        broker: &mut impl BrokerPort,
    ) -> Result<usize, PublishError> {
        let Measurement {
            temperature_c,
            humidity_pct,
        } = self.sensor.measure()?;
        if !temperature_c.is_finite() || !humidity_pct.is_finite() {
            return Err(SensorError::OutOfRange.into());
        }

        let record = TelemetryRecord::new(
            &self.identity.name,
            &self.identity.position,
            *now,
            temperature_c,
            humidity_pct,
        );
        let payload = record.to_json()?;
        broker.publish(&self.identity.topic, payload.as_bytes())?;
        Ok(payload.len())
    }
}
