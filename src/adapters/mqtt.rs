//! MQTT session adapter.
//!
//! Implements [`BrokerPort`].  A session is created by `connect` and
//! destroyed by `disconnect`; the adapter never reconnects on its own, so
//! the supervisor stays the only place that decides when to retry.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with an event callback that
//!   tracks the connected flag.  Dropping the client stops the ESP-MQTT task,
//!   which is how a partial session is torn down.
//! - **all other targets**: in-memory simulation that logs published payloads.

use log::{debug, info, warn};

use crate::app::ports::BrokerPort;
use crate::config::TelemetryConfig;
use crate::error::BrokerError;

#[cfg(target_os = "espidf")]
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

/// How long `connect` waits for the CONNACK.
#[cfg(target_os = "espidf")]
const CONNECT_TIMEOUT_MS: u32 = 5_000;
#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u32 = 100;

#[cfg(target_os = "espidf")]
struct Session {
    client: EspMqttClient<'static>,
    connected: Arc<AtomicBool>,
}

pub struct MqttAdapter {
    url: String,
    client_id: String,
    username: String,
    password: String,
    #[cfg(target_os = "espidf")]
    session: Option<Session>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u32,
}

impl MqttAdapter {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            url: config.broker.url(),
            client_id: config.client_id().to_string(),
            username: config.broker.user.clone(),
            password: config.broker.password.clone(),
            #[cfg(target_os = "espidf")]
            session: None,
            #[cfg(not(target_os = "espidf"))]
            sim_connected: false,
            #[cfg(not(target_os = "espidf"))]
            sim_attempts: 0,
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), BrokerError> {
        use esp_idf_hal::delay::FreeRtos;

        let conf = MqttClientConfiguration {
            client_id: Some(&self.client_id),
            username: (!self.username.is_empty()).then_some(self.username.as_str()),
            password: (!self.password.is_empty()).then_some(self.password.as_str()),
            ..Default::default()
        };

        let connected = Arc::new(AtomicBool::new(false));
        let flag = connected.clone();
        let client = EspMqttClient::new_cb(&self.url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => flag.store(true, Ordering::Release),
            EventPayload::Disconnected => flag.store(false, Ordering::Release),
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT(espidf): client init failed ({:?})", e);
            BrokerError::ConnectFailed
        })?;

        let mut waited = 0;
        while !connected.load(Ordering::Acquire) {
            if waited >= CONNECT_TIMEOUT_MS {
                // `client` drops here, stopping the half-open session.
                return Err(BrokerError::ConnectFailed);
            }
            FreeRtos::delay_ms(CONNECT_POLL_MS);
            waited += CONNECT_POLL_MS;
        }

        self.session = Some(Session { client, connected });
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), BrokerError> {
        self.sim_attempts = self.sim_attempts.wrapping_add(1);
        // Every 10th attempt is refused to exercise the backoff path.
        if self.sim_attempts % 10 == 3 {
            warn!("MQTT(sim): simulated CONNACK refusal (attempt {})", self.sim_attempts);
            return Err(BrokerError::ConnectFailed);
        }
        self.sim_connected = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        self.session = None;
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_connected = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.connected.load(Ordering::Acquire))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let session = self.session.as_mut().ok_or(BrokerError::NotConnected)?;
        session
            .client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT(espidf): publish rejected ({:?})", e);
                BrokerError::PublishFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        if !self.sim_connected {
            return Err(BrokerError::NotConnected);
        }
        info!("MQTT(sim): {} <- {}", topic, String::from_utf8_lossy(payload));
        Ok(())
    }

    /// Simulation: lose the session as if the broker closed the socket.
    #[cfg(all(test, not(target_os = "espidf")))]
    fn sim_drop(&mut self) {
        info!("MQTT(sim): session dropped by broker");
        self.sim_connected = false;
    }
}

// ───────────────────────────────────────────────────────────────
// BrokerPort
// ───────────────────────────────────────────────────────────────

impl BrokerPort for MqttAdapter {
    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn connect(&mut self) -> Result<(), BrokerError> {
        info!("MQTT: connecting to {} as '{}'", self.url, self.client_id);
        self.platform_connect()?;
        info!("MQTT: session established");
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.platform_is_connected() {
            info!("MQTT: closing session");
        }
        self.platform_disconnect();
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        debug!("MQTT: publish {} bytes to '{}'", payload.len(), topic);
        self.platform_publish(topic, payload)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
