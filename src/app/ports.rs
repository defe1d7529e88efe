//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Supervisor / Scheduler / Publisher (domain)
//! ```
//!
//! The WiFi driver, MQTT transport, DHT22 bus protocol, wall clock and
//! configuration store are collaborators, not part of the core.  Adapters
//! in [`crate::adapters`] and [`crate::sensors`] implement these traits;
//! integration tests substitute recording mocks.
//!
//! Blocking waits go through [`embedded_hal::delay::DelayNs`] rather than a
//! port of our own.

use crate::config::TelemetryConfig;
use crate::error::{BrokerError, ConfigError, LinkError, SensorError};
use crate::telemetry::LocalTime;

// ───────────────────────────────────────────────────────────────
// Link port (WiFi station)
// ───────────────────────────────────────────────────────────────

pub trait LinkPort {
    /// Whether the station is currently associated and has an IP.
    fn is_associated(&self) -> bool;

    /// Make one association attempt.  Retrying is the caller's decision.
    fn associate(&mut self) -> Result<(), LinkError>;

    /// SSID this link associates with (for logging).
    fn ssid(&self) -> &str;
}

// ───────────────────────────────────────────────────────────────
// Broker port (MQTT session)
// ───────────────────────────────────────────────────────────────

pub trait BrokerPort {
    /// Whether a usable session exists.
    fn is_connected(&self) -> bool;

    /// Make exactly one session-establish attempt.
    fn connect(&mut self) -> Result<(), BrokerError>;

    /// Drop any session object, complete or partial.
    ///
    /// Must be idempotent: calling it with no session is a no-op.
    fn disconnect(&mut self);

    /// Submit one message on `topic`.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (temperature + humidity)
// ───────────────────────────────────────────────────────────────

/// One DHT22 measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub trait SensorPort {
    /// Trigger a measurement and return the fresh values.
    fn measure(&mut self) -> Result<Measurement, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Current local wall-clock time (timezone offset already applied).
    fn now(&self) -> LocalTime;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the device configuration once at startup.
pub trait ConfigPort {
    /// `Ok(None)` when no configuration source is present.
    fn load(&self) -> Result<Option<TelemetryConfig>, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
