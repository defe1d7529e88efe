//! Device configuration
//!
//! A single immutable [`TelemetryConfig`] is loaded once at startup and
//! handed by reference to each component constructor.  The JSON keys match
//! the `config.json` layout already deployed on devices.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_MQTT_PORT: u16 = 1883;

/// WiFi station credentials and association policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(rename = "WIFI_SSID")]
    pub ssid: String,
    #[serde(rename = "WIFI_PASSWORD")]
    pub password: String,
    /// Upper bound on association attempts per reconnect; absent = retry forever.
    #[serde(rename = "WIFI_MAX_ATTEMPTS", default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<NonZeroU32>,
}

/// MQTT broker endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(rename = "MQTT_IP")]
    pub host: String,
    #[serde(rename = "MQTT_PORT", default = "default_mqtt_port")]
    pub port: u16,
    #[serde(rename = "MQTT_USER")]
    pub user: String,
    #[serde(rename = "MQTT_PASS")]
    pub password: String,
    #[serde(rename = "MQTT_CLIENT_ID", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

fn default_mqtt_port() -> u16 {
    DEFAULT_MQTT_PORT
}

impl BrokerConfig {
    /// `mqtt://host:port` URL for the transport.
    pub fn url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

/// Who this device is and where it publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    #[serde(rename = "NAME_DEVICE")]
    pub name: String,
    #[serde(rename = "POSITION")]
    pub position: String,
    #[serde(rename = "DEV_TOPIC")]
    pub topic: String,
}

/// Publish cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Defer the first publish until a zero-second boundary.
    #[serde(rename = "SYNC_SEND_DATA")]
    pub sync_to_minute: bool,
    #[serde(rename = "INTERVAL_SEND_DATA")]
    pub interval_seconds: NonZeroU32,
}

/// Complete device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(flatten)]
    pub network: NetworkConfig,
    #[serde(flatten)]
    pub broker: BrokerConfig,
    #[serde(flatten)]
    pub device: DeviceIdentity,
    #[serde(flatten)]
    pub schedule: ScheduleConfig,
    /// GPIO the DHT22 data line is wired to.
    #[serde(rename = "DHT22_PIN")]
    pub sensor_pin: i32,
    /// Local time offset from UTC in whole hours.
    #[serde(rename = "GMT")]
    pub utc_offset_hours: i8,
}

impl TelemetryConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field the core depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ssid(&self.network.ssid)?;
        validate_password(&self.network.password)?;
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::ValidationFailed("GMT must be -12..=14"));
        }
        if self.broker.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("MQTT_IP must not be empty"));
        }
        if self.broker.port == 0 {
            return Err(ConfigError::ValidationFailed("MQTT_PORT must be non-zero"));
        }
        if self.device.name.is_empty() {
            return Err(ConfigError::ValidationFailed("NAME_DEVICE must not be empty"));
        }
        if self.device.topic.is_empty() || self.device.topic.contains(['#', '+']) {
            return Err(ConfigError::ValidationFailed(
                "DEV_TOPIC must be a non-empty topic without wildcards",
            ));
        }
        if !(0..=48).contains(&self.sensor_pin) {
            return Err(ConfigError::ValidationFailed("DHT22_PIN must be 0..=48"));
        }
        Ok(())
    }

    /// MQTT client id: explicit override or the device name.
    pub fn client_id(&self) -> &str {
        self.broker
            .client_id
            .as_deref()
            .unwrap_or(&self.device.name)
    }
}

// ───────────────────────────────────────────────────────────────
// Credential validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConfigError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConfigError::ValidationFailed(
            "WIFI_SSID must be 1-32 printable ASCII bytes",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConfigError> {
    // Open networks have no password.
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConfigError::ValidationFailed(
            "WIFI_PASSWORD must be empty or 8-64 bytes",
        ));
    }
    Ok(())
}
