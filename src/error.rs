//! Error types for the telemetry firmware.
//!
//! One small enum per capability boundary, each with a hand-written
//! `Display`.  Only [`ConnectError`] is observable by the scheduler; every
//! other error is consumed inside the operation that produced it.

use core::fmt;

// ---------------------------------------------------------------------------
// Link (WiFi association) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The station could not associate with the access point.
    AssociationFailed,
    /// The driver rejected the stored credentials.
    InvalidCredentials,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssociationFailed => write!(f, "WiFi association failed"),
            Self::InvalidCredentials => write!(f, "WiFi credentials rejected"),
        }
    }
}

impl std::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Broker (MQTT session) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// Session establishment was refused or timed out.
    ConnectFailed,
    /// An operation needed a session but none exists.
    NotConnected,
    /// The transport rejected the outgoing message.
    PublishFailed,
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "MQTT connect failed"),
            Self::NotConnected => write!(f, "MQTT session not established"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl std::error::Error for BrokerError {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not answer the start signal.
    Timeout,
    /// The 40-bit frame failed its checksum.
    Checksum,
    /// GPIO could not be driven or sampled.
    Gpio,
    /// The reading is not a finite number.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "sensor timeout"),
            Self::Checksum => write!(f, "sensor checksum mismatch"),
            Self::Gpio => write!(f, "sensor GPIO error"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Publish cycle errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong inside one sample-and-publish cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    Sensor(SensorError),
    /// The record could not be serialised.
    Encode(String),
    Transport(BrokerError),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Encode(msg) => write!(f, "encode: {msg}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for PublishError {}

impl From<SensorError> for PublishError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<BrokerError> for PublishError {
    fn from(e: BrokerError) -> Self {
        Self::Transport(e)
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Connectivity supervisor errors
// ---------------------------------------------------------------------------

/// Signals from [`ConnectivitySupervisor::ensure_connected`](crate::app::supervisor::ConnectivitySupervisor::ensure_connected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The link is up but the single session-establish attempt failed.
    BrokerUnavailable,
    /// A bounded association policy ran out of attempts.
    LinkUnavailable { attempts: u32 },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokerUnavailable => write!(f, "broker unavailable"),
            Self::LinkUnavailable { attempts } => {
                write!(f, "link unavailable after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for ConnectError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON or lacks a required key.
    Malformed(String),
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// The configuration source exists but could not be read.
    Io(std::io::ErrorKind),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "config malformed: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Io(kind) => write!(f, "config I/O error: {kind}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
