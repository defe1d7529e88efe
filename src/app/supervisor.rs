//! Connectivity supervisor — owns the WiFi link and the MQTT session.
//!
//! ```text
//!              associate (retry per policy)          connect (one attempt)
//! Disconnected ────────────────────────────▶ WifiOnly ─────────────────────▶ Ready
//!      ▲                                        ▲                              │
//!      │            link lost                   │        session lost          │
//!      └────────────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! A session handle is never reused across link associations: losing the
//! link tears the broker session down before re-associating, and a lost
//! session is torn down before the next connect attempt.

use core::num::NonZeroU32;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::NetworkConfig;
use crate::error::ConnectError;

use super::ports::{BrokerPort, LinkPort};

/// Cached connection lifecycle state.  Only [`ConnectivitySupervisor::ensure_connected`]
/// mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    WifiOnly,
    Ready,
}

/// Result of a successful [`ConnectivitySupervisor::ensure_connected`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Link and session were already usable; nothing was done.
    AlreadyReady,
    /// Ready was just re-established after being non-Ready.
    Restored,
}

/// How hard to try associating with the access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationPolicy {
    /// `None` retries forever.
    pub max_attempts: Option<NonZeroU32>,
    pub retry_delay_ms: u32,
}

impl Default for AssociationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            retry_delay_ms: Self::RETRY_DELAY_MS,
        }
    }
}

impl AssociationPolicy {
    /// Pause between failed association attempts.  Sits alongside
    /// [`TICK_PERIOD_MS`](crate::scheduler::TICK_PERIOD_MS) and
    /// [`CONNECT_BACKOFF_MS`](crate::scheduler::CONNECT_BACKOFF_MS).
    pub const RETRY_DELAY_MS: u32 = 1_000;

    pub fn from_config(network: &NetworkConfig) -> Self {
        Self {
            max_attempts: network.max_attempts,
            ..Self::default()
        }
    }
}

pub struct ConnectivitySupervisor<L, B, D> {
    link: L,
    broker: B,
    delay: D,
    policy: AssociationPolicy,
    state: ConnectionState,
}

impl<L: LinkPort, B: BrokerPort, D: DelayNs> ConnectivitySupervisor<L, B, D> {
    pub fn new(link: L, broker: B, delay: D, policy: AssociationPolicy) -> Self {
        Self {
            link,
            broker,
            delay,
            policy,
            state: ConnectionState::Disconnected,
        }
    }

    /// True only when both the link and the broker session are up.
    ///
    /// Queries the adapters directly so a silent drop is noticed on the
    /// next tick, not just after the cached state changes.
    pub fn is_network_ready(&self) -> bool {
        self.link.is_associated() && self.broker.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// State as the adapters report it right now, without touching the cache.
    pub fn observed_state(&self) -> ConnectionState {
        match (self.link.is_associated(), self.broker.is_connected()) {
            (true, true) => ConnectionState::Ready,
            (true, false) => ConnectionState::WifiOnly,
            (false, _) => ConnectionState::Disconnected,
        }
    }

    /// Bring the link and the session up, called once per tick.
    ///
    /// Link association is retried according to the [`AssociationPolicy`]
    /// (forever by default).  The broker session gets exactly one attempt;
    /// failure is reported as [`ConnectError::BrokerUnavailable`] so the
    /// caller can back off.
    pub fn ensure_connected(&mut self) -> Result<ConnectOutcome, ConnectError> {
        if self.is_network_ready() {
            self.state = ConnectionState::Ready;
            return Ok(ConnectOutcome::AlreadyReady);
        }

        if self.state == ConnectionState::Ready {
            warn!("Supervisor: readiness lost");
        }

        if !self.link.is_associated() {
            // Sessions never outlive the association they were made under.
            self.broker.disconnect();
            self.state = ConnectionState::Disconnected;
            self.associate()?;
        }
        self.state = ConnectionState::WifiOnly;

        // Drop the stale or partial session before a fresh attempt.
        self.broker.disconnect();
        if let Err(e) = self.broker.connect() {
            warn!("Supervisor: broker connect failed ({})", e);
            return Err(ConnectError::BrokerUnavailable);
        }

        self.state = ConnectionState::Ready;
        info!("Supervisor: network ready");
        Ok(ConnectOutcome::Restored)
    }

    /// Mutable access to the session, for publishing.
    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    fn associate(&mut self) -> Result<(), ConnectError> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            info!(
                "Supervisor: associating with '{}' (attempt {})",
                self.link.ssid(),
                attempts
            );
            match self.link.associate() {
                Ok(()) => {
                    info!("Supervisor: link up after {} attempt(s)", attempts);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Supervisor: association failed ({})", e);
                    if let Some(max) = self.policy.max_attempts {
                        if attempts >= max.get() {
                            return Err(ConnectError::LinkUnavailable { attempts });
                        }
                    }
                    self.delay.delay_ms(self.policy.retry_delay_ms);
                }
            }
        }
    }
}
