//! Outbound application events.
//!
//! The supervisor loop and publisher emit these through the
//! [`EventSink`](super::ports::EventSink) port.  This is the side-channel
//! where failures that must not stop the loop get reported.

use crate::app::supervisor::ConnectionState;
use crate::error::{ConnectError, PublishError};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop is about to run its first tick.
    Started { interval_secs: u32, sync_to_minute: bool },

    /// Readiness was lost; carries the state observed before reconnecting.
    ConnectivityLost(ConnectionState),

    /// Link and broker session were (re)established.
    NetworkReady,

    /// Reconnection failed and the loop is backing off.
    ConnectFailed { error: ConnectError, backoff_secs: u32 },

    /// A zero-second boundary was reached; cadence is now aligned.
    PhaseLocked { minute: u8 },

    /// A reading was handed to the broker.
    Published { topic: String, bytes: usize },

    /// A sample-and-publish cycle failed and was skipped.
    PublishFailed(PublishError),
}
