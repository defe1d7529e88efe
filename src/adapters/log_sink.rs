//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                interval_secs,
                sync_to_minute,
            } => {
                info!(
                    "START | interval={}s | sync_to_minute={}",
                    interval_secs, sync_to_minute
                );
            }
            AppEvent::ConnectivityLost(state) => {
                warn!("NET   | lost (observed {:?})", state);
            }
            AppEvent::NetworkReady => {
                info!("NET   | ready");
            }
            AppEvent::ConnectFailed {
                error,
                backoff_secs,
            } => {
                warn!("NET   | {} | retry in {}s", error, backoff_secs);
            }
            AppEvent::PhaseLocked { minute } => {
                info!("SCHED | phase locked at minute {:02}", minute);
            }
            AppEvent::Published { topic, bytes } => {
                info!("PUB   | {} | {} bytes", topic, bytes);
            }
            AppEvent::PublishFailed(e) => {
                warn!("PUB   | unable to send `{}`", e);
            }
        }
    }
}
