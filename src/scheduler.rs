//! Telemetry scheduler — the 1 Hz supervisory loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ every 1 s                                                    │
//! │                                                              │
//! │  network ready? ──no──▶ ensure_connected ──err──▶ back off   │
//! │       │                       │ ok                  10 s     │
//! │       ▼ yes                   ▼                              │
//! │  read (minute, second) ◀──────┘                              │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  sync_to_minute && !phase_locked?                            │
//! │       │ yes: second == 0 ? lock : wait                       │
//! │       ▼                                                      │
//! │  second % interval == 0 ──yes──▶ SensorPublisher             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Phase lock defers the first publish after every (re)connect to a
//! minute boundary, so devices that rebooted at different moments still
//! publish on a shared cadence.  After locking, the modulo test free-runs;
//! an interval that does not divide 60 is not rounded.

use core::num::NonZeroU32;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{BrokerPort, ClockPort, EventSink, LinkPort, SensorPort};
use crate::app::publisher::SensorPublisher;
use crate::app::supervisor::{ConnectOutcome, ConnectionState, ConnectivitySupervisor};
use crate::config::ScheduleConfig;

/// Period of one tick.
pub const TICK_PERIOD_MS: u32 = 1_000;

/// Stall after a failed reconnect, so a down broker is not hammered.
pub const CONNECT_BACKOFF_MS: u32 = 10_000;

/// Where the loop stands with respect to publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not (yet) Ready; no sampling happens.
    AwaitingNetwork,
    /// Ready, waiting for the next zero-second boundary.
    AwaitingPhaseLock,
    /// Publishing whenever `second % interval == 0`.
    Armed,
}

/// What the phase/interval policy decided for one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseDecision {
    /// Not phase-locked and not on a zero-second boundary.
    Wait,
    /// Aligned, but this second is not on the interval.
    Skip,
    Publish,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Reconnection failed; the rest of the tick was skipped.
    BackedOff,
    AwaitingPhaseLock,
    Idle,
    /// The publisher ran (its own failures are reported separately).
    Published,
}

pub struct TelemetryScheduler {
    sync_to_minute: bool,
    interval_secs: NonZeroU32,
    phase_locked: bool,
    state: SchedulerState,
}

impl TelemetryScheduler {
    pub fn new(schedule: &ScheduleConfig) -> Self {
        Self {
            sync_to_minute: schedule.sync_to_minute,
            interval_secs: schedule.interval_seconds,
            phase_locked: false,
            state: SchedulerState::AwaitingNetwork,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_phase_locked(&self) -> bool {
        self.phase_locked
    }

    /// Apply the alignment/interval policy for `second`.
    ///
    /// Acquires the phase lock when waiting and `second == 0`; the modulo
    /// test then runs on the same call.
    pub fn evaluate(&mut self, second: u8) -> PhaseDecision {
        if self.sync_to_minute && !self.phase_locked {
            if second != 0 {
                self.state = SchedulerState::AwaitingPhaseLock;
                return PhaseDecision::Wait;
            }
            self.phase_locked = true;
        }
        self.state = SchedulerState::Armed;

        if u32::from(second) % self.interval_secs.get() == 0 {
            PhaseDecision::Publish
        } else {
            PhaseDecision::Skip
        }
    }

    /// Run one tick: supervise connectivity, then maybe publish.
    pub fn tick(
        &mut self,
        supervisor: &mut ConnectivitySupervisor<impl LinkPort, impl BrokerPort, impl DelayNs>,
        publisher: &mut SensorPublisher<impl SensorPort>,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        if !supervisor.is_network_ready() {
            self.on_connectivity_lost(supervisor.observed_state(), sink);

            match supervisor.ensure_connected() {
                Ok(ConnectOutcome::Restored) => {
                    self.phase_locked = false;
                    sink.emit(&AppEvent::NetworkReady);
                }
                Ok(ConnectOutcome::AlreadyReady) => {}
                Err(error) => {
                    warn!(
                        "Scheduler: reconnect failed ({}), backing off {} s",
                        error,
                        CONNECT_BACKOFF_MS / 1000
                    );
                    sink.emit(&AppEvent::ConnectFailed {
                        error,
                        backoff_secs: CONNECT_BACKOFF_MS / 1000,
                    });
                    return TickOutcome::BackedOff;
                }
            }
        }

        let now = clock.now();
        let was_locked = self.phase_locked;
        let decision = self.evaluate(now.second);
        if self.phase_locked && !was_locked {
            info!("Scheduler: phase locked at {:02}:{:02}", now.minute, now.second);
            sink.emit(&AppEvent::PhaseLocked { minute: now.minute });
        }

        match decision {
            PhaseDecision::Wait => TickOutcome::AwaitingPhaseLock,
            PhaseDecision::Skip => TickOutcome::Idle,
            PhaseDecision::Publish => {
                publisher.publish_once(&now, supervisor.broker_mut(), sink);
                TickOutcome::Published
            }
        }
    }

    /// Sleep one tick period, run the tick, and stall for the backoff when
    /// the tick backed off.
    pub fn step(
        &mut self,
        supervisor: &mut ConnectivitySupervisor<impl LinkPort, impl BrokerPort, impl DelayNs>,
        publisher: &mut SensorPublisher<impl SensorPort>,
        clock: &impl ClockPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        delay.delay_ms(TICK_PERIOD_MS);
        let outcome = self.tick(supervisor, publisher, clock, sink);
        if outcome == TickOutcome::BackedOff {
            delay.delay_ms(CONNECT_BACKOFF_MS);
        }
        outcome
    }

    /// The supervisory loop.  Never returns.
    pub fn run(
        &mut self,
        supervisor: &mut ConnectivitySupervisor<impl LinkPort, impl BrokerPort, impl DelayNs>,
        publisher: &mut SensorPublisher<impl SensorPort>,
        clock: &impl ClockPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> ! {
        sink.emit(&AppEvent::Started {
            interval_secs: self.interval_secs.get(),
            sync_to_minute: self.sync_to_minute,
        });
        loop {
            self.step(supervisor, publisher, clock, delay, sink);
        }
    }

    fn on_connectivity_lost(
        &mut self,
        observed: ConnectionState,
        sink: &mut impl EventSink,
    ) {
        self.phase_locked = false;
        if self.state != SchedulerState::AwaitingNetwork {
            info!("Scheduler: connectivity lost, phase lock cleared");
            sink.emit(&AppEvent::ConnectivityLost(observed));
            self.state = SchedulerState::AwaitingNetwork;
        }
    }
}
