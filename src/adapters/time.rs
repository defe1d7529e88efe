//! Wall-clock and delay adapters.
//!
//! - [`SystemClock`] implements [`ClockPort`]: UTC from the system clock
//!   (kept by SNTP on the device) shifted by the configured `GMT` offset.
//! - [`StdDelay`] implements [`DelayNs`] with `std::thread::sleep`.  On the
//!   device the FreeRTOS delay from `esp-idf-hal` is used instead.

use chrono::{FixedOffset, Utc};
use embedded_hal::delay::DelayNs;

use crate::app::ports::ClockPort;
use crate::error::ConfigError;
use crate::telemetry::LocalTime;

/// System wall clock with a fixed timezone offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(utc_offset_hours: i8) -> Result<Self, ConfigError> {
        let offset = FixedOffset::east_opt(i32::from(utc_offset_hours) * 3600)
            .ok_or(ConfigError::ValidationFailed("GMT offset out of range"))?;
        Ok(Self { offset })
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> LocalTime {
        LocalTime::from_datetime(&Utc::now().with_timezone(&self.offset))
    }
}

/// Blocking delay backed by the OS scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
