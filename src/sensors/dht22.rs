//! DHT22 (AM2302) temperature/humidity sensor.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the single-wire protocol is driven by the `dht-sensor` crate
//! on an open-drain GPIO with the ROM busy-wait delay.
//! On host/test: reads from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(not(target_os = "espidf"))]
use log::debug;

use crate::app::ports::{Measurement, SensorPort};
use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    delay::Ets,
    gpio::{AnyIOPin, InputOutput, PinDriver, Pull},
};

// ── Simulation backend ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41AC_0000); // 21.5 °C
#[cfg(not(target_os = "espidf"))]
static SIM_HUMIDITY_BITS: AtomicU32 = AtomicU32::new(0x4240_0000); // 48.0 %
#[cfg(not(target_os = "espidf"))]
static SIM_FAIL_NEXT: AtomicBool = AtomicBool::new(false);

#[cfg(all(test, not(target_os = "espidf")))]
fn sim_set_reading(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Make the next measurement fail with a checksum error.
#[cfg(all(test, not(target_os = "espidf")))]
fn sim_fail_next() {
    SIM_FAIL_NEXT.store(true, Ordering::Relaxed);
}

// ── Driver ────────────────────────────────────────────────────

pub struct Dht22Sensor {
    #[cfg(target_os = "espidf")]
    pin: PinDriver<'static, AnyIOPin, InputOutput>,
    #[cfg(target_os = "espidf")]
    delay: Ets,
}

impl Dht22Sensor {
    #[cfg(target_os = "espidf")]
    pub fn new(gpio: i32) -> Result<Self, SensorError> {
        // SAFETY: the pin number comes from validated configuration and no
        // other driver in the firmware claims it.
        let raw = unsafe { AnyIOPin::new(gpio) };
        let mut pin = PinDriver::input_output_od(raw).map_err(|_| SensorError::Gpio)?;
        pin.set_pull(Pull::Up).map_err(|_| SensorError::Gpio)?;
        // Idle high until the first start signal.
        pin.set_high().map_err(|_| SensorError::Gpio)?;
        Ok(Self { pin, delay: Ets })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(gpio: i32) -> Result<Self, SensorError> {
        debug!("DHT22(sim): GPIO{} simulated", gpio);
        Ok(Self {})
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<Measurement, SensorError> {
        use dht_sensor::{DhtError, DhtReading, dht22};

        match dht22::Reading::read(&mut self.delay, &mut self.pin) {
            Ok(r) => Ok(Measurement {
                temperature_c: r.temperature,
                humidity_pct: r.relative_humidity,
            }),
            Err(DhtError::Timeout) => Err(SensorError::Timeout),
            Err(DhtError::ChecksumMismatch) => Err(SensorError::Checksum),
            Err(DhtError::PinError(_)) => Err(SensorError::Gpio),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&mut self) -> Result<Measurement, SensorError> {
        if SIM_FAIL_NEXT.swap(false, Ordering::Relaxed) {
            return Err(SensorError::Checksum);
        }
        Ok(Measurement {
            temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUMIDITY_BITS.load(Ordering::Relaxed)),
        })
    }
}

impl SensorPort for Dht22Sensor {
    fn measure(&mut self) -> Result<Measurement, SensorError> {
        self.read_frame()
    }
}
