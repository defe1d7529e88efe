//! DHT22 Telemetry Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter   MqttAdapter   Dht22Sensor   SystemClock         │
//! │  (LinkPort)    (BrokerPort)  (SensorPort)  (ClockPort)         │
//! │  FileConfigLoader (ConfigPort)   LogEventSink (EventSink)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │ TelemetryScheduler ─▶ ConnectivitySupervisor           │    │
//! │  │                    └▶ SensorPublisher                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the host the same wiring runs against the simulation backends.
#![deny(unused_must_use)]

use anyhow::{Context, Result, anyhow};
use log::info;

use dht_telemetry::adapters::config_file::FileConfigLoader;
use dht_telemetry::adapters::log_sink::LogEventSink;
use dht_telemetry::adapters::mqtt::MqttAdapter;
use dht_telemetry::adapters::time::SystemClock;
use dht_telemetry::adapters::wifi::WifiAdapter;
use dht_telemetry::app::ports::ConfigPort;
use dht_telemetry::app::publisher::SensorPublisher;
use dht_telemetry::app::supervisor::{AssociationPolicy, ConnectivitySupervisor};
use dht_telemetry::config::TelemetryConfig;
use dht_telemetry::scheduler::TelemetryScheduler;
use dht_telemetry::sensors::Dht22Sensor;

#[cfg(target_os = "espidf")]
const CONFIG_PATH: &str = "/spiffs/config.json";
#[cfg(not(target_os = "espidf"))]
const CONFIG_PATH: &str = "config.json";

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_platform()?;

    info!("DHT Telemetry v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration (immutable from here on) ─────────────
    let config_path = std::env::var("DHT_TELEMETRY_CONFIG").unwrap_or_else(|_| CONFIG_PATH.into());
    let config = FileConfigLoader::new(&config_path)
        .load()
        .with_context(|| format!("loading {config_path}"))?
        .ok_or_else(|| anyhow!("no configuration present at {config_path}"))?;
    info!(
        "Device '{}' at '{}' -> topic '{}'",
        config.device.name, config.device.position, config.device.topic
    );

    // ── 2. Construct adapters ─────────────────────────────────
    let link = build_link(&config)?;
    let broker = MqttAdapter::new(&config);
    let sensor = Dht22Sensor::new(config.sensor_pin)
        .map_err(|e| anyhow!("DHT22 on GPIO{}: {e}", config.sensor_pin))?;
    let clock = SystemClock::new(config.utc_offset_hours)?;
    let mut sink = LogEventSink::new();

    // ── 3. Construct the core ─────────────────────────────────
    let mut supervisor = ConnectivitySupervisor::new(
        link,
        broker,
        platform_delay(),
        AssociationPolicy::from_config(&config.network),
    );
    let mut publisher = SensorPublisher::new(sensor, &config.device);
    let mut scheduler = TelemetryScheduler::new(&config.schedule);
    let mut delay = platform_delay();

    info!("System ready. Entering supervisory loop.");

    // ── 4. Supervisory loop ───────────────────────────────────
    scheduler.run(&mut supervisor, &mut publisher, &clock, &mut delay, &mut sink)
}

// ── Platform wiring ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_platform() -> Result<()> {
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;
    mount_spiffs()
}

#[cfg(not(target_os = "espidf"))]
fn init_platform() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

/// Mount the data partition holding `config.json` at `/spiffs`.
#[cfg(target_os = "espidf")]
fn mount_spiffs() -> Result<()> {
    use esp_idf_sys::{ESP_OK, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

    let conf = esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: false,
    };
    // SAFETY: called once from the main task before any file access; the
    // C strings are 'static.
    let ret = unsafe { esp_vfs_spiffs_register(&conf) };
    if ret != ESP_OK {
        return Err(anyhow!("SPIFFS mount failed ({ret})"));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
fn build_link(config: &TelemetryConfig) -> Result<WifiAdapter> {
    use esp_idf_hal::prelude::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?;
    let wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;
    WifiAdapter::new(wifi, &config.network).map_err(|e| anyhow!("WiFi: {e}"))
}

#[cfg(not(target_os = "espidf"))]
fn build_link(config: &TelemetryConfig) -> Result<WifiAdapter> {
    WifiAdapter::new(&config.network).map_err(|e| anyhow!("WiFi: {e}"))
}

#[cfg(target_os = "espidf")]
fn platform_delay() -> esp_idf_hal::delay::FreeRtos {
    esp_idf_hal::delay::FreeRtos
}

#[cfg(not(target_os = "espidf"))]
fn platform_delay() -> dht_telemetry::adapters::time::StdDelay {
    dht_telemetry::adapters::time::StdDelay
}
