//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `config_file`  | ConfigPort         | JSON file on SPIFFS/host |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `mqtt`         | BrokerPort         | ESP-MQTT client          |
//! | `time`         | ClockPort, DelayNs | System clock (SNTP)      |
//! | `wifi`         | LinkPort           | ESP-IDF WiFi STA         |

pub mod config_file;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
