//! Sensor drivers implementing [`SensorPort`](crate::app::ports::SensorPort).

pub mod dht22;

pub use dht22::Dht22Sensor;
