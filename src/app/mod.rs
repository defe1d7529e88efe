//! Application core — pure domain logic, zero I/O.
//!
//! Connection supervision and the sample-and-publish cycle.  All
//! interaction with the radio, the broker, the sensor and the clock
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod publisher;
pub mod supervisor;
