//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the supervisory loop
//! against mock adapters and virtual time.  All tests run on the host
//! (x86_64) with no real hardware required.

#![cfg(not(target_os = "espidf"))]

mod publisher_tests;
mod scheduler_tests;
mod supervisor_tests;
