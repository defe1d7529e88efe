//! Fuzz target: `TelemetryConfig::from_json`
//!
//! Feeds arbitrary text into the configuration loader and asserts that it
//! never panics and that anything it accepts passes validation and
//! survives a serialise/parse cycle unchanged.
//!
//! cargo fuzz run fuzz_config_parse

#![no_main]

use dht_telemetry::config::TelemetryConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = TelemetryConfig::from_json(text) {
        assert!(config.validate().is_ok());
        let json = serde_json::to_string(&config).expect("accepted config serialises");
        let again = TelemetryConfig::from_json(&json).expect("serialised config parses");
        assert_eq!(again, config);
    }
});
