//! Wire data model for published readings.
//!
//! ```text
//! {
//!   "name": "dht-kitchen",
//!   "position": "kitchen",
//!   "date": [2024, 3, 9, 14, 2, 0, 5, 69],
//!   "temperature": "21.4",
//!   "humidity": "48.0"
//! }
//! ```
//!
//! Sensor values travel as decimal text, not JSON numbers.  Existing
//! subscribers parse them as strings, so the encoding must not change.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::{Serialize, Serializer};

use crate::error::PublishError;

/// Broken-down local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub year: i32,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// 0 = Monday … 6 = Sunday.
    pub weekday: u8,
    /// 1-366
    pub yearday: u16,
}

impl LocalTime {
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            year: dt.year(),
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            // Leap seconds are reported as second 59.
            second: dt.second().min(59) as u8,
            weekday: dt.weekday().num_days_from_monday() as u8,
            yearday: dt.ordinal() as u16,
        }
    }
}

/// Serialised as the 8-element tuple subscribers expect.
impl Serialize for LocalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.weekday,
            self.yearday,
        )
            .serialize(serializer)
    }
}

/// One temperature/humidity sample, built fresh for each publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord<'a> {
    pub name: &'a str,
    pub position: &'a str,
    pub date: LocalTime,
    pub temperature: String,
    pub humidity: String,
}

impl<'a> TelemetryRecord<'a> {
    pub fn new(
        name: &'a str,
        position: &'a str,
        date: LocalTime,
        temperature_c: f32,
        humidity_pct: f32,
    ) -> Self {
        Self {
            name,
            position,
            date,
            temperature: decimal_text(temperature_c),
            humidity: decimal_text(humidity_pct),
        }
    }

    pub fn to_json(&self) -> Result<String, PublishError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Shortest round-trip decimal, always with a fractional part (`21` → `"21.0"`).
pub fn decimal_text(value: f32) -> String {
    let mut text = format!("{value}");
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}
