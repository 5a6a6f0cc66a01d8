//! Conversions between `hh:mm:ss` strings, seconds and milliseconds.

use regex::Regex;
use std::sync::LazyLock;

static TIME_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})$").expect("time pattern is valid")
});

/// Whether `time` is exactly `hh:mm:ss` with two digits per field.
pub fn is_time_string(time: &str) -> bool {
    TIME_STRING.is_match(time)
}

/// Parse a strict `hh:mm:ss` string into milliseconds.
///
/// Returns `None` for anything else; there is no partial parse.
pub fn time_string_to_ms(time: &str) -> Option<u64> {
    let caps = TIME_STRING.captures(time)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    Some((hours * 3600 + minutes * 60 + seconds) * 1000)
}

pub fn seconds_to_ms(seconds: f64) -> f64 {
    seconds * 1000.0
}

/// Format milliseconds as `hh:mm:ss`, or `mm:ss` when the hour field is zero.
pub fn ms_to_time_string(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    if hours == 0 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}
