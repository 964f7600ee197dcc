//! Compact human-readable durations and speeds.

use std::time::Duration;

const SPEED_SCALES: [f64; 3] = [60.0, 60.0, 24.0];
const SPEED_UNITS: [&str; 4] = ["c/s", "c/min", "c/h", "c/d"];

/// Formats a duration as `12.34ms`, `1.23s` or `HH:MM:SS`; `--` when unknown.
pub fn humanize_time(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return "--".to_string();
    };
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 10.0 {
        format!("{secs:.2}s")
    } else {
        let total = duration.as_secs();
        let (hours, rem) = (total / 3600, total % 3600);
        format!("{:02}:{:02}:{:02}", hours, rem / 60, rem % 60)
    }
}

/// Formats counts per second in the first unit of `c/s`, `c/min`, `c/h`, `c/d`
/// where the value is at least one.
pub fn humanize_speed(counts_per_sec: f64) -> String {
    let mut speed = if counts_per_sec.is_finite() {
        counts_per_sec
    } else {
        0.0
    };
    let mut unit = 0;
    if speed > 0.0 {
        while speed < 1.0 && unit < SPEED_SCALES.len() {
            speed *= SPEED_SCALES[unit];
            unit += 1;
        }
    }
    format!("{speed:.1}{}", SPEED_UNITS[unit])
}
