//! Human-readable rendering of the two runtime metrics shown on the page.

/// Rendered in place of the uptime when the host gives us nothing usable.
pub const UPTIME_UNAVAILABLE: &str = "N/A";

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

const MEMORY_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats elapsed seconds as `"{d}d {h}h {m}m"`, dropping leftover seconds.
///
/// `None`, NaN and infinities render as [`UPTIME_UNAVAILABLE`]. Negative
/// values clamp to zero.
pub fn format_uptime(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return UPTIME_UNAVAILABLE.to_string();
    };
    // fractional seconds never reach the output
    let total = seconds.max(0.0) as u64;
    let days = total / SECS_PER_DAY;
    let hours = (total % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total % SECS_PER_HOUR) / SECS_PER_MINUTE;
    format!("{days}d {hours}h {minutes}m")
}

/// Scales a byte count up the `B, KB, MB, GB` ladder in steps of 1024.
///
/// GB is the last rung, so anything larger stays in GB with a big number in
/// front. The value is rounded to two decimals with ties going away from zero
/// and printed in its shortest form: `1536` gives `"1.5 KB"`, `1 << 30`
/// gives `"1 GB"`.
pub fn format_memory(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < MEMORY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", round_to_hundredths(value), MEMORY_UNITS[unit])
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
