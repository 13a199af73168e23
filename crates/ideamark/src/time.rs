//! Time utilities for Ideamark.
//!
//! All timestamps are Unix epoch microseconds (u64).

/// Microseconds in one day.
pub const MICROS_PER_DAY: u64 = 86_400 * 1_000_000;

/// Return the current time as microseconds since Unix epoch.
///
/// A clock set before the epoch reads as zero.
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Convert microseconds to an RFC 3339 string.
pub fn micros_to_rfc3339(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let nsecs = ((micros % 1_000_000) * 1000) as u32;
    let dt = chrono::DateTime::from_timestamp(secs, nsecs).unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

/// Fractional days elapsed between `created_at` and `now`.
///
/// Timestamps in the future count as age zero.
pub fn age_days(created_at: u64, now: u64) -> f64 {
    now.saturating_sub(created_at) as f64 / MICROS_PER_DAY as f64
}

/// Convert whole days to microseconds.
pub fn days_to_micros(days: u64) -> u64 {
    days.saturating_mul(MICROS_PER_DAY)
}
