//! Time helpers for sampling cadence and stall detection.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Sampling rate in Hz for a read interval, for log fields.
/// - Clamps `interval_ms` to at least 1 to avoid division by zero.
#[inline]
pub fn rate_hz(interval_ms: u64) -> f64 {
    MILLIS_PER_SEC as f64 / interval_ms.max(1) as f64
}

/// Stall threshold for a periodic reader.
///
/// The larger of two read intervals and four read timeouts, so a single
/// missed or slow sample never counts as a stall. At least 1 ms.
#[inline]
pub fn stall_threshold_ms(interval_ms: u64, timeout_ms: u64) -> u64 {
    interval_ms
        .saturating_mul(2)
        .max(timeout_ms.saturating_mul(4))
        .max(1)
}
