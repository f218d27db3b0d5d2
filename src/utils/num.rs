//! Integer conversions used when reporting counts and durations.
//!
//! Saturating helpers clamp instead of truncating; bench lines should never panic.

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[inline]
#[must_use]
pub fn u128_to_u64_saturating(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

/// Milliseconds elapsed since `start`, clamped to `u64`.
#[inline]
#[must_use]
pub fn elapsed_ms(start: std::time::Instant) -> u64 {
    u128_to_u64_saturating(start.elapsed().as_millis())
}
