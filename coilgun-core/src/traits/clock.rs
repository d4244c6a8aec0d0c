//! Monotonic time source

/// Millisecond clock
///
/// Must be monotonic. The counter is allowed to wrap; callers compare
/// timestamps with [`elapsed_ms`].
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `start` to `now`, tolerant of counter wrap
#[inline]
pub fn elapsed_ms(now: u32, start: u32) -> u32 {
    now.wrapping_sub(start)
}
