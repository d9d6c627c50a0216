//! Time source abstraction

/// Monotonic clock with microsecond resolution
///
/// Timestamps never go backwards. The zero point is arbitrary (usually boot).
pub trait Clock {
    /// Current time in microseconds
    fn now_us(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
