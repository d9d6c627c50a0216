//! Wheel encoder trait

/// A quadrature-style wheel encoder read by the control loop
///
/// Counting happens in an edge context; implementations must return a
/// consistent snapshot from each call.
pub trait WheelEncoder {
    /// Signed pulse count since the last reset
    fn pulses(&self) -> i32;

    /// Wheel angular velocity in rad/s at time `now_us`
    ///
    /// Returns 0 when the estimate is not meaningful (no edge pair yet, or
    /// the last edge is stale).
    fn angular_velocity(&self, now_us: u64) -> f32;

    /// Zero the pulse count
    fn reset(&mut self);
}

impl<T: WheelEncoder + ?Sized> WheelEncoder for &mut T {
    fn pulses(&self) -> i32 {
        (**self).pulses()
    }

    fn angular_velocity(&self, now_us: u64) -> f32 {
        (**self).angular_velocity(now_us)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
