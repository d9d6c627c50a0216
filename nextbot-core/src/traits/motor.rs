//! Wheel motor trait

/// A bidirectional wheel motor
pub trait WheelMotor {
    /// Apply a signed output
    ///
    /// Positive drives forward. The magnitude saturates at full duty (255).
    fn drive(&mut self, output: f32);

    /// Remove drive (zero duty)
    fn stop(&mut self);
}

impl<T: WheelMotor + ?Sized> WheelMotor for &mut T {
    fn drive(&mut self, output: f32) {
        (**self).drive(output)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
