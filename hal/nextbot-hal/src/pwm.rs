//! PWM output abstraction

/// Single PWM channel with an 8-bit duty cycle
///
/// A duty of 0 is fully off, 255 is fully on. Implementations scale this to
/// the timer's real counter range.
pub trait PwmOutput {
    /// Set the duty cycle (0-255)
    fn set_duty(&mut self, duty: u8);

    /// Get the last duty cycle written
    fn duty(&self) -> u8;
}
