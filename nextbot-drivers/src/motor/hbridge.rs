//! H-bridge motor in phase/enable mode
//!
//! The enable input takes the PWM duty, the phase input picks the direction
//! (high = forward). Output values from the control loop are signed and
//! saturate at full duty.

use nextbot_core::traits::WheelMotor;
use nextbot_hal::{OutputPin, PwmOutput};

/// Maximum duty value
pub const MAX_DUTY: u8 = 255;

/// One H-bridge channel driving a wheel motor
pub struct HBridgeMotor<P, D> {
    enable: P,
    phase: D,
}

impl<P: PwmOutput, D: OutputPin> HBridgeMotor<P, D> {
    /// Create a motor with zero duty
    pub fn new(mut enable: P, phase: D) -> Self {
        enable.set_duty(0);
        Self { enable, phase }
    }

    /// Current duty (0-255)
    pub fn duty(&self) -> u8 {
        self.enable.duty()
    }

    /// Check whether the phase pin selects forward
    pub fn is_forward(&self) -> bool {
        self.phase.is_set_high()
    }

    /// Convert a signed output into direction and duty
    fn split(output: f32) -> (bool, u8) {
        let forward = output >= 0.0;
        let magnitude = if forward { output } else { -output };
        // `as` saturates and maps NaN to 0
        (forward, magnitude.min(MAX_DUTY as f32) as u8)
    }
}

impl<P: PwmOutput, D: OutputPin> WheelMotor for HBridgeMotor<P, D> {
    fn drive(&mut self, output: f32) {
        let (forward, duty) = Self::split(output);
        self.phase.set_state(forward);
        self.enable.set_duty(duty);
    }

    fn stop(&mut self) {
        self.enable.set_duty(0);
    }
}
