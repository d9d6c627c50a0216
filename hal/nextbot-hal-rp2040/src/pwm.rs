//! PWM channel wrapper
//!
//! Each RP2040 PWM slice drives two pins (A and B) from one counter. A motor
//! enable line only needs one of them, so the wrapper remembers which half
//! it owns and scales the 8-bit duty to the slice's `top`.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use nextbot_hal::PwmOutput;

/// Default counter wrap value
///
/// At the default 125 MHz system clock and divider 1 this gives ~31 kHz,
/// above the audible range.
pub const DEFAULT_TOP: u16 = 4000;

/// Which output of the slice is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    A,
    B,
}

/// One PWM output with an 8-bit duty interface
pub struct RpPwm<'d> {
    pwm: Pwm<'d>,
    config: PwmConfig,
    channel: PwmChannel,
    duty: u8,
}

impl<'d> RpPwm<'d> {
    /// Take over a slice configured with a single output
    ///
    /// The output starts at zero duty.
    pub fn new(mut pwm: Pwm<'d>, channel: PwmChannel, top: u16) -> Self {
        let mut config = PwmConfig::default();
        config.top = top;
        config.compare_a = 0;
        config.compare_b = 0;
        pwm.set_config(&config);

        Self {
            pwm,
            config,
            channel,
            duty: 0,
        }
    }

    fn compare_for(&self, duty: u8) -> u16 {
        // top + 1 counts per period; full duty keeps the output high
        ((duty as u32 * (self.config.top as u32 + 1)) / 255) as u16
    }
}

impl PwmOutput for RpPwm<'_> {
    fn set_duty(&mut self, duty: u8) {
        let compare = self.compare_for(duty);
        match self.channel {
            PwmChannel::A => self.config.compare_a = compare,
            PwmChannel::B => self.config.compare_b = compare,
        }
        self.pwm.set_config(&self.config);
        self.duty = duty;
    }

    fn duty(&self) -> u8 {
        self.duty
    }
}
