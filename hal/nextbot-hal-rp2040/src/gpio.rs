//! GPIO wrappers

use embassy_rp::gpio::{Input, Output};
use nextbot_hal::{InputPin, OutputPin};

/// Push-pull output pin
pub struct RpOutput<'d> {
    pin: Output<'d>,
}

impl<'d> RpOutput<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Input pin
///
/// Borrowing wrapper so the encoder task can keep waiting for edges on the
/// channel-A input while it samples channel B through this trait.
pub struct RpInput<'a, 'd> {
    pin: &'a Input<'d>,
}

impl<'a, 'd> RpInput<'a, 'd> {
    pub fn new(pin: &'a Input<'d>) -> Self {
        Self { pin }
    }
}

impl InputPin for RpInput<'_, '_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
