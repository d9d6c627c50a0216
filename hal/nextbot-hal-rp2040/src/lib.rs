//! RP2040 implementations of the NextBot HAL traits
//!
//! Thin wrappers around `embassy-rp` drivers:
//!
//! - [`gpio::RpOutput`], [`gpio::RpInput`] - motor phase pins, encoder sense pins
//! - [`pwm::RpPwm`] - motor enable channel on one half of a PWM slice
//! - [`i2c::RpI2cMaster`] - blocking I2C master for the master controller
//! - [`time::EmbassyClock`] - microsecond clock from the embassy time driver
//!
//! The slave controller's I2C target side stays in the firmware crate, where
//! it runs as an interrupt-priority task feeding a `TargetBuffer`.

#![no_std]

pub mod gpio;
pub mod i2c;
pub mod pwm;
pub mod time;

pub use gpio::{RpInput, RpOutput};
pub use i2c::RpI2cMaster;
pub use pwm::{PwmChannel, RpPwm};
pub use time::EmbassyClock;
