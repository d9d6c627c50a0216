//! Blocking I2C master
//!
//! The master controller talks to a single target and waits on every
//! exchange anyway, so the blocking driver is enough.

use embassy_rp::i2c::{Blocking, Error, I2c, Instance};
use nextbot_hal::I2cBus;

/// I2C master over an RP2040 I2C block
pub struct RpI2cMaster<'d, T: Instance> {
    i2c: I2c<'d, T, Blocking>,
}

impl<'d, T: Instance> RpI2cMaster<'d, T> {
    pub fn new(i2c: I2c<'d, T, Blocking>) -> Self {
        Self { i2c }
    }
}

impl<T: Instance> I2cBus for RpI2cMaster<'_, T> {
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_read(address, buf)
    }
}
