//! I2C bus abstractions
//!
//! The robot uses I2C in both roles: the master controller is the sole bus
//! initiator ([`I2cBus`]), the slave controller is an addressed target whose
//! received bytes land in an interrupt-filled buffer ([`I2cTarget`]).

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// an addressed target.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(address, buf)
    }
}

/// Main-loop view of an addressed I2C target
///
/// Bytes written by the bus master are queued by the bus-activity context;
/// the main loop inspects and consumes them through this trait and stages
/// the bytes the master will get on its next read.
pub trait I2cTarget {
    /// Number of received bytes waiting to be consumed
    fn available(&self) -> usize;

    /// Look at the received byte `index` places from the oldest, without
    /// consuming anything
    fn peek_at(&self, index: usize) -> Option<u8>;

    /// Look at the oldest received byte without consuming it
    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Consume up to `buf.len()` received bytes
    ///
    /// Returns the number of bytes copied.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Stage bytes to be returned on the master's next read request
    ///
    /// Replaces anything staged earlier and not yet read.
    fn respond(&mut self, data: &[u8]);
}
