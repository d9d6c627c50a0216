//! I2C target task
//!
//! Moves bytes between the I2C peripheral and the [`TargetBuffer`] the
//! main loop works on. Writes from the master are queued as they arrive;
//! reads get the staged response once, then idle-bus `0xFF` bytes.

use defmt::*;
use embassy_rp::i2c_slave::{Command, I2cSlave};
use embassy_rp::peripherals::I2C0;
use nextbot_drivers::bus::{TargetBuffer, RX_CAPACITY};

/// Fill byte for reads with nothing staged
const IDLE_BYTE: u8 = 0xFF;

#[embassy_executor::task]
pub async fn i2c_target_task(mut device: I2cSlave<'static, I2C0>, buffer: &'static TargetBuffer) {
    info!("I2C target task started");
    let mut rx = [0u8; RX_CAPACITY];

    loop {
        match device.listen(&mut rx).await {
            Ok(Command::Write(len)) => {
                trace!("bus write {} bytes", len);
                buffer.on_write(&rx[..len]);
            }
            Ok(Command::WriteRead(len)) => {
                buffer.on_write(&rx[..len]);
                respond(&mut device, buffer).await;
            }
            Ok(Command::Read) => respond(&mut device, buffer).await,
            Ok(Command::GeneralCall(len)) => debug!("ignoring general call ({} bytes)", len),
            Err(e) => warn!("I2C target error: {}", e),
        }
    }
}

async fn respond(device: &mut I2cSlave<'static, I2C0>, buffer: &TargetBuffer) {
    let staged = buffer.take_response();
    let bytes: &[u8] = staged.as_deref().unwrap_or(&[]);
    if let Err(e) = device.respond_and_fill(bytes, IDLE_BYTE).await {
        warn!("I2C response failed: {}", e);
    }
}
