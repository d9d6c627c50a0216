//! NextBot master controller
//!
//! Drives the slave over I2C with the demonstration script, then idles.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use nextbot_core::comms::Master;
use nextbot_firmware::{config, pins, script};
use nextbot_hal_rp2040::RpI2cMaster;

/// Time for the slave to boot before the first command
const SLAVE_BOOT_MS: u64 = 500;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("NextBot master starting...");

    let p = embassy_rp::init(Default::default());
    let config = config::load();

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = config.comms.frequency_hz;
    let bus = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, i2c_config);
    info!(
        "I2C master at {}Hz (SDA GPIO{}, SCL GPIO{})",
        config.comms.frequency_hz,
        pins::I2C_SDA,
        pins::I2C_SCL
    );

    Timer::after_millis(SLAVE_BOOT_MS).await;

    // Seed correlation ids from the boot timer
    let seed = Instant::now().as_ticks() as u32;
    let mut master = Master::new(RpI2cMaster::new(bus), Delay, &config.comms, seed);

    match script::run_demo(&mut master) {
        Ok(()) => info!("Demo finished"),
        Err(e) => error!("Demo aborted: {}", e),
    }

    loop {
        Timer::after_secs(1).await;
    }
}
