//! Master-side command script
//!
//! The master never retries on its own: a failed command leaves the
//! correlation outstanding and it is up to the caller to send it again.
//! [`retry`] is that caller-side policy.

use defmt::*;
use embedded_hal::delay::DelayNs;
use nextbot_core::comms::{CommsError, Master};
use nextbot_hal::I2cBus;
use nextbot_protocol::Drive;

/// Attempts per scripted command
pub const ATTEMPTS: u8 = 3;

/// Run `op` until it succeeds or `attempts` runs out
///
/// Refused text is a caller bug and is not retried.
pub fn retry<F>(attempts: u8, mut op: F) -> Result<(), CommsError>
where
    F: FnMut() -> Result<(), CommsError>,
{
    let mut last = CommsError::Timeout;
    for attempt in 1..=attempts {
        match op() {
            Ok(()) => return Ok(()),
            Err(e @ (CommsError::TextTooLong | CommsError::MissingText)) => return Err(e),
            Err(e) => {
                warn!("attempt {}/{} failed: {}", attempt, attempts, e);
                last = e;
            }
        }
    }
    Err(last)
}

/// Demonstration run: sketch on the display, then drive a small square
pub fn run_demo<B: I2cBus, D: DelayNs>(master: &mut Master<B, D>) -> Result<(), CommsError> {
    retry(ATTEMPTS, || master.clear_screen())?;
    retry(ATTEMPTS, || master.draw_text("NextBot"))?;
    retry(ATTEMPTS, || master.draw_rectangle(10, 10, 20, 5))?;
    retry(ATTEMPTS, || master.draw_circle(64, 40, 12))?;
    retry(ATTEMPTS, || master.draw_triangle(90, 60, 110, 60, 100, 44))?;

    for side in 0..4 {
        info!("square side {}", side);
        retry(ATTEMPTS, || master.move_to(20))?;
        retry(ATTEMPTS, || master.rotate_to(90))?;
    }

    // Continuous commands are acknowledged as still running
    if let Err(e) = master.move_robot(Drive::Forward, 128) {
        debug!("move acknowledged as running: {}", e);
    }
    retry(ATTEMPTS, || master.stop())?;

    retry(ATTEMPTS, || master.draw_text("done"))
}
