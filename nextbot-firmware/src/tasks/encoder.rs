//! Wheel encoder edge task

use defmt::*;
use embassy_rp::gpio::Input;
use nextbot_drivers::encoder::EncoderTracker;
use nextbot_hal::Clock;
use nextbot_hal_rp2040::{EmbassyClock, RpInput};

/// Count rising edges of the pulse channel
///
/// The sense channel's level at each edge gives the direction.
#[embassy_executor::task(pool_size = 2)]
pub async fn encoder_task(
    mut pulse: Input<'static>,
    sense: Input<'static>,
    tracker: &'static EncoderTracker,
    name: &'static str,
) {
    info!("{} encoder task started", name);
    let sense = RpInput::new(&sense);

    loop {
        pulse.wait_for_rising_edge().await;
        tracker.sample_edge(&sense, EmbassyClock.now_us());
    }
}
