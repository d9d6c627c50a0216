//! Edge/bus context tasks of the slave
//!
//! These run on the high-priority interrupt executor so encoder edges and
//! bus transfers are timestamped and queued promptly while the thread-mode
//! loop is busy with a control step.

mod encoder;
mod i2c_target;

pub use encoder::encoder_task;
pub use i2c_target::i2c_target_task;
