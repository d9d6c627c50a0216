//! Motion control
//!
//! Mode-based cascaded PI control of the two-wheel drive train.

pub mod controller;
pub mod mode;

pub use controller::MotionController;
pub use mode::{MotionMode, MotionStatus};
