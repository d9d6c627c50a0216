//! Hardware abstraction traits
//!
//! These traits define the interface between the motion and dispatch logic
//! and the concrete drivers.

pub mod encoder;
pub mod graphics;
pub mod motor;

pub use encoder::WheelEncoder;
pub use graphics::GraphicsEngine;
pub use motor::WheelMotor;
