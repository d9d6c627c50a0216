//! Wheel motor drivers

pub mod hbridge;

pub use hbridge::HBridgeMotor;
