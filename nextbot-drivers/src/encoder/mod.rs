//! Wheel encoders

pub mod tracker;

pub use tracker::{EncoderSnapshot, EncoderTracker};
