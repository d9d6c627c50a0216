//! Board-agnostic core logic for the NextBot firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (wheel encoder, wheel motor, graphics)
//! - PID unit shared by all control loops
//! - Cascaded motion controller (position, balance, velocity loops)
//! - Master and slave bus communicators
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to the other modules
mod fmt;

pub mod comms;
pub mod config;
pub mod control;
pub mod motion;
pub mod traits;
