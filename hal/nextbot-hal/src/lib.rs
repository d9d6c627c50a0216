//! NextBot Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that the board-agnostic
//! crates (`nextbot-core`, `nextbot-drivers`) are written against. Chip
//! crates implement them for real peripherals; tests implement them with
//! mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  nextbot-firmware (slave / master)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nextbot-core / nextbot-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nextbot-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nextbot-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`pwm::PwmOutput`] - 8-bit PWM duty output
//! - [`i2c::I2cBus`] - I2C bus master operations
//! - [`i2c::I2cTarget`] - Receive/response buffer of an addressed I2C target
//! - [`time::Clock`] - Monotonic microsecond clock

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod pwm;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use i2c::{I2cBus, I2cTarget};
pub use pwm::PwmOutput;
pub use time::Clock;
