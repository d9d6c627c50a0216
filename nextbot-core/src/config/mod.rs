//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware compiles
//! `robot.toml` into postcard binary data at build time and decodes it into
//! a [`RobotConfig`] at boot.

pub mod robot;
pub mod types;

pub use robot::*;
pub use types::*;
