//! Shared pieces of the NextBot firmware images
//!
//! Both controllers boot from the same baked-in `robot.toml`. The slave
//! image additionally spawns the edge/bus tasks in [`tasks`]; the master
//! image runs a command script through [`script`].

#![no_std]

pub mod config;
pub mod pins;
pub mod script;
pub mod tasks;
