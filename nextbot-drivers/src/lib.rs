//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in nextbot-core, written against the nextbot-hal traits:
//!
//! - Wheel encoder tracking shared between edge and control contexts
//! - H-bridge wheel motors (PWM enable + phase pin)
//! - Receive/response buffer of the slave's I2C target
//! - Canvas graphics over any `embedded-graphics` draw target

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod encoder;
pub mod graphics;
pub mod motor;
