//! PI controller unit
//!
//! One type serves all six loops of the motion cascade. Each instance is
//! configured by a [`PidConfig`] and keeps its own accumulated integral.
//!
//! Per step, with `e` the error:
//! - the integral accumulates `e` only while `|e| <= 10000`, clamped to
//!   `±integral_limit`
//! - an error of exactly zero resets the integral
//! - `out = clamp(kp * e + ki * integral, ±output_limit)`

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors above this magnitude do not feed the integral
pub const INTEGRAL_ERROR_WINDOW: f32 = 10_000.0;

/// Gains and limits of one loop
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Accumulated integral is clamped to ±this value
    pub integral_limit: f32,
    /// Output is clamped to ±this value
    pub output_limit: f32,
}

impl PidConfig {
    /// Create a loop configuration
    pub const fn new(kp: f32, ki: f32, integral_limit: f32, output_limit: f32) -> Self {
        Self {
            kp,
            ki,
            integral_limit,
            output_limit,
        }
    }
}

/// A PI controller with conditional integration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pid {
    config: PidConfig,
    integral: f32,
}

impl Pid {
    /// Create a controller with an empty integral
    pub const fn new(config: PidConfig) -> Self {
        Self {
            config,
            integral: 0.0,
        }
    }

    /// Compute the output for an error, updating the integral
    pub fn compute(&mut self, error: f32) -> f32 {
        let c = &self.config;

        if error.abs() <= INTEGRAL_ERROR_WINDOW {
            self.integral = (self.integral + error).clamp(-c.integral_limit, c.integral_limit);
        }
        if error == 0.0 {
            self.integral = 0.0;
        }

        (c.kp * error + c.ki * self.integral).clamp(-c.output_limit, c.output_limit)
    }

    /// Clear the accumulated integral
    pub fn flush(&mut self) {
        self.integral = 0.0;
    }

    /// Current accumulated integral
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Loop configuration
    pub fn config(&self) -> &PidConfig {
        &self.config
    }
}
