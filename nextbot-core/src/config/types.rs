//! Configuration sections
//!
//! Every section defaults to the values the robot was tuned with.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::control::PidConfig;

/// Drive train geometry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WheelGeometry {
    /// Encoder pulses per wheel revolution
    pub pulses_per_rev: u16,
    /// Wheel radius in metres
    pub wheel_radius_m: f32,
    /// Half the distance between the wheels in metres
    pub half_wheelbase_m: f32,
}

impl Default for WheelGeometry {
    fn default() -> Self {
        Self {
            pulses_per_rev: 960,
            wheel_radius_m: 0.0318,
            half_wheelbase_m: 0.135,
        }
    }
}

impl WheelGeometry {
    /// Encoder pulses per metre of travel at the wheel rim
    pub fn pulses_per_metre(&self) -> f32 {
        self.pulses_per_rev as f32 / (2.0 * core::f32::consts::PI * self.wheel_radius_m)
    }

    /// Wheel rotation in radians per encoder pulse
    pub fn radians_per_pulse(&self) -> f32 {
        2.0 * core::f32::consts::PI / self.pulses_per_rev as f32
    }
}

/// Gains of the six loops of the motion cascade
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CascadeGains {
    /// Left wheel position loop (pulses → rad/s)
    pub position_left: PidConfig,
    /// Right wheel position loop (pulses → rad/s)
    pub position_right: PidConfig,
    /// Straight-line balance loop on `L - R`
    pub balance: PidConfig,
    /// Rotation balance loop on `(L + R) / 2`
    pub rotation_balance: PidConfig,
    /// Left wheel velocity loop (rad/s → PWM)
    pub velocity_left: PidConfig,
    /// Right wheel velocity loop (rad/s → PWM)
    pub velocity_right: PidConfig,
}

impl Default for CascadeGains {
    fn default() -> Self {
        let position = PidConfig::new(0.02, 0.0004, 1000.0, 4.0);
        let balance = PidConfig::new(0.05, 0.0005, 1000.0, 4.0);
        let velocity = PidConfig::new(200.0, 3.0, 30.0, 250.0);
        Self {
            position_left: position,
            position_right: position,
            balance,
            rotation_balance: balance,
            velocity_left: velocity,
            velocity_right: velocity,
        }
    }
}

/// Completion detection for positioning maneuvers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SettleConfig {
    /// Both wheel outputs must be within ±this PWM value
    pub pwm_threshold: f32,
    /// Consecutive quiet updates before the maneuver counts as settled
    pub required_updates: u32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            pwm_threshold: 70.0,
            required_updates: 1000,
        }
    }
}

/// Speed limits and maneuver bounds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriveLimits {
    /// Wheel angular velocity at speed 255, in rad/s
    pub max_wheel_omega: f32,
    /// Pulse target used by open-loop moves, far enough to never be reached
    pub open_loop_target: i32,
    /// Motion updates a positioning maneuver may take before it is aborted
    pub maneuver_budget: u32,
}

impl Default for DriveLimits {
    fn default() -> Self {
        Self {
            max_wheel_omega: 8.0,
            open_loop_target: 9_000_000,
            maneuver_budget: 25_000,
        }
    }
}

/// Bus and scheduling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommsConfig {
    /// 7-bit slave address
    pub address: u8,
    /// Bus clock in Hz
    pub frequency_hz: u32,
    /// Master delay between writing a command and the first response poll
    pub turnaround_ms: u32,
    /// Master delay between response polls
    pub poll_interval_ms: u32,
    /// Master response polls before giving up
    pub poll_attempts: u32,
    /// Slave polls spent waiting for the text of a `DrawText`
    pub text_wait_polls: u32,
    /// Slave main loop period in microseconds
    pub control_period_us: u32,
}

impl Default for CommsConfig {
    fn default() -> Self {
        Self {
            address: 0x08,
            frequency_hz: 100_000,
            turnaround_ms: 10,
            poll_interval_ms: 10,
            poll_attempts: 3000,
            text_wait_polls: 100,
            control_period_us: 1000,
        }
    }
}

/// Encoder velocity estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderConfig {
    /// Velocity reads as zero when the last edge is older than this
    pub stale_timeout_us: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            stale_timeout_us: 100_000,
        }
    }
}
