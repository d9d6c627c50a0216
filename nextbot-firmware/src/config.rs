//! Boot-time configuration
//!
//! `build.rs` validates `robot.toml` and serializes it with postcard into
//! `OUT_DIR/robot_config.bin`, which is embedded here.

use defmt::*;
use nextbot_core::config::RobotConfig;

/// Configuration blob produced by the build script
static CONFIG_BLOB: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/robot_config.bin"));

/// Decode the embedded configuration
///
/// Falls back to the built-in defaults if the blob does not decode, which
/// only happens when the image and the core crate disagree on the layout.
pub fn load() -> RobotConfig {
    match RobotConfig::from_postcard(CONFIG_BLOB) {
        Ok(config) => {
            log_config_summary(&config);
            config
        }
        Err(e) => {
            warn!("Embedded config rejected ({}), using defaults", e);
            RobotConfig::default()
        }
    }
}

fn log_config_summary(config: &RobotConfig) {
    info!(
        "Config v{}: {} pulses/rev, wheel r={}m, half base={}m",
        config.version,
        config.geometry.pulses_per_rev,
        config.geometry.wheel_radius_m,
        config.geometry.half_wheelbase_m
    );
    info!(
        "Bus: addr={=u8:#x} {}Hz, control period {}us, maneuver budget {}",
        config.comms.address,
        config.comms.frequency_hz,
        config.comms.control_period_us,
        config.drive.maneuver_budget
    );
}
