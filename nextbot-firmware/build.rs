//! Build script for nextbot-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates robot.toml and bakes it into a postcard blob in OUT_DIR

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use nextbot_core::config::{RobotConfig, MAX_CONFIG_SIZE};

fn main() {
    setup_linker();
    bake_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse robot.toml, check it, and write `robot_config.bin`
fn bake_config() {
    println!("cargo:rerun-if-changed=robot.toml");

    let config_path = Path::new("robot.toml");
    if !config_path.exists() {
        fail(
            "robot.toml not found!",
            &["The firmware requires a robot.toml next to Cargo.toml.".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read robot.toml", &[e.to_string()]),
    };

    let config: RobotConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid robot.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let errors = validate(&config);
    if !errors.is_empty() {
        fail("Invalid values in robot.toml", &errors);
    }

    let mut buf = [0u8; MAX_CONFIG_SIZE];
    let bytes = match config.to_postcard(&mut buf) {
        Ok(bytes) => bytes,
        Err(e) => fail(
            "robot.toml does not fit the config blob",
            &[format!("{:?}", e)],
        ),
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("robot_config.bin"), &*bytes).unwrap();
    println!(
        "cargo:warning=robot.toml validated successfully ({} bytes)",
        bytes.len()
    );
}

/// Range checks serde cannot express
fn validate(config: &RobotConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.geometry.pulses_per_rev == 0 {
        errors.push("[geometry] pulses_per_rev must be > 0".to_string());
    }
    if config.geometry.wheel_radius_m <= 0.0 {
        errors.push("[geometry] wheel_radius_m must be > 0".to_string());
    }
    if config.geometry.half_wheelbase_m <= 0.0 {
        errors.push("[geometry] half_wheelbase_m must be > 0".to_string());
    }

    let gains = &config.gains;
    for (name, pid) in [
        ("position_left", gains.position_left),
        ("position_right", gains.position_right),
        ("balance", gains.balance),
        ("rotation_balance", gains.rotation_balance),
        ("velocity_left", gains.velocity_left),
        ("velocity_right", gains.velocity_right),
    ] {
        if pid.integral_limit < 0.0 || pid.output_limit < 0.0 {
            errors.push(format!("[gains.{}] limits must be >= 0", name));
        }
    }

    if config.settle.pwm_threshold < 0.0 || config.settle.pwm_threshold > 255.0 {
        errors.push("[settle] pwm_threshold must be 0-255".to_string());
    }
    if config.drive.max_wheel_omega <= 0.0 {
        errors.push("[drive] max_wheel_omega must be > 0".to_string());
    }

    let comms = &config.comms;
    if !(0x08..=0x77).contains(&comms.address) {
        errors.push("[comms] address must be a 7-bit address in 0x08-0x77".to_string());
    }
    if comms.frequency_hz == 0 || comms.frequency_hz > 1_000_000 {
        errors.push("[comms] frequency_hz must be 1-1000000".to_string());
    }
    if comms.poll_attempts == 0 {
        errors.push("[comms] poll_attempts must be > 0".to_string());
    }
    if comms.control_period_us == 0 {
        errors.push("[comms] control_period_us must be > 0".to_string());
    }

    // A maneuver that outlives the master's patience can never be acknowledged
    let master_wait_us = comms.poll_attempts as u64 * comms.poll_interval_ms as u64 * 1_000;
    let maneuver_us = config.drive.maneuver_budget as u64 * comms.control_period_us as u64;
    if maneuver_us >= master_wait_us {
        errors.push(format!(
            "[drive] maneuver_budget lasts {} ms, master gives up after {} ms",
            maneuver_us / 1_000,
            master_wait_us / 1_000
        ));
    }

    errors
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = match line.char_indices().nth(59) {
                Some((cut, _)) if line.chars().count() > 62 => format!("{}...", &line[..cut]),
                _ => line.clone(),
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
