//! Top-level robot configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{
    CascadeGains, CommsConfig, DriveLimits, EncoderConfig, SettleConfig, WheelGeometry,
};

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound for the serialized configuration
pub const MAX_CONFIG_SIZE: usize = 256;

/// Errors that can occur while loading a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialized data could not be decoded
    Deserialize,
    /// Serialization did not fit the buffer
    Serialize,
    /// Layout version differs from [`CONFIG_VERSION`]
    VersionMismatch { found: u8 },
}

/// Complete robot configuration
///
/// This is the top-level structure shared by both controllers. The master
/// only reads the `comms` section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    pub geometry: WheelGeometry,
    pub gains: CascadeGains,
    pub settle: SettleConfig,
    pub drive: DriveLimits,
    pub comms: CommsConfig,
    pub encoder: EncoderConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            geometry: WheelGeometry::default(),
            gains: CascadeGains::default(),
            settle: SettleConfig::default(),
            drive: DriveLimits::default(),
            comms: CommsConfig::default(),
            encoder: EncoderConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Create a configuration with the tuned defaults
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "serde")]
impl RobotConfig {
    /// Decode a configuration from postcard bytes
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: RobotConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                found: config.version,
            });
        }

        Ok(config)
    }

    /// Encode into `buf`, returning the used prefix
    pub fn to_postcard<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }
}
