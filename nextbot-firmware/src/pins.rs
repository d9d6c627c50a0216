//! Board pin map
//!
//! GPIO numbers of the robot's controller boards. The binaries take the
//! matching `PIN_n` peripherals; these constants document and log them.

/// Left wheel encoder, pulse channel
pub const LEFT_ENCODER_PULSE: u8 = 2;
/// Left wheel encoder, direction sense channel
pub const LEFT_ENCODER_SENSE: u8 = 16;
/// Right wheel encoder, pulse channel
pub const RIGHT_ENCODER_PULSE: u8 = 3;
/// Right wheel encoder, direction sense channel
pub const RIGHT_ENCODER_SENSE: u8 = 17;

/// Left motor enable (PWM slice 3, channel A)
pub const LEFT_MOTOR_ENABLE: u8 = 6;
/// Left motor phase
pub const LEFT_MOTOR_PHASE: u8 = 7;
/// Right motor enable (PWM slice 2, channel B)
pub const RIGHT_MOTOR_ENABLE: u8 = 5;
/// Right motor phase
pub const RIGHT_MOTOR_PHASE: u8 = 4;

/// I2C0 data
pub const I2C_SDA: u8 = 20;
/// I2C0 clock
pub const I2C_SCL: u8 = 21;
