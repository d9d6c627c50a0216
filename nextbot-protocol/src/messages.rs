//! Typed view of command packets
//!
//! [`Command`] is what the master's API and the slave's dispatch work with.
//! Conversion to and from [`CommandPacket`] fixes the parameter layout of
//! every opcode. Unused parameter bytes are written as zero and ignored when
//! parsing.

use crate::opcode::Opcode;
use crate::packet::{CommandPacket, PARAM_LEN};

/// Direction code: drive forward
pub const DIR_FORWARD: u8 = 101;
/// Direction code: drive in reverse
pub const DIR_REVERSE: u8 = 102;
/// Direction code: stop
pub const DIR_STOP: u8 = 103;

/// Direction parameter of motor commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    Forward,
    Reverse,
    Stop,
}

impl Drive {
    /// Parse a direction code
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            DIR_FORWARD => Some(Drive::Forward),
            DIR_REVERSE => Some(Drive::Reverse),
            DIR_STOP => Some(Drive::Stop),
            _ => None,
        }
    }

    /// Wire value
    pub const fn to_byte(self) -> u8 {
        match self {
            Drive::Forward => DIR_FORWARD,
            Drive::Reverse => DIR_REVERSE,
            Drive::Stop => DIR_STOP,
        }
    }

    /// Sign applied to a speed: +1, -1, or 0 for stop
    pub const fn sign(self) -> i8 {
        match self {
            Drive::Forward => 1,
            Drive::Reverse => -1,
            Drive::Stop => 0,
        }
    }
}

/// A command from master to slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    DrawPoint { x: u8, y: u8 },
    DrawLine { x0: u8, y0: u8, x1: u8, y1: u8 },
    DrawCircle { x: u8, y: u8, radius: u8 },
    /// Filled circle
    DrawDisc { x: u8, y: u8, radius: u8 },
    DrawTriangle {
        x0: u8,
        y0: u8,
        x1: u8,
        y1: u8,
        x2: u8,
        y2: u8,
    },
    /// Rectangle outline
    DrawRectangle { x: u8, y: u8, width: u8, height: u8 },
    /// Filled rectangle
    DrawBox { x: u8, y: u8, width: u8, height: u8 },
    /// Text follows in a data packet
    DrawText,
    ClearScreen,
    LeftMotor { direction: Drive, speed: u8 },
    RightMotor { direction: Drive, speed: u8 },
    /// Continuous straight motion
    Move { direction: Drive, speed: u8 },
    /// Drive a distance in centimetres, completes when settled
    MoveTo { cm: i16 },
    Stop,
    /// Continuous spin in place
    Turn { direction: Drive, speed: u8 },
    /// Rotate in place by an angle in degrees, completes when settled
    RotateTo { degrees: i16 },
}

impl Command {
    /// Opcode for this command
    pub const fn opcode(&self) -> Opcode {
        match self {
            Command::DrawPoint { .. } => Opcode::DrawPoint,
            Command::DrawLine { .. } => Opcode::DrawLine,
            Command::DrawCircle { .. } => Opcode::DrawCircle,
            Command::DrawDisc { .. } => Opcode::DrawDisc,
            Command::DrawTriangle { .. } => Opcode::DrawTriangle,
            Command::DrawRectangle { .. } => Opcode::DrawRectangle,
            Command::DrawBox { .. } => Opcode::DrawBox,
            Command::DrawText => Opcode::DrawText,
            Command::ClearScreen => Opcode::ClearScreen,
            Command::LeftMotor { .. } => Opcode::LeftMotor,
            Command::RightMotor { .. } => Opcode::RightMotor,
            Command::Move { .. } => Opcode::Move,
            Command::MoveTo { .. } => Opcode::MoveTo,
            Command::Stop => Opcode::Stop,
            Command::Turn { .. } => Opcode::Turn,
            Command::RotateTo { .. } => Opcode::RotateTo,
        }
    }

    /// Parameter bytes in wire layout
    pub fn params(&self) -> [u8; PARAM_LEN] {
        let mut p = [0u8; PARAM_LEN];
        match *self {
            Command::DrawPoint { x, y } => {
                p[0] = x;
                p[1] = y;
            }
            Command::DrawLine { x0, y0, x1, y1 } => {
                p[..4].copy_from_slice(&[x0, y0, x1, y1]);
            }
            Command::DrawCircle { x, y, radius } | Command::DrawDisc { x, y, radius } => {
                p[..3].copy_from_slice(&[x, y, radius]);
            }
            Command::DrawTriangle {
                x0,
                y0,
                x1,
                y1,
                x2,
                y2,
            } => {
                p = [x0, y0, x1, y1, x2, y2];
            }
            Command::DrawRectangle {
                x,
                y,
                width,
                height,
            }
            | Command::DrawBox {
                x,
                y,
                width,
                height,
            } => {
                p[..4].copy_from_slice(&[x, y, width, height]);
            }
            Command::LeftMotor { direction, speed }
            | Command::RightMotor { direction, speed }
            | Command::Move { direction, speed }
            | Command::Turn { direction, speed } => {
                p[0] = direction.to_byte();
                p[1] = speed;
            }
            Command::MoveTo { cm } => {
                p[..2].copy_from_slice(&cm.to_be_bytes());
            }
            Command::RotateTo { degrees } => {
                p[..2].copy_from_slice(&degrees.to_be_bytes());
            }
            Command::DrawText | Command::ClearScreen | Command::Stop => {}
        }
        p
    }

    /// Build the packet for this command with the given correlation id
    pub fn to_packet(&self, id: u8) -> CommandPacket {
        CommandPacket::new(id, self.opcode().to_byte(), self.params())
    }

    /// Parse a packet into a command
    ///
    /// Returns `None` for unknown opcodes and for motor commands with an
    /// invalid direction code.
    pub fn from_packet(packet: &CommandPacket) -> Option<Self> {
        let p = &packet.params;
        let opcode = Opcode::from_byte(packet.opcode)?;

        let command = match opcode {
            Opcode::DrawPoint => Command::DrawPoint { x: p[0], y: p[1] },
            Opcode::DrawLine => Command::DrawLine {
                x0: p[0],
                y0: p[1],
                x1: p[2],
                y1: p[3],
            },
            Opcode::DrawCircle => Command::DrawCircle {
                x: p[0],
                y: p[1],
                radius: p[2],
            },
            Opcode::DrawDisc => Command::DrawDisc {
                x: p[0],
                y: p[1],
                radius: p[2],
            },
            Opcode::DrawTriangle => Command::DrawTriangle {
                x0: p[0],
                y0: p[1],
                x1: p[2],
                y1: p[3],
                x2: p[4],
                y2: p[5],
            },
            Opcode::DrawRectangle => Command::DrawRectangle {
                x: p[0],
                y: p[1],
                width: p[2],
                height: p[3],
            },
            Opcode::DrawBox => Command::DrawBox {
                x: p[0],
                y: p[1],
                width: p[2],
                height: p[3],
            },
            Opcode::DrawText => Command::DrawText,
            Opcode::ClearScreen => Command::ClearScreen,
            Opcode::LeftMotor => Command::LeftMotor {
                direction: Drive::from_byte(p[0])?,
                speed: p[1],
            },
            Opcode::RightMotor => Command::RightMotor {
                direction: Drive::from_byte(p[0])?,
                speed: p[1],
            },
            Opcode::Move => Command::Move {
                direction: Drive::from_byte(p[0])?,
                speed: p[1],
            },
            Opcode::MoveTo => Command::MoveTo {
                cm: i16::from_be_bytes([p[0], p[1]]),
            },
            Opcode::Stop => Command::Stop,
            Opcode::Turn => Command::Turn {
                direction: Drive::from_byte(p[0])?,
                speed: p[1],
            },
            Opcode::RotateTo => Command::RotateTo {
                degrees: i16::from_be_bytes([p[0], p[1]]),
            },
        };

        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::COMMAND_LEN;
    use proptest::prelude::*;

    #[test]
    fn test_draw_rectangle_bytes() {
        let cmd = Command::DrawRectangle {
            x: 10,
            y: 10,
            width: 20,
            height: 5,
        };
        let bytes = cmd.to_packet(0x07).encode();
        assert_eq!(bytes, [0x55, 0x07, 0x16, 10, 10, 20, 5, 0, 0, 0x99]);
    }

    #[test]
    fn test_move_to_is_big_endian() {
        let bytes = Command::MoveTo { cm: 300 }.to_packet(1).encode();
        assert_eq!(&bytes[2..6], &[0x34, 0x01, 0x2C, 0x00]);

        let back = Command::MoveTo { cm: -2 }.to_packet(1);
        assert_eq!(&back.params[..2], &[0xFF, 0xFE]);
        assert_eq!(
            Command::from_packet(&back),
            Some(Command::MoveTo { cm: -2 })
        );
    }

    #[test]
    fn test_motor_command_layout() {
        let cmd = Command::LeftMotor {
            direction: Drive::Reverse,
            speed: 200,
        };
        let packet = cmd.to_packet(9);
        assert_eq!(packet.opcode, 0x31);
        assert_eq!(packet.params, [102, 200, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_opcode_is_none() {
        let packet = CommandPacket::new(1, 0x42, [0; PARAM_LEN]);
        assert_eq!(Command::from_packet(&packet), None);
    }

    #[test]
    fn test_invalid_direction_is_none() {
        let packet = CommandPacket::new(1, 0x33, [7, 100, 0, 0, 0, 0]);
        assert_eq!(Command::from_packet(&packet), None);
    }

    #[test]
    fn test_unused_params_ignored() {
        let packet = CommandPacket::new(1, 0x35, [1, 2, 3, 4, 5, 6]);
        assert_eq!(Command::from_packet(&packet), Some(Command::Stop));
    }

    #[test]
    fn test_drive_sign() {
        assert_eq!(Drive::Forward.sign(), 1);
        assert_eq!(Drive::Reverse.sign(), -1);
        assert_eq!(Drive::Stop.sign(), 0);
    }

    fn any_drive() -> impl Strategy<Value = Drive> {
        prop_oneof![Just(Drive::Forward), Just(Drive::Reverse), Just(Drive::Stop)]
    }

    fn any_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (any::<u8>(), any::<u8>()).prop_map(|(x, y)| Command::DrawPoint { x, y }),
            any::<[u8; 4]>().prop_map(|[x0, y0, x1, y1]| Command::DrawLine { x0, y0, x1, y1 }),
            any::<[u8; 3]>().prop_map(|[x, y, radius]| Command::DrawCircle { x, y, radius }),
            any::<[u8; 3]>().prop_map(|[x, y, radius]| Command::DrawDisc { x, y, radius }),
            any::<[u8; 6]>().prop_map(|[x0, y0, x1, y1, x2, y2]| Command::DrawTriangle {
                x0,
                y0,
                x1,
                y1,
                x2,
                y2
            }),
            any::<[u8; 4]>().prop_map(|[x, y, width, height]| Command::DrawRectangle {
                x,
                y,
                width,
                height
            }),
            any::<[u8; 4]>().prop_map(|[x, y, width, height]| Command::DrawBox {
                x,
                y,
                width,
                height
            }),
            Just(Command::DrawText),
            Just(Command::ClearScreen),
            (any_drive(), any::<u8>())
                .prop_map(|(direction, speed)| Command::LeftMotor { direction, speed }),
            (any_drive(), any::<u8>())
                .prop_map(|(direction, speed)| Command::RightMotor { direction, speed }),
            (any_drive(), any::<u8>())
                .prop_map(|(direction, speed)| Command::Move { direction, speed }),
            any::<i16>().prop_map(|cm| Command::MoveTo { cm }),
            Just(Command::Stop),
            (any_drive(), any::<u8>())
                .prop_map(|(direction, speed)| Command::Turn { direction, speed }),
            any::<i16>().prop_map(|degrees| Command::RotateTo { degrees }),
        ]
    }

    proptest! {
        #[test]
        fn prop_command_survives_the_wire(cmd in any_command(), id: u8) {
            let bytes: [u8; COMMAND_LEN] = cmd.to_packet(id).encode();
            let decoded = CommandPacket::decode(&bytes);
            prop_assert!(decoded.is_well_formed());
            prop_assert_eq!(decoded.packet.id, id);
            prop_assert_eq!(Command::from_packet(&decoded.packet), Some(cmd));
        }
    }
}
