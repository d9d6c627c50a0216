//! Command opcodes

/// Command identifiers carried in byte 2 of a command packet
///
/// Drawing opcodes live in `0x10..=0x19`, motion opcodes in `0x31..=0x37`.
/// `0x11` is unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    DrawPoint = 0x10,
    DrawLine = 0x12,
    DrawCircle = 0x13,
    DrawDisc = 0x14,
    DrawTriangle = 0x15,
    DrawRectangle = 0x16,
    DrawBox = 0x17,
    /// Text follows in a data packet
    DrawText = 0x18,
    ClearScreen = 0x19,
    LeftMotor = 0x31,
    RightMotor = 0x32,
    Move = 0x33,
    MoveTo = 0x34,
    Stop = 0x35,
    Turn = 0x36,
    RotateTo = 0x37,
}

impl Opcode {
    /// Parse an opcode byte, `None` for unassigned values
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x10 => Some(Opcode::DrawPoint),
            0x12 => Some(Opcode::DrawLine),
            0x13 => Some(Opcode::DrawCircle),
            0x14 => Some(Opcode::DrawDisc),
            0x15 => Some(Opcode::DrawTriangle),
            0x16 => Some(Opcode::DrawRectangle),
            0x17 => Some(Opcode::DrawBox),
            0x18 => Some(Opcode::DrawText),
            0x19 => Some(Opcode::ClearScreen),
            0x31 => Some(Opcode::LeftMotor),
            0x32 => Some(Opcode::RightMotor),
            0x33 => Some(Opcode::Move),
            0x34 => Some(Opcode::MoveTo),
            0x35 => Some(Opcode::Stop),
            0x36 => Some(Opcode::Turn),
            0x37 => Some(Opcode::RotateTo),
            _ => None,
        }
    }

    /// Wire value
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Whether the command only completes once the drive train settles
    pub const fn is_positioning(self) -> bool {
        matches!(self, Opcode::MoveTo | Opcode::RotateTo)
    }

    /// Whether the command targets the display
    pub const fn is_drawing(self) -> bool {
        (self as u8) < 0x30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Opcode; 16] = [
        Opcode::DrawPoint,
        Opcode::DrawLine,
        Opcode::DrawCircle,
        Opcode::DrawDisc,
        Opcode::DrawTriangle,
        Opcode::DrawRectangle,
        Opcode::DrawBox,
        Opcode::DrawText,
        Opcode::ClearScreen,
        Opcode::LeftMotor,
        Opcode::RightMotor,
        Opcode::Move,
        Opcode::MoveTo,
        Opcode::Stop,
        Opcode::Turn,
        Opcode::RotateTo,
    ];

    #[test]
    fn test_opcode_bytes_are_stable() {
        assert_eq!(Opcode::DrawRectangle.to_byte(), 0x16);
        assert_eq!(Opcode::DrawText.to_byte(), 0x18);
        assert_eq!(Opcode::MoveTo.to_byte(), 0x34);
        assert_eq!(Opcode::RotateTo.to_byte(), 0x37);
    }

    #[test]
    fn test_from_byte_matches_to_byte() {
        for op in ALL {
            assert_eq!(Opcode::from_byte(op.to_byte()), Some(op));
        }
    }

    #[test]
    fn test_unassigned_bytes() {
        assert_eq!(Opcode::from_byte(0x00), None);
        assert_eq!(Opcode::from_byte(0x11), None);
        assert_eq!(Opcode::from_byte(0x30), None);
        assert_eq!(Opcode::from_byte(0xFF), None);
    }

    #[test]
    fn test_categories() {
        assert!(Opcode::MoveTo.is_positioning());
        assert!(Opcode::RotateTo.is_positioning());
        assert!(!Opcode::Move.is_positioning());
        assert!(Opcode::ClearScreen.is_drawing());
        assert!(!Opcode::Stop.is_drawing());
    }
}
