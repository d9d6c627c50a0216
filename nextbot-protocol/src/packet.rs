//! Packet encoding and decoding
//!
//! All packets have a fixed size and carry a start and an end marker:
//! - Command: `[0x55][id][opcode][p0..p5][0x99]`
//! - Response: `[0xAA][id][status][0x11]`
//! - Data: `[0xDD][text, 18 bytes NUL padded][0xEE]`
//!
//! Decoding never gives up on a marker mismatch. The fields are extracted
//! anyway and the first fault found is attached to the result, so the
//! receiver can log it and still act on the payload.

use heapless::Vec;

/// Command packet start marker
pub const COMMAND_START: u8 = 0x55;
/// Command packet end marker
pub const COMMAND_END: u8 = 0x99;
/// Command packet size in bytes
pub const COMMAND_LEN: usize = 10;
/// Number of parameter bytes in a command
pub const PARAM_LEN: usize = 6;

/// Response packet start marker
pub const RESPONSE_START: u8 = 0xAA;
/// Response packet end marker
pub const RESPONSE_END: u8 = 0x11;
/// Response packet size in bytes
pub const RESPONSE_LEN: usize = 4;

/// Status byte for a successfully executed command
pub const STATUS_OK: u8 = 0x50;
/// Status byte for a failed or superseded command
pub const STATUS_ERROR: u8 = 0x51;

/// Data packet start marker
pub const DATA_START: u8 = 0xDD;
/// Data packet end marker
pub const DATA_END: u8 = 0xEE;
/// Data packet size in bytes
pub const DATA_LEN: usize = 20;
/// Maximum text bytes carried by one data packet
pub const MAX_TEXT_LEN: usize = DATA_LEN - 2;

/// Errors that can be found while decoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte is not the packet's start marker
    BadStart { expected: u8, found: u8 },
    /// Last byte is not the packet's end marker
    BadEnd { expected: u8, found: u8 },
    /// Data packet text is not valid UTF-8
    InvalidText,
}

/// Result of a best-effort decode
///
/// `packet` always holds the extracted fields. `fault` is the first framing
/// problem found, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Fields extracted from the buffer
    pub packet: T,
    /// First framing fault, `None` for a well-formed packet
    pub fault: Option<FrameError>,
}

impl<T> Decoded<T> {
    /// Check whether both markers matched
    pub fn is_well_formed(&self) -> bool {
        self.fault.is_none()
    }

    /// Convert into a strict result, rejecting malformed packets
    pub fn into_result(self) -> Result<T, FrameError> {
        match self.fault {
            None => Ok(self.packet),
            Some(e) => Err(e),
        }
    }
}

/// Check both markers of a frame, returning the first mismatch
fn check_markers(buf: &[u8], start: u8, end: u8) -> Option<FrameError> {
    let first = buf[0];
    let last = buf[buf.len() - 1];
    if first != start {
        Some(FrameError::BadStart {
            expected: start,
            found: first,
        })
    } else if last != end {
        Some(FrameError::BadEnd {
            expected: end,
            found: last,
        })
    } else {
        None
    }
}

/// A command sent from master to slave
///
/// The opcode is kept as a raw byte: unknown opcodes are valid at the
/// framing level and only ignored later by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPacket {
    /// Correlation token, echoed by the response
    pub id: u8,
    /// Command identifier
    pub opcode: u8,
    /// Opcode-dependent parameters
    pub params: [u8; PARAM_LEN],
}

impl CommandPacket {
    /// Create a command packet
    pub const fn new(id: u8, opcode: u8, params: [u8; PARAM_LEN]) -> Self {
        Self { id, opcode, params }
    }

    /// Serialize into the 10-byte wire layout
    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        let mut buf = [0u8; COMMAND_LEN];
        buf[0] = COMMAND_START;
        buf[1] = self.id;
        buf[2] = self.opcode;
        buf[3..3 + PARAM_LEN].copy_from_slice(&self.params);
        buf[COMMAND_LEN - 1] = COMMAND_END;
        buf
    }

    /// Parse a 10-byte buffer
    pub fn decode(buf: &[u8; COMMAND_LEN]) -> Decoded<Self> {
        let mut params = [0u8; PARAM_LEN];
        params.copy_from_slice(&buf[3..3 + PARAM_LEN]);

        Decoded {
            packet: Self {
                id: buf[1],
                opcode: buf[2],
                params,
            },
            fault: check_markers(buf, COMMAND_START, COMMAND_END),
        }
    }
}

/// Outcome reported by the slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    /// Wire representation
    pub const fn to_byte(self) -> u8 {
        match self {
            Status::Ok => STATUS_OK,
            Status::Error => STATUS_ERROR,
        }
    }

    /// Parse a status byte; anything but OK counts as an error
    pub const fn from_byte(byte: u8) -> Self {
        if byte == STATUS_OK {
            Status::Ok
        } else {
            Status::Error
        }
    }
}

/// Acknowledgement from slave to master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponsePacket {
    /// Id of the command being answered
    pub id: u8,
    /// Execution outcome
    pub status: Status,
}

impl ResponsePacket {
    /// Create a response packet
    pub const fn new(id: u8, status: Status) -> Self {
        Self { id, status }
    }

    /// Serialize into the 4-byte wire layout
    pub fn encode(&self) -> [u8; RESPONSE_LEN] {
        [RESPONSE_START, self.id, self.status.to_byte(), RESPONSE_END]
    }

    /// Parse a 4-byte buffer
    pub fn decode(buf: &[u8; RESPONSE_LEN]) -> Decoded<Self> {
        Decoded {
            packet: Self {
                id: buf[1],
                status: Status::from_byte(buf[2]),
            },
            fault: check_markers(buf, RESPONSE_START, RESPONSE_END),
        }
    }
}

/// Text payload following a `DrawText` command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataPacket {
    text: Vec<u8, MAX_TEXT_LEN>,
}

impl DataPacket {
    /// Build a data packet, truncating to [`MAX_TEXT_LEN`] bytes
    ///
    /// Truncation never splits a UTF-8 character. Text is cut at the first
    /// NUL since NUL terminates the payload on the wire.
    pub fn from_text(text: &str) -> Self {
        let text = text.split('\0').next().unwrap_or("");
        let mut end = text.len().min(MAX_TEXT_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        let mut bytes = Vec::new();
        // Cannot fail, end <= MAX_TEXT_LEN
        let _ = bytes.extend_from_slice(&text.as_bytes()[..end]);
        Self { text: bytes }
    }

    /// Raw text bytes (without terminator or padding)
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Text as a string slice
    pub fn text(&self) -> Result<&str, FrameError> {
        core::str::from_utf8(&self.text).map_err(|_| FrameError::InvalidText)
    }

    /// Serialize into the 20-byte wire layout
    pub fn encode(&self) -> [u8; DATA_LEN] {
        let mut buf = [0u8; DATA_LEN];
        buf[0] = DATA_START;
        buf[1..1 + self.text.len()].copy_from_slice(&self.text);
        buf[DATA_LEN - 1] = DATA_END;
        buf
    }

    /// Parse a 20-byte buffer
    ///
    /// The text runs up to the first NUL or the end of the text region.
    pub fn decode(buf: &[u8; DATA_LEN]) -> Decoded<Self> {
        let region = &buf[1..1 + MAX_TEXT_LEN];
        let len = region
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_TEXT_LEN);

        let mut text = Vec::new();
        let _ = text.extend_from_slice(&region[..len]);

        Decoded {
            packet: Self { text },
            fault: check_markers(buf, DATA_START, DATA_END),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DataPacket {
    fn format(&self, f: defmt::Formatter) {
        match self.text() {
            Ok(text) => defmt::write!(f, "DataPacket({=str})", text),
            Err(_) => defmt::write!(f, "DataPacket({=[u8]})", self.as_bytes()),
        }
    }
}
