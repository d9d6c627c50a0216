//! Communication errors

/// Failures reported to the master's caller
///
/// None of these is fatal. The caller decides whether to re-issue the
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommsError {
    /// The bus write failed
    Bus,
    /// No response frame appeared within the polling budget
    Timeout,
    /// The slave answered with an error status
    Rejected { id: u8 },
    /// The response answers a different command
    Mismatch { expected: u8, found: u8 },
    /// Text does not fit a data packet
    TextTooLong,
    /// `DrawText` was sent without its data packet
    MissingText,
}
