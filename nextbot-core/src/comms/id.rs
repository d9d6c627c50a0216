//! Correlation id generation

/// Pseudo-random correlation ids in `0..=254`
///
/// A xorshift32 sequence. The ids only have to differ between consecutive
/// commands often enough to expose stale responses.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdGenerator {
    state: u32,
}

impl IdGenerator {
    /// Create a generator; a zero seed is replaced by a fixed non-zero one
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x2545_F491 } else { seed },
        }
    }

    /// Next id
    pub fn next_id(&mut self) -> u8 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x % 255) as u8
    }
}
