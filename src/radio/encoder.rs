//! Codeword Encoder
//!
//! Expands a 12-symbol tri-state codeword into the 49 transition flags
//! the transmitter walks through. Each symbol becomes four flags, one per
//! line half-period; a flag selects a narrow (`false`) or wide (`true`)
//! interval before the next edge.
//!
//! | symbol | flags       | line                     |
//! |--------|-------------|--------------------------|
//! | `0`    | 0, 1, 0, 1  | short high, long low ×2  |
//! | `1`    | 1, 0, 1, 0  | long high, short low ×2  |
//! | `f`    | 0, 1, 1, 0  | short/long, long/short   |
//!
//! The trailing flag (always narrow) is the sync pulse that precedes the
//! sync gap.

use crate::config::{BITSTRING_LEN, FLAGS_PER_SYMBOL};
use crate::types::{Codeword, Interval, Symbol, Timing};

/// Transition flags for one symbol
#[must_use]
pub const fn symbol_flags(symbol: Symbol) -> [bool; FLAGS_PER_SYMBOL] {
    match symbol {
        Symbol::Zero => [false, true, false, true],
        Symbol::One => [true, false, true, false],
        Symbol::Float => [false, true, true, false],
    }
}

/// Encoded transition sequence for one codeword
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bitstring {
    flags: [bool; BITSTRING_LEN],
}

impl Bitstring {
    /// Number of flags
    pub const LEN: usize = BITSTRING_LEN;

    /// Encode a codeword
    #[must_use]
    pub fn encode(codeword: &Codeword) -> Self {
        let mut flags = [false; BITSTRING_LEN];
        for (chunk, &symbol) in flags
            .chunks_exact_mut(FLAGS_PER_SYMBOL)
            .zip(codeword.symbols())
        {
            chunk.copy_from_slice(&symbol_flags(symbol));
        }
        // flags[BITSTRING_LEN - 1] stays false: narrow sync pulse
        Self { flags }
    }

    /// All flags
    #[must_use]
    pub const fn flags(&self) -> &[bool; BITSTRING_LEN] {
        &self.flags
    }

    /// Flag at a position
    #[must_use]
    pub fn flag(&self, position: usize) -> Option<bool> {
        self.flags.get(position).copied()
    }

    /// Interval armed after the edge at `position`
    ///
    /// Positions inside the bitstring follow their flag; the position just
    /// past the last flag is the sync gap.
    #[must_use]
    pub fn interval(&self, position: usize) -> Interval {
        self.flag(position).map_or(Interval::Sync, Interval::from_flag)
    }

    /// Airtime of one codeword including its sync gap, in microseconds
    #[must_use]
    pub fn frame_duration_us(&self, timing: Timing) -> u64 {
        let flags: u64 = self
            .flags
            .iter()
            .map(|&wide| u64::from(timing.duration_us(Interval::from_flag(wide))))
            .sum();
        flags + u64::from(timing.duration_us(Interval::Sync))
    }
}

impl Default for Bitstring {
    fn default() -> Self {
        Self::encode(&Codeword::default())
    }
}

impl core::fmt::Debug for Bitstring {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Bitstring(")?;
        for &wide in &self.flags {
            f.write_str(if wide { "1" } else { "0" })?;
        }
        f.write_str(")")
    }
}

/// Encode a codeword into its transition flags
#[must_use]
pub fn encode(codeword: &Codeword) -> Bitstring {
    Bitstring::encode(codeword)
}
