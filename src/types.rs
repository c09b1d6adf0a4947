//! Shared types used across the RF433 firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at construction time: a stored codeword can only ever contain legal
//! symbols, and every parse is validate-then-commit.

use core::fmt;

use crate::config::{
    ADDRESS_LEN, CODEWORD_LEN, COMMAND_LEN, CONTINUOUS_REPEATS, MAX_NARROW_PULSE_US,
    MIN_NARROW_PULSE_US, NARROW_PULSE_US, SINGLE_FRAME_REPEATS, SYNC_GAP_UNITS, WIDE_PULSE_UNITS,
};
use crate::error::{Error, Result};

/// Tri-state code symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Symbol {
    /// Logic zero
    #[default]
    Zero,
    /// Logic one
    One,
    /// Floating (open) pin on the encoder chip
    Float,
}

impl Symbol {
    /// Parse a symbol character (`0`, `1`, `f` or `F`)
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            'f' | 'F' => Some(Self::Float),
            _ => None,
        }
    }

    /// Parse a symbol byte
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        Self::from_char(b as char)
    }

    /// Canonical character (floating is rendered lowercase)
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Float => 'f',
        }
    }

    /// Check if this symbol is `0` or `1`
    #[must_use]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::Float)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Symbol {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.as_char());
    }
}

/// Validate `input` as exactly `N` symbols, optionally refusing `f`.
///
/// Nothing is returned unless every character is legal, so callers can
/// commit the result without a partial-write path.
fn parse_symbols<const N: usize>(input: &str, allow_float: bool) -> Result<[Symbol; N]> {
    let bytes = input.as_bytes();
    if bytes.len() != N {
        return Err(Error::InvalidArgument);
    }

    let mut symbols = [Symbol::Zero; N];
    for (slot, &b) in symbols.iter_mut().zip(bytes) {
        let symbol = Symbol::from_byte(b).ok_or(Error::InvalidArgument)?;
        if !allow_float && !symbol.is_binary() {
            return Err(Error::InvalidArgument);
        }
        *slot = symbol;
    }
    Ok(symbols)
}

fn write_symbols(f: &mut fmt::Formatter<'_>, symbols: &[Symbol]) -> fmt::Result {
    symbols.iter().try_for_each(|s| write!(f, "{}", s.as_char()))
}

/// Address field: 10 tri-state symbols
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address([Symbol; ADDRESS_LEN]);

impl Address {
    /// Create from symbols
    #[must_use]
    pub const fn new(symbols: [Symbol; ADDRESS_LEN]) -> Self {
        Self(symbols)
    }

    /// Parse 10 characters from `{0, 1, f, F}`
    ///
    /// # Errors
    /// `Error::InvalidArgument` on wrong length or an illegal character.
    pub fn parse(input: &str) -> Result<Self> {
        parse_symbols(input, true).map(Self)
    }

    /// Get the symbols
    #[must_use]
    pub const fn symbols(&self) -> &[Symbol; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbols(f, &self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Command field: 2 symbols
///
/// [`Command::parse`] only accepts `0` and `1`. A command read back from a
/// codeword that was stored whole may still carry `f`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Command([Symbol; COMMAND_LEN]);

impl Command {
    /// Parse 2 characters from `{0, 1}`
    ///
    /// # Errors
    /// `Error::InvalidArgument` on wrong length or any other character.
    pub fn parse(input: &str) -> Result<Self> {
        parse_symbols(input, false).map(Self)
    }

    /// Create from two binary values
    #[must_use]
    pub const fn from_bits(first: bool, second: bool) -> Self {
        const fn bit(b: bool) -> Symbol {
            if b {
                Symbol::One
            } else {
                Symbol::Zero
            }
        }
        Self([bit(first), bit(second)])
    }

    /// Get the symbols
    #[must_use]
    pub const fn symbols(&self) -> &[Symbol; COMMAND_LEN] {
        &self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbols(f, &self.0)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({self})")
    }
}

/// Complete 12-symbol codeword: address followed by command
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Codeword([Symbol; CODEWORD_LEN]);

impl Codeword {
    /// Build from address and command fields
    #[must_use]
    pub fn new(address: Address, command: Command) -> Self {
        Self::default().with_address(address).with_command(command)
    }

    /// Parse 12 characters from `{0, 1, f, F}`
    ///
    /// # Errors
    /// `Error::InvalidArgument` on wrong length or an illegal character.
    pub fn parse(input: &str) -> Result<Self> {
        parse_symbols(input, true).map(Self)
    }

    /// Get all 12 symbols
    #[must_use]
    pub const fn symbols(&self) -> &[Symbol; CODEWORD_LEN] {
        &self.0
    }

    /// Get the address field
    #[must_use]
    pub fn address(&self) -> Address {
        let mut symbols = [Symbol::Zero; ADDRESS_LEN];
        symbols.copy_from_slice(&self.0[..ADDRESS_LEN]);
        Address(symbols)
    }

    /// Get the command field
    #[must_use]
    pub fn command(&self) -> Command {
        let mut symbols = [Symbol::Zero; COMMAND_LEN];
        symbols.copy_from_slice(&self.0[ADDRESS_LEN..]);
        Command(symbols)
    }

    /// Replace the address field
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.0[..ADDRESS_LEN].copy_from_slice(address.symbols());
        self
    }

    /// Replace the command field
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.0[ADDRESS_LEN..].copy_from_slice(command.symbols());
        self
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbols(f, &self.0)
    }
}

impl fmt::Debug for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codeword({self})")
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Codeword {
    fn format(&self, f: defmt::Formatter) {
        let s = self.0.map(Symbol::as_char);
        defmt::write!(
            f,
            "{}{}{}{}{}{}{}{}{}{}:{}{}",
            s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7], s[8], s[9], s[10], s[11]
        );
    }
}

/// Length class of one timed interval on the output line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interval {
    /// One time unit
    Narrow,
    /// Three time units
    Wide,
    /// Inter-codeword silence
    Sync,
}

impl Interval {
    /// Duration in narrow time units
    #[must_use]
    pub const fn units(self) -> u32 {
        match self {
            Self::Narrow => 1,
            Self::Wide => WIDE_PULSE_UNITS,
            Self::Sync => SYNC_GAP_UNITS,
        }
    }

    /// Interval selected by a transition flag
    #[must_use]
    pub const fn from_flag(wide: bool) -> Self {
        if wide {
            Self::Wide
        } else {
            Self::Narrow
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Interval {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Narrow => defmt::write!(f, "narrow"),
            Self::Wide => defmt::write!(f, "wide"),
            Self::Sync => defmt::write!(f, "sync"),
        }
    }
}

/// Protocol timing, expressed through the narrow pulse width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    narrow_us: u32,
}

impl Timing {
    /// Timing with the default narrow pulse width
    pub const DEFAULT: Self = Self {
        narrow_us: NARROW_PULSE_US,
    };

    /// Create from a narrow pulse width, returns None if out of range
    #[must_use]
    pub const fn from_narrow_us(narrow_us: u32) -> Option<Self> {
        if narrow_us >= MIN_NARROW_PULSE_US && narrow_us <= MAX_NARROW_PULSE_US {
            Some(Self { narrow_us })
        } else {
            None
        }
    }

    /// Narrow pulse width in microseconds
    #[must_use]
    pub const fn narrow_us(self) -> u32 {
        self.narrow_us
    }

    /// Duration of an interval in microseconds
    #[must_use]
    pub const fn duration_us(self, interval: Interval) -> u32 {
        self.narrow_us * interval.units()
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How many times the codeword is repeated per trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatMode {
    /// Fixed burst of [`SINGLE_FRAME_REPEATS`] codewords
    SingleFrame,
    /// Until stopped (used to put receivers into learn mode)
    Continuous,
}

impl RepeatMode {
    /// Initial repeat count
    #[must_use]
    pub const fn repeats(self) -> u32 {
        match self {
            Self::SingleFrame => SINGLE_FRAME_REPEATS,
            Self::Continuous => CONTINUOUS_REPEATS,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RepeatMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::SingleFrame => defmt::write!(f, "single"),
            Self::Continuous => defmt::write!(f, "continuous"),
        }
    }
}

/// Value written to the `send` attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// `0`: cancel any transmission
    Stop,
    /// `1` or `2`: start a transmission
    Send(RepeatMode),
}

impl Trigger {
    /// Decode a numeric trigger code
    ///
    /// # Errors
    /// `Error::InvalidArgument` for any code other than 0, 1 or 2.
    pub const fn from_code(code: u16) -> Result<Self> {
        match code {
            0 => Ok(Self::Stop),
            1 => Ok(Self::Send(RepeatMode::SingleFrame)),
            2 => Ok(Self::Send(RepeatMode::Continuous)),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Parse a decimal trigger code
    ///
    /// # Errors
    /// `Error::InvalidArgument` if the text is not a valid code.
    pub fn parse(input: &str) -> Result<Self> {
        let code: u16 = input.trim().parse().map_err(|_| Error::InvalidArgument)?;
        Self::from_code(code)
    }

    /// Numeric trigger code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Stop => 0,
            Self::Send(RepeatMode::SingleFrame) => 1,
            Self::Send(RepeatMode::Continuous) => 2,
        }
    }
}
