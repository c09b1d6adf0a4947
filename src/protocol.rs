//! Control Protocol
//!
//! Attribute show/store semantics for the four device properties
//! (`address`, `command`, `packet`, `send`) and a line-oriented parser
//! that exposes them over a byte stream.
//!
//! Lines look like:
//!
//! ```text
//! address?              show, replies with the value
//! address=01f0010000    store, replies OK or ERR <errno> <text>
//! send=1                trigger a single frame
//! status                IDLE | SENDING pos=<p> repeats=<n|inf>
//! ```

use core::fmt::Write as _;

use embedded_hal::digital::OutputPin;
use heapless::{String, Vec};

use crate::config::{CONTROL_BUFFER_SIZE, SHOW_BUFFER_SIZE};
use crate::error::{Error, Result};
use crate::radio::transmitter::{Alarm, Transmitter, TxState};
use crate::types::{Address, Codeword, Command, Trigger};

/// Device property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    /// 10-symbol address field
    Address,
    /// 2-symbol command field
    Command,
    /// Whole 12-symbol codeword
    Codeword,
    /// Write-only trigger
    Send,
}

impl Attribute {
    /// Look up an attribute by name (`codeword` is accepted for `packet`)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "address" => Some(Self::Address),
            "command" => Some(Self::Command),
            "packet" | "codeword" => Some(Self::Codeword),
            "send" => Some(Self::Send),
            _ => None,
        }
    }

    /// Canonical attribute name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Command => "command",
            Self::Codeword => "packet",
            Self::Send => "send",
        }
    }

    /// Check if the attribute can be read
    #[must_use]
    pub const fn is_readable(self) -> bool {
        !matches!(self, Self::Send)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Attribute {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

/// Render an attribute value followed by a newline
///
/// # Errors
/// `Error::InvalidArgument` for the write-only `send` attribute.
pub fn show<P, A>(tx: &Transmitter<P, A>, attr: Attribute) -> Result<String<SHOW_BUFFER_SIZE>>
where
    P: OutputPin,
    A: Alarm,
{
    let mut out = String::new();
    let written = match attr {
        Attribute::Address => writeln!(out, "{}", tx.address()),
        Attribute::Command => writeln!(out, "{}", tx.command()),
        Attribute::Codeword => writeln!(out, "{}", tx.codeword()),
        Attribute::Send => return Err(Error::InvalidArgument),
    };
    written.map_err(|_| Error::InvalidArgument)?;
    Ok(out)
}

/// Parse and apply a value written to an attribute
///
/// Only the first whitespace-delimited token is considered. On success
/// the whole input counts as consumed.
///
/// # Errors
/// - `Error::InvalidArgument` for empty or malformed input
/// - `Error::Busy` when editing the codeword, or starting, mid-session
/// - `Error::Line` if a trigger could not drive the line
pub fn store<P, A>(tx: &mut Transmitter<P, A>, attr: Attribute, input: &str) -> Result<usize>
where
    P: OutputPin,
    A: Alarm,
{
    let token = input
        .split_whitespace()
        .next()
        .ok_or(Error::InvalidArgument)?;

    match attr {
        Attribute::Address => tx.set_address(Address::parse(token)?)?,
        Attribute::Command => tx.set_command(Command::parse(token)?)?,
        Attribute::Codeword => tx.set_codeword(Codeword::parse(token)?)?,
        Attribute::Send => tx.trigger(Trigger::parse(token)?)?,
    }

    debug!("stored {}", attr);
    Ok(input.len())
}

/// Parsed control line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCommand {
    /// Read an attribute
    Show(Attribute),
    /// Write an attribute
    Store(Attribute, String<CONTROL_BUFFER_SIZE>),
    /// Report transmitter state
    Status,
    /// Unrecognised line
    Unknown,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ControlCommand {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Show(attr) => defmt::write!(f, "Show({})", attr),
            Self::Store(attr, value) => defmt::write!(f, "Store({}, {})", attr, value.as_str()),
            Self::Status => defmt::write!(f, "Status"),
            Self::Unknown => defmt::write!(f, "Unknown"),
        }
    }
}

/// Parse one complete line (without its terminator)
#[must_use]
pub fn parse_line(line: &[u8]) -> Option<ControlCommand> {
    let line = core::str::from_utf8(line).ok()?.trim();
    if line.is_empty() {
        return None;
    }

    if line == "status" {
        return Some(ControlCommand::Status);
    }

    let command = if let Some((name, value)) = line.split_once('=') {
        match (Attribute::from_name(name.trim()), String::try_from(value)) {
            (Some(attr), Ok(value)) => ControlCommand::Store(attr, value),
            _ => ControlCommand::Unknown,
        }
    } else {
        let name = line.strip_suffix('?').unwrap_or(line).trim();
        Attribute::from_name(name).map_or(ControlCommand::Unknown, ControlCommand::Show)
    };
    Some(command)
}

/// Byte-fed control line parser
///
/// A line longer than the buffer is dropped whole: everything up to its
/// terminator is skipped and nothing is returned for it.
pub struct ControlParser {
    buffer: Vec<u8, CONTROL_BUFFER_SIZE>,
    discarding: bool,
}

impl ControlParser {
    /// Create a new parser
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feed a byte to the parser
    /// Returns a command if a line is complete
    pub fn feed(&mut self, byte: u8) -> Option<ControlCommand> {
        if byte == b'\n' || byte == b'\r' {
            if core::mem::take(&mut self.discarding) {
                return None;
            }
            let cmd = parse_line(&self.buffer);
            self.buffer.clear();
            cmd
        } else {
            if !self.discarding && self.buffer.push(byte).is_err() {
                warn!("control line overflow, skipping to end of line");
                self.buffer.clear();
                self.discarding = true;
            }
            None
        }
    }

    /// Check if the rest of an overlong line is being skipped
    #[must_use]
    pub const fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Discard any partial line
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

impl Default for ControlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Control response formatter
pub struct ControlResponse {
    buffer: String<CONTROL_BUFFER_SIZE>,
}

impl ControlResponse {
    /// Create a new response formatter
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Format success
    pub fn ok(&mut self) {
        self.buffer.clear();
        let _ = self.buffer.push_str("OK");
    }

    /// Format an error as `ERR <errno> <text>`
    pub fn error(&mut self, err: Error) {
        self.buffer.clear();
        let _ = write!(self.buffer, "ERR {} {}", err.errno(), err);
    }

    /// Format an attribute value (trailing newline dropped)
    pub fn value(&mut self, value: &str) {
        self.buffer.clear();
        let _ = self.buffer.push_str(value.trim_end());
    }

    /// Format transmitter state
    pub fn status(&mut self, state: TxState, continuous: bool) {
        self.buffer.clear();
        let _ = match state {
            TxState::Idle => self.buffer.push_str("IDLE").map_err(|()| core::fmt::Error),
            TxState::Sending { position, .. } if continuous => {
                write!(self.buffer, "SENDING pos={position} repeats=inf")
            }
            TxState::Sending {
                position,
                repeats_remaining,
            } => write!(
                self.buffer,
                "SENDING pos={position} repeats={repeats_remaining}"
            ),
        };
    }

    /// Get the response string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Get the response bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ControlResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a parsed command against the transmitter and format the reply
pub fn execute<P, A>(tx: &mut Transmitter<P, A>, cmd: &ControlCommand, resp: &mut ControlResponse)
where
    P: OutputPin,
    A: Alarm,
{
    match cmd {
        ControlCommand::Show(attr) => match show(tx, *attr) {
            Ok(value) => resp.value(&value),
            Err(e) => resp.error(e),
        },
        ControlCommand::Store(attr, value) => match store(tx, *attr, value) {
            Ok(_) => resp.ok(),
            Err(e) => {
                warn!("store {} rejected: {}", attr, e);
                resp.error(e);
            }
        },
        ControlCommand::Status => resp.status(tx.state(), tx.is_continuous()),
        ControlCommand::Unknown => resp.error(Error::InvalidArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_show_and_store() {
        assert_eq!(
            parse_line(b"address?"),
            Some(ControlCommand::Show(Attribute::Address))
        );
        assert_eq!(
            parse_line(b"codeword"),
            Some(ControlCommand::Show(Attribute::Codeword))
        );
        assert_eq!(
            parse_line(b"send=2"),
            Some(ControlCommand::Store(
                Attribute::Send,
                String::try_from("2").unwrap()
            ))
        );
        assert_eq!(parse_line(b"status"), Some(ControlCommand::Status));
        assert_eq!(parse_line(b"frequency?"), Some(ControlCommand::Unknown));
        assert_eq!(parse_line(b"  "), None);
    }

    #[test]
    fn parser_splits_lines() {
        let mut parser = ControlParser::new();
        let mut out = None;
        for &b in b"command=10\r\n" {
            if let Some(cmd) = parser.feed(b) {
                out = Some(cmd);
            }
        }
        assert_eq!(
            out,
            Some(ControlCommand::Store(
                Attribute::Command,
                String::try_from("10").unwrap()
            ))
        );
    }

    #[test]
    fn error_format() {
        let mut resp = ControlResponse::new();
        resp.error(Error::Busy);
        assert_eq!(resp.as_str(), "ERR -16 device busy");
    }

    #[test]
    fn status_format() {
        let mut resp = ControlResponse::new();
        resp.status(TxState::Idle, false);
        assert_eq!(resp.as_str(), "IDLE");
        let sending = TxState::Sending {
            position: 12,
            repeats_remaining: 7,
        };
        resp.status(sending, false);
        assert_eq!(resp.as_str(), "SENDING pos=12 repeats=7");
        resp.status(sending, true);
        assert_eq!(resp.as_str(), "SENDING pos=12 repeats=inf");
    }
}
