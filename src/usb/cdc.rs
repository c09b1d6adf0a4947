//! USB CDC ACM (Serial) Implementation
//!
//! Provides the virtual serial port that carries the control protocol.

#[cfg(feature = "embedded")]
use embassy_usb::class::cdc_acm::State;
use heapless::Vec;

use crate::config::CONTROL_BUFFER_SIZE;

/// CDC ACM state
#[cfg(feature = "embedded")]
pub struct CdcState<'d> {
    state: State<'d>,
}

#[cfg(feature = "embedded")]
impl Default for CdcState<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl<'d> CdcState<'d> {
    /// Create new CDC state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::new(),
        }
    }

    /// Get reference to state for class creation
    pub fn state_mut(&mut self) -> &mut State<'d> {
        &mut self.state
    }
}

const fn is_terminator(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// CDC read buffer
///
/// Accumulates packets and hands out complete lines. A line that does not
/// fit the buffer is dropped whole: input is skipped up to and including
/// its terminator, and no part of it is ever returned.
pub struct CdcReadBuffer {
    buffer: [u8; CONTROL_BUFFER_SIZE],
    read_pos: usize,
    write_pos: usize,
    overflows: u32,
    discarding: bool,
}

impl CdcReadBuffer {
    /// Create a new read buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; CONTROL_BUFFER_SIZE],
            read_pos: 0,
            write_pos: 0,
            overflows: 0,
            discarding: false,
        }
    }

    /// Push data into buffer, returns bytes accepted
    ///
    /// Skipped bytes of an overlong line count as accepted.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let mut written = 0;
        for &byte in data {
            if self.discarding {
                self.discarding = !is_terminator(byte);
                written += 1;
                continue;
            }
            // Blank lines and split CRLF pairs carry nothing
            if is_terminator(byte) && self.available() == 0 {
                written += 1;
                continue;
            }
            if self.write_pos == CONTROL_BUFFER_SIZE {
                self.compact();
            }
            if self.write_pos == CONTROL_BUFFER_SIZE {
                if self.has_line() {
                    // Caller must drain lines first
                    break;
                }
                warn!("control input overflow, dropping line");
                self.overflows = self.overflows.wrapping_add(1);
                self.clear();
                self.discarding = !is_terminator(byte);
                written += 1;
                continue;
            }
            self.buffer[self.write_pos] = byte;
            self.write_pos += 1;
            written += 1;
        }
        written
    }

    /// Read a line (up to newline or CR)
    pub fn read_line(&mut self) -> Option<Vec<u8, CONTROL_BUFFER_SIZE>> {
        let pos = self.buffer[self.read_pos..self.write_pos]
            .iter()
            .position(|&b| is_terminator(b))?;

        let end = self.read_pos + pos;
        let mut line = Vec::new();
        // Cannot fail: a line is never longer than the buffer
        let _ = line.extend_from_slice(&self.buffer[self.read_pos..end]);

        // Skip the terminator run (CRLF, blank lines)
        self.read_pos = end + 1;
        while self.read_pos < self.write_pos && is_terminator(self.buffer[self.read_pos]) {
            self.read_pos += 1;
        }

        if self.read_pos >= CONTROL_BUFFER_SIZE / 2 {
            self.compact();
        }

        Some(line)
    }

    fn has_line(&self) -> bool {
        self.buffer[self.read_pos..self.write_pos]
            .iter()
            .any(|&b| is_terminator(b))
    }

    /// Compact the buffer
    fn compact(&mut self) {
        if self.read_pos > 0 {
            let remaining = self.write_pos - self.read_pos;
            self.buffer.copy_within(self.read_pos..self.write_pos, 0);
            self.read_pos = 0;
            self.write_pos = remaining;
        }
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.discarding = false;
    }

    /// Check if the rest of an overlong line is being skipped
    #[must_use]
    pub const fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Get available bytes
    #[must_use]
    pub const fn available(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Get free space
    #[must_use]
    pub const fn free(&self) -> usize {
        CONTROL_BUFFER_SIZE - self.write_pos
    }

    /// Number of overlong lines dropped
    #[must_use]
    pub const fn overflows(&self) -> u32 {
        self.overflows
    }
}

impl Default for CdcReadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// CDC write buffer
pub struct CdcWriteBuffer {
    buffer: [u8; CONTROL_BUFFER_SIZE],
    len: usize,
}

impl CdcWriteBuffer {
    /// Create a new write buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; CONTROL_BUFFER_SIZE],
            len: 0,
        }
    }

    /// Write data to buffer
    pub fn write(&mut self, data: &[u8]) -> usize {
        let space = CONTROL_BUFFER_SIZE - self.len;
        let to_write = data.len().min(space);
        self.buffer[self.len..self.len + to_write].copy_from_slice(&data[..to_write]);
        self.len += to_write;
        to_write
    }

    /// Write a string
    pub fn write_str(&mut self, s: &str) -> usize {
        self.write(s.as_bytes())
    }

    /// Write with CRLF
    ///
    /// The terminator is always kept: the payload is truncated to leave
    /// room for it.
    pub fn writeln(&mut self, data: &[u8]) -> usize {
        let room = CONTROL_BUFFER_SIZE.saturating_sub(self.len + 2);
        let written = self.write(&data[..data.len().min(room)]);
        written + self.write(b"\r\n")
    }

    /// Get buffer contents
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Get used length
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for CdcWriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// USB device descriptor strings
pub struct UsbStrings {
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// Product name
    pub product: &'static str,
    /// Serial number
    pub serial: &'static str,
}

impl Default for UsbStrings {
    fn default() -> Self {
        Self {
            manufacturer: "RF433 Project",
            product: "RF433 Transmitter",
            serial: crate::config::DEVICE_NAME,
        }
    }
}

/// USB device info for descriptor
#[derive(Clone, Copy, Debug)]
pub struct UsbDeviceInfo {
    /// Vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// Device release number
    pub device_release: u16,
}

impl Default for UsbDeviceInfo {
    fn default() -> Self {
        Self {
            vid: crate::config::USB_VID,
            pid: crate::config::USB_PID,
            device_release: 0x0100,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for UsbDeviceInfo {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "USB({:04X}:{:04X})", self.vid, self.pid);
    }
}
