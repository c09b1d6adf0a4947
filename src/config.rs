//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the RF433 transmitter.
//! Protocol timing, codeword geometry, pin mappings and USB identity are
//! centralized here.

use crate::types::Timing;

/// Narrow pulse width in microseconds (one protocol time unit)
pub const NARROW_PULSE_US: u32 = 350;

/// Shortest narrow pulse accepted by [`Timing::from_narrow_us`]
pub const MIN_NARROW_PULSE_US: u32 = 50;

/// Longest narrow pulse accepted by [`Timing::from_narrow_us`]
pub const MAX_NARROW_PULSE_US: u32 = 2_000;

/// Wide pulse length in narrow units
pub const WIDE_PULSE_UNITS: u32 = 3;

/// Sync gap length in narrow units
pub const SYNC_GAP_UNITS: u32 = 30;

/// Address field length in symbols
pub const ADDRESS_LEN: usize = 10;

/// Command field length in symbols
pub const COMMAND_LEN: usize = 2;

/// Full codeword length in symbols
pub const CODEWORD_LEN: usize = ADDRESS_LEN + COMMAND_LEN;

/// Transition flags emitted per symbol
pub const FLAGS_PER_SYMBOL: usize = 4;

/// Encoded bitstring length: four flags per symbol plus the sync flag
pub const BITSTRING_LEN: usize = CODEWORD_LEN * FLAGS_PER_SYMBOL + 1;

/// Codeword repetitions sent by a single-frame trigger
pub const SINGLE_FRAME_REPEATS: u32 = 10;

/// Repeat sentinel for continuous (programming) mode
pub const CONTINUOUS_REPEATS: u32 = u32::MAX;

/// Device class name on the control surface
pub const CLASS_NAME: &str = "rf433";

/// Device instance name on the control surface
pub const DEVICE_NAME: &str = "rf0";

/// Control protocol line buffer size
pub const CONTROL_BUFFER_SIZE: usize = 64;

/// Buffer size for a rendered attribute value (codeword + newline)
pub const SHOW_BUFFER_SIZE: usize = 16;

/// USB VID (use test VID for development)
pub const USB_VID: u16 = 0x1209;

/// USB PID (get from pid.codes for production)
pub const USB_PID: u16 = 0x0001;

/// USB CDC ACM packet size
pub const USB_CDC_PACKET_SIZE: u16 = 64;

/// Status LED heartbeat period while idle (milliseconds)
pub const HEARTBEAT_PERIOD_MS: u64 = 1_000;

/// Status LED refresh period (milliseconds)
pub const STATUS_POLL_MS: u64 = 50;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Status LED (directly on MCU)
    pub const LED_STATUS: &str = "PA5";

    /// OOK data line into the transmitter module
    pub const RF_DATA: &str = "PB0";

    /// USB D+ (handled by USB peripheral)
    pub const USB_DP: &str = "PA12";

    /// USB D- (handled by USB peripheral)
    pub const USB_DM: &str = "PA11";
}

/// Default protocol timing
#[must_use]
pub const fn default_timing() -> Timing {
    Timing::DEFAULT
}
