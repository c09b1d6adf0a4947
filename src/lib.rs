//! RF433 Tri-State Remote Transmitter Firmware Library
//!
//! Drives a sub-GHz OOK transmitter module from a single GPIO line to
//! reproduce the tri-state codewords understood by common fixed-code
//! remote-control receivers (10-symbol address + 2-symbol command, each
//! symbol `0`, `1` or floating `f`).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CONTROL SURFACE                           │
//! │  USB CDC line protocol  │  address / command / packet / send │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      RADIO CORE                              │
//! │  Codeword Encoder  │  Waveform Transmitter  │  Busy Guard    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / PLATFORM LAYER                       │
//! │  RF data line (GPIO)  │  Alarm (embassy-time)  │  Status LED │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The radio core is platform independent: the transmitter is generic over
//! an [`embedded_hal::digital::OutputPin`] and an [`radio::transmitter::Alarm`]
//! ("call me back after D microseconds"). On the host the [`sim`] module
//! supplies both with a simulated clock.
//!
//! # Design Principles
//!
//! - **Type-driven design**: codeword fields can only hold legal symbols
//! - **Validate, then commit**: rejected input never mutates stored state
//! - **Single flight**: one transmission at a time, enforced by a try-lock
//! - **Stop always wins**: cancellation is unconditional and idempotent
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Hardware Abstraction Layer
///
/// RF data line bring-up, embassy alarm, status LED.
#[cfg(feature = "embedded")]
pub mod hal;

/// Radio Core
///
/// Codeword encoder, waveform transmitter state machine and busy guard.
pub mod radio;

/// Control Protocol
///
/// Attribute show/store semantics and the line-oriented command parser.
pub mod protocol;

/// USB Subsystem
///
/// CDC ACM buffers for the control protocol.
pub mod usb;

/// Shared types used across modules
pub mod types;

/// Error type shared by every fallible operation
pub mod error;

/// System configuration and constants
pub mod config;

/// Host simulation of the output line and alarm
#[cfg(feature = "std")]
pub mod sim;

pub use error::{Error, Result};

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;
    pub use crate::radio::{Bitstring, BusyGuard, Transmitter, TxState};
    pub use crate::radio::transmitter::Alarm;

    // Common traits
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use crate::error::{Error, Result};

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
