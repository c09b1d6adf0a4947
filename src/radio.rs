//! Radio Core
//!
//! Codeword encoding and the timed waveform transmitter.
//! Everything here is platform independent; the line and the alarm are
//! supplied by the HAL on target and by [`crate::sim`] on the host.

pub mod encoder;
pub mod guard;
pub mod transmitter;

pub use encoder::Bitstring;
pub use guard::BusyGuard;
pub use transmitter::{Alarm, Step, Transmitter, TxState};
