//! Hardware Abstraction Layer
//!
//! STM32G474 bindings for the radio core: the OOK data line, the one-shot
//! alarm that paces it, and the status LED.

pub mod alarm;
pub mod gpio;
pub mod rf_line;
