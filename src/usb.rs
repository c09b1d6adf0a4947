//! USB Subsystem
//!
//! CDC ACM virtual serial port carrying the line-oriented control
//! protocol. The buffers are plain data structures and build on the host.

pub mod cdc;
