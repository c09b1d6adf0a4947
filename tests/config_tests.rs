//! Configuration and Constants Tests
//!
//! Tests to verify configuration values are valid and consistent.
//! Run with: cargo test --test config_tests

use rf433_firmware::config::*;
use rf433_firmware::types::{Interval, Timing};

// =============================================================================
// Timing Tests
// =============================================================================

#[test]
fn narrow_pulse_in_range() {
    assert!(NARROW_PULSE_US >= MIN_NARROW_PULSE_US);
    assert!(NARROW_PULSE_US <= MAX_NARROW_PULSE_US);
}

#[test]
fn wide_is_three_narrow() {
    assert_eq!(WIDE_PULSE_UNITS, 3);
    assert_eq!(Interval::Wide.units(), WIDE_PULSE_UNITS);
}

#[test]
fn sync_gap_dominates_symbols() {
    // Receivers resynchronise on a gap longer than any symbol
    assert!(SYNC_GAP_UNITS > 2 * (1 + WIDE_PULSE_UNITS));
}

#[test]
fn default_timing_matches_constants() {
    assert_eq!(default_timing(), Timing::DEFAULT);
    assert_eq!(default_timing().narrow_us(), NARROW_PULSE_US);
}

#[test]
fn max_sync_fits_alarm_range() {
    let longest = Timing::from_narrow_us(MAX_NARROW_PULSE_US).unwrap();
    assert_eq!(longest.duration_us(Interval::Sync), 60_000);
}

// =============================================================================
// Codeword Geometry Tests
// =============================================================================

#[test]
fn codeword_length() {
    assert_eq!(CODEWORD_LEN, ADDRESS_LEN + COMMAND_LEN);
    assert_eq!(CODEWORD_LEN, 12);
}

#[test]
fn bitstring_length() {
    // Four flags per symbol plus the sync pulse
    assert_eq!(BITSTRING_LEN, CODEWORD_LEN * FLAGS_PER_SYMBOL + 1);
    assert_eq!(BITSTRING_LEN, 49);
}

#[test]
fn repeat_counts() {
    assert_eq!(SINGLE_FRAME_REPEATS, 10);
    assert!(CONTINUOUS_REPEATS > SINGLE_FRAME_REPEATS);
}

// =============================================================================
// Buffer and USB Tests
// =============================================================================

#[test]
fn show_buffer_holds_codeword_line() {
    assert!(SHOW_BUFFER_SIZE > CODEWORD_LEN);
}

#[test]
fn control_buffer_holds_longest_line() {
    // "address=" + 10 symbols, "packet=" + 12 symbols, plus CRLF
    assert!(CONTROL_BUFFER_SIZE >= "codeword=".len() + CODEWORD_LEN + 2);
    assert!(CONTROL_BUFFER_SIZE <= USB_CDC_PACKET_SIZE as usize);
}

#[test]
fn heartbeat_divides_into_polls() {
    assert!(STATUS_POLL_MS > 0);
    assert_eq!(HEARTBEAT_PERIOD_MS % STATUS_POLL_MS, 0);
}

#[test]
fn device_names() {
    assert_eq!(CLASS_NAME, "rf433");
    assert_eq!(DEVICE_NAME, "rf0");
}

#[test]
fn pin_assignments_distinct() {
    let all = [pins::LED_STATUS, pins::RF_DATA, pins::USB_DP, pins::USB_DM];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
