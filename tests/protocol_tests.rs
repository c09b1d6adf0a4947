//! Control Protocol Tests
//!
//! Tests for attribute show/store semantics and the line protocol
//! Run with: cargo test --test protocol_tests

use rf433_firmware::config::CONTROL_BUFFER_SIZE;
use rf433_firmware::protocol::{
    execute, parse_line, show, store, Attribute, ControlCommand, ControlParser, ControlResponse,
};
use rf433_firmware::radio::{Transmitter, TxState};
use rf433_firmware::sim::{self, SimAlarm, SimClock, SimLine};
use rf433_firmware::types::Timing;
use rf433_firmware::Error;

fn transmitter() -> Transmitter<SimLine, SimAlarm> {
    Transmitter::new(SimLine::new(SimClock::new()), SimAlarm::new(), Timing::DEFAULT)
}

/// Feed a line through the parser and run it
fn run(tx: &mut Transmitter<SimLine, SimAlarm>, line: &str) -> String {
    let mut parser = ControlParser::new();
    let mut resp = ControlResponse::new();
    let mut cmd = None;
    for &b in line.as_bytes().iter().chain(b"\n") {
        if let Some(c) = parser.feed(b) {
            cmd = Some(c);
        }
    }
    execute(tx, &cmd.expect("complete line"), &mut resp);
    resp.as_str().to_string()
}

// =============================================================================
// Show Tests
// =============================================================================

#[test]
fn show_defaults() {
    let tx = transmitter();
    assert_eq!(show(&tx, Attribute::Address).unwrap().as_str(), "0000000000\n");
    assert_eq!(show(&tx, Attribute::Command).unwrap().as_str(), "00\n");
    assert_eq!(show(&tx, Attribute::Codeword).unwrap().as_str(), "000000000000\n");
}

#[test]
fn show_send_is_write_only() {
    let tx = transmitter();
    assert_eq!(show(&tx, Attribute::Send), Err(Error::InvalidArgument));
    assert!(!Attribute::Send.is_readable());
}

#[test]
fn show_reflects_float_lowercase() {
    let mut tx = transmitter();
    store(&mut tx, Attribute::Address, "FF00ff1100").unwrap();
    assert_eq!(show(&tx, Attribute::Address).unwrap().as_str(), "ff00ff1100\n");
}

// =============================================================================
// Store Tests
// =============================================================================

#[test]
fn store_consumes_whole_input() {
    let mut tx = transmitter();
    assert_eq!(store(&mut tx, Attribute::Command, "11\n"), Ok(3));
    assert_eq!(store(&mut tx, Attribute::Codeword, "  0000000000ff  trailing"), Ok(24));
    assert_eq!(show(&tx, Attribute::Codeword).unwrap().as_str(), "0000000000ff\n");
}

#[test]
fn store_rejects_bad_values_without_change() {
    let mut tx = transmitter();
    store(&mut tx, Attribute::Codeword, "1010101010f1").unwrap();

    for (attr, value) in [
        (Attribute::Address, "101010101"),
        (Attribute::Address, "10101010x0"),
        (Attribute::Command, "f1"),
        (Attribute::Command, "2"),
        (Attribute::Codeword, "1010101010f"),
        (Attribute::Codeword, ""),
        (Attribute::Codeword, "   \n"),
    ] {
        assert_eq!(
            store(&mut tx, attr, value),
            Err(Error::InvalidArgument),
            "{}={value:?}",
            attr.name()
        );
    }

    assert_eq!(show(&tx, Attribute::Codeword).unwrap().as_str(), "1010101010f1\n");
}

#[test]
fn store_send_starts_and_stops() {
    let mut tx = transmitter();
    assert_eq!(store(&mut tx, Attribute::Send, "1\n"), Ok(2));
    assert!(tx.is_busy());

    assert_eq!(store(&mut tx, Attribute::Send, "1"), Err(Error::Busy));
    assert_eq!(store(&mut tx, Attribute::Address, "1111111111"), Err(Error::Busy));

    assert_eq!(store(&mut tx, Attribute::Send, "0"), Ok(1));
    assert!(!tx.is_busy());
    assert_eq!(store(&mut tx, Attribute::Send, "0"), Ok(1));
}

#[test]
fn store_send_rejects_unknown_codes() {
    let mut tx = transmitter();
    for bad in ["3", "-1", "on", ""] {
        assert_eq!(store(&mut tx, Attribute::Send, bad), Err(Error::InvalidArgument));
    }
    assert!(!tx.is_busy());
}

// =============================================================================
// Line Protocol Tests
// =============================================================================

#[test]
fn attribute_names() {
    assert_eq!(Attribute::from_name("packet"), Some(Attribute::Codeword));
    assert_eq!(Attribute::from_name("codeword"), Some(Attribute::Codeword));
    assert_eq!(Attribute::from_name("Address"), None);
    assert_eq!(Attribute::Codeword.name(), "packet");
}

#[test]
fn parse_lines() {
    assert_eq!(parse_line(b"packet?"), Some(ControlCommand::Show(Attribute::Codeword)));
    assert_eq!(parse_line(b" status "), Some(ControlCommand::Status));
    assert_eq!(parse_line(b"bogus=1"), Some(ControlCommand::Unknown));
    assert_eq!(parse_line(b"\xff\xfe"), None);
    assert_eq!(parse_line(b""), None);
}

#[test]
fn parser_drops_overlong_line() {
    let mut parser = ControlParser::new();
    for _ in 0..2 * CONTROL_BUFFER_SIZE {
        assert_eq!(parser.feed(b'0'), None);
    }
    assert!(parser.is_discarding());
    assert_eq!(parser.feed(b'\n'), None);
    assert!(!parser.is_discarding());

    for &b in b"status" {
        parser.feed(b);
    }
    assert_eq!(parser.feed(b'\r'), Some(ControlCommand::Status));
}

#[test]
fn overlong_line_tail_never_executes() {
    let mut tx = transmitter();
    let mut parser = ControlParser::new();
    let mut resp = ControlResponse::new();

    let mut input = vec![b'x'; CONTROL_BUFFER_SIZE + 1];
    input.extend_from_slice(b"send=1\n");
    for &b in &input {
        if let Some(cmd) = parser.feed(b) {
            execute(&mut tx, &cmd, &mut resp);
        }
    }

    assert!(!tx.is_busy());
    assert_eq!(tx.state(), TxState::Idle);

    // The next well-formed line is served normally
    for &b in b"send=1\n" {
        if let Some(cmd) = parser.feed(b) {
            execute(&mut tx, &cmd, &mut resp);
        }
    }
    assert_eq!(resp.as_str(), "OK");
    assert!(tx.is_busy());
}

#[test]
fn line_filling_buffer_exactly_is_kept() {
    let mut parser = ControlParser::new();
    let mut line = b"packet=".to_vec();
    line.resize(CONTROL_BUFFER_SIZE, b' ');
    let mut out = None;
    for &b in line.iter().chain(b"\n") {
        if let Some(cmd) = parser.feed(b) {
            out = Some(cmd);
        }
    }
    assert!(matches!(out, Some(ControlCommand::Store(Attribute::Codeword, _))));
}

#[test]
fn session_over_line_protocol() {
    let mut tx = transmitter();

    assert_eq!(run(&mut tx, "address=1f1f1f1f1f"), "OK");
    assert_eq!(run(&mut tx, "command=01"), "OK");
    assert_eq!(run(&mut tx, "packet?"), "1f1f1f1f1f01");
    assert_eq!(run(&mut tx, "status"), "IDLE");

    assert_eq!(run(&mut tx, "send=2"), "OK");
    for _ in 0..3 {
        sim::step(&mut tx);
    }
    assert_eq!(run(&mut tx, "status"), "SENDING pos=3 repeats=inf");
    assert_eq!(run(&mut tx, "command=10"), "ERR -16 device busy");
    assert_eq!(run(&mut tx, "send=0"), "OK");
    assert_eq!(tx.state(), TxState::Idle);
}

#[test]
fn errors_over_line_protocol() {
    let mut tx = transmitter();
    assert_eq!(run(&mut tx, "command=0f"), "ERR -22 invalid argument");
    assert_eq!(run(&mut tx, "send?"), "ERR -22 invalid argument");
    assert_eq!(run(&mut tx, "frequency=7"), "ERR -22 invalid argument");
}

#[test]
fn single_frame_status_counts_down() {
    let mut tx = transmitter();
    assert_eq!(run(&mut tx, "send=1"), "OK");
    for _ in 0..50 {
        sim::step(&mut tx);
    }
    assert_eq!(run(&mut tx, "status"), "SENDING pos=0 repeats=9");
}
