//! Waveform Transmitter
//!
//! Drives the OOK data line through an encoded [`Bitstring`] with a chain
//! of one-shot alarms. Every firing is an edge: the handler flips the
//! line, advances one position and re-arms the alarm for the interval
//! that position calls for (narrow, wide or sync). After the sync gap the
//! codeword is repeated until the repeat count is spent.
//!
//! # States
//!
//! ```text
//!            start (guard acquired)
//!   Idle ───────────────────────────▶ Sending { position, repeats }
//!    ▲                                    │  ▲
//!    │   repeats exhausted / stop        │  │ alarm: flip, advance, re-arm
//!    └────────────────────────────────────┘  └──┘
//! ```
//!
//! Stop is unconditional: it disarms the alarm, forces the line low and
//! releases the guard whatever state the session is in, so it doubles as
//! the recovery path after a fault.

use embedded_hal::digital::OutputPin;

use super::encoder::Bitstring;
use super::guard::BusyGuard;
use crate::config::BITSTRING_LEN;
use crate::error::{Error, Result};
use crate::types::{Address, Codeword, Command, RepeatMode, Timing, Trigger};

/// One-shot "call back after a delay" primitive supplied by the platform
///
/// The platform calls [`Transmitter::fire`] once the armed delay has
/// elapsed. Arming again replaces any pending firing.
pub trait Alarm {
    /// Schedule a firing `delay_us` microseconds from now
    fn arm(&mut self, delay_us: u32);

    /// Cancel a pending firing (no-op if none is pending)
    fn disarm(&mut self);

    /// Called before the first `arm` of a session
    ///
    /// Deadlines of an earlier session must not influence the new one.
    fn begin_session(&mut self) {}
}

/// Transmitter state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxState {
    /// Line low, guard released
    #[default]
    Idle,
    /// Session in flight
    Sending {
        /// Edges emitted in the current codeword (0..=49)
        position: usize,
        /// Codeword repetitions left, including the current one
        repeats_remaining: u32,
    },
}

#[cfg(feature = "embedded")]
impl defmt::Format for TxState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::Sending {
                position,
                repeats_remaining,
            } => defmt::write!(f, "SENDING({}, {})", position, repeats_remaining),
        }
    }
}

/// What a firing did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Alarm re-armed for this many microseconds
    Rearmed(u32),
    /// Last repetition finished; line low, guard released
    Complete,
    /// Fired with no session in flight (raced with a stop)
    Ignored,
    /// Line write failed; session torn down
    Aborted,
}

/// Timed waveform transmitter
///
/// Owns the output line and the alarm. The codeword can only be edited
/// while no session holds the busy guard.
pub struct Transmitter<P, A> {
    line: P,
    alarm: A,
    guard: BusyGuard,
    codeword: Codeword,
    timing: Timing,
    bitstring: Bitstring,
    state: TxState,
    continuous: bool,
    level: bool,
    frames_sent: u32,
    faults: u32,
}

impl<P, A> Transmitter<P, A>
where
    P: OutputPin,
    A: Alarm,
{
    /// Create a transmitter over a line that bring-up has already set low
    pub fn new(line: P, alarm: A, timing: Timing) -> Self {
        Self {
            line,
            alarm,
            guard: BusyGuard::new(),
            codeword: Codeword::default(),
            timing,
            bitstring: Bitstring::default(),
            state: TxState::Idle,
            continuous: false,
            level: false,
            frames_sent: 0,
            faults: 0,
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> TxState {
        self.state
    }

    /// Check if a session holds the guard
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.guard.is_held()
    }

    /// Check if the running session is continuous
    #[must_use]
    pub const fn is_continuous(&self) -> bool {
        self.continuous && matches!(self.state, TxState::Sending { .. })
    }

    /// Get the stored codeword
    #[must_use]
    pub const fn codeword(&self) -> Codeword {
        self.codeword
    }

    /// Get the address field
    #[must_use]
    pub fn address(&self) -> Address {
        self.codeword.address()
    }

    /// Get the command field
    #[must_use]
    pub fn command(&self) -> Command {
        self.codeword.command()
    }

    /// Get the bitstring of the current (or last) session
    #[must_use]
    pub const fn bitstring(&self) -> &Bitstring {
        &self.bitstring
    }

    /// Get protocol timing
    #[must_use]
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    /// Last level written to the line
    #[must_use]
    pub const fn level(&self) -> bool {
        self.level
    }

    /// Codeword repetitions completed since power-on
    #[must_use]
    pub const fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Line faults seen since power-on
    #[must_use]
    pub const fn faults(&self) -> u32 {
        self.faults
    }

    /// Get the output line
    #[must_use]
    pub const fn line(&self) -> &P {
        &self.line
    }

    /// Get the alarm
    #[must_use]
    pub const fn alarm(&self) -> &A {
        &self.alarm
    }

    /// Get the alarm mutably (platform glue)
    pub fn alarm_mut(&mut self) -> &mut A {
        &mut self.alarm
    }

    /// Replace the address field
    ///
    /// # Errors
    /// `Error::Busy` while a session is in flight.
    pub fn set_address(&mut self, address: Address) -> Result<()> {
        self.guard.ensure_released()?;
        self.codeword = self.codeword.with_address(address);
        Ok(())
    }

    /// Replace the command field
    ///
    /// # Errors
    /// `Error::Busy` while a session is in flight.
    pub fn set_command(&mut self, command: Command) -> Result<()> {
        self.guard.ensure_released()?;
        self.codeword = self.codeword.with_command(command);
        Ok(())
    }

    /// Replace the whole codeword
    ///
    /// # Errors
    /// `Error::Busy` while a session is in flight.
    pub fn set_codeword(&mut self, codeword: Codeword) -> Result<()> {
        self.guard.ensure_released()?;
        self.codeword = codeword;
        Ok(())
    }

    /// Change the pulse width
    ///
    /// # Errors
    /// `Error::Busy` while a session is in flight.
    pub fn set_timing(&mut self, timing: Timing) -> Result<()> {
        self.guard.ensure_released()?;
        self.timing = timing;
        Ok(())
    }

    /// Apply a `send` trigger
    ///
    /// # Errors
    /// See [`Self::start`] and [`Self::stop`].
    pub fn trigger(&mut self, trigger: Trigger) -> Result<()> {
        match trigger {
            Trigger::Stop => self.stop(),
            Trigger::Send(mode) => self.start(mode),
        }
    }

    /// Start a session and return once the first alarm is armed
    ///
    /// # Errors
    /// - `Error::Busy` if a session is already in flight (left untouched)
    /// - `Error::Line` if the line could not be raised (guard released)
    pub fn start(&mut self, mode: RepeatMode) -> Result<()> {
        if let Err(e) = self.guard.try_acquire() {
            warn!("start rejected: session in flight");
            return Err(e);
        }

        self.bitstring = Bitstring::encode(&self.codeword);
        self.continuous = matches!(mode, RepeatMode::Continuous);

        if self.drive(true).is_err() {
            self.faults = self.faults.wrapping_add(1);
            self.state = TxState::Idle;
            self.guard.release();
            error!("start aborted: line write failed");
            return Err(Error::Line);
        }

        self.state = TxState::Sending {
            position: 0,
            repeats_remaining: mode.repeats(),
        };
        self.alarm.begin_session();
        self.alarm.arm(self.delay_at(0));

        info!("sending {} ({})", self.codeword, mode);
        Ok(())
    }

    /// Cancel any session and force the line low
    ///
    /// Always disarms the alarm and releases the guard, even when called
    /// with nothing in flight or by a context that never took the guard.
    ///
    /// # Errors
    /// `Error::Line` if the line could not be driven low. The session is
    /// torn down regardless.
    pub fn stop(&mut self) -> Result<()> {
        self.alarm.disarm();
        let was = core::mem::take(&mut self.state);
        let result = self.drive(false);
        self.guard.release();

        if let TxState::Sending { position, .. } = was {
            info!("stopped at position {}", position);
        }

        result.map_err(|()| {
            self.faults = self.faults.wrapping_add(1);
            error!("stop: line write failed");
            Error::Line
        })
    }

    /// Alarm handler: emit one edge and re-arm
    pub fn fire(&mut self) -> Step {
        let TxState::Sending {
            mut position,
            mut repeats_remaining,
        } = self.state
        else {
            trace!("alarm fired while idle");
            return Step::Ignored;
        };

        if self.drive(!self.level).is_err() {
            return self.abort();
        }
        position += 1;

        let delay = if position > BITSTRING_LEN {
            self.frames_sent = self.frames_sent.wrapping_add(1);
            if !self.continuous {
                repeats_remaining -= 1;
            }

            if repeats_remaining == 0 {
                let result = self.drive(false);
                self.state = TxState::Idle;
                self.guard.release();
                debug!("session complete after {} frames", self.frames_sent);
                if result.is_err() {
                    self.faults = self.faults.wrapping_add(1);
                    return Step::Aborted;
                }
                return Step::Complete;
            }

            position = 0;
            if self.drive(true).is_err() {
                return self.abort();
            }
            self.delay_at(0)
        } else {
            // position == BITSTRING_LEN lands on the sync gap
            self.delay_at(position)
        };

        self.state = TxState::Sending {
            position,
            repeats_remaining,
        };
        self.alarm.arm(delay);
        Step::Rearmed(delay)
    }

    /// Stop and hand back the line and alarm for platform teardown
    pub fn release(mut self) -> (P, A) {
        // Teardown proceeds even if the final write fails
        let _ = self.stop();
        (self.line, self.alarm)
    }

    fn delay_at(&self, position: usize) -> u32 {
        self.timing.duration_us(self.bitstring.interval(position))
    }

    fn abort(&mut self) -> Step {
        self.faults = self.faults.wrapping_add(1);
        error!("line write failed, aborting session");
        self.alarm.disarm();
        self.state = TxState::Idle;
        // Best effort; the line already failed once
        let _ = self.drive(false);
        self.guard.release();
        Step::Aborted
    }

    fn drive(&mut self, high: bool) -> core::result::Result<(), ()> {
        let result = if high {
            self.line.set_high()
        } else {
            self.line.set_low()
        };
        result.map_err(|_| ())?;
        self.level = high;
        Ok(())
    }
}

impl<P, A> core::fmt::Debug for Transmitter<P, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transmitter")
            .field("state", &self.state)
            .field("codeword", &self.codeword)
            .field("timing", &self.timing)
            .field("continuous", &self.continuous)
            .field("busy", &self.guard.is_held())
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::sim::{self, SimAlarm, SimClock, SimLine};
    use crate::types::Interval;

    fn transmitter() -> Transmitter<SimLine, SimAlarm> {
        let clock = SimClock::new();
        Transmitter::new(SimLine::new(clock), SimAlarm::new(), Timing::DEFAULT)
    }

    #[test]
    fn start_arms_first_interval() {
        let mut tx = transmitter();
        tx.start(RepeatMode::SingleFrame).unwrap();

        assert!(tx.is_busy());
        assert!(tx.line().is_high());
        // '0' starts with a narrow flag
        assert_eq!(tx.alarm().pending(), Some(Timing::DEFAULT.narrow_us()));
        assert_eq!(
            tx.state(),
            TxState::Sending {
                position: 0,
                repeats_remaining: 10
            }
        );
    }

    #[test]
    fn second_start_is_busy() {
        let mut tx = transmitter();
        tx.start(RepeatMode::SingleFrame).unwrap();
        sim::step(&mut tx);
        sim::step(&mut tx);
        let before = tx.state();

        assert_eq!(tx.start(RepeatMode::Continuous), Err(Error::Busy));
        assert_eq!(tx.state(), before);
        assert!(!tx.is_continuous());
    }

    #[test]
    fn sync_gap_after_last_flag() {
        let mut tx = transmitter();
        tx.start(RepeatMode::SingleFrame).unwrap();
        for _ in 0..48 {
            sim::step(&mut tx);
        }
        let sync = Timing::DEFAULT.duration_us(Interval::Sync);
        assert_eq!(sim::step(&mut tx), Some(Step::Rearmed(sync)));
    }

    #[test]
    fn fire_when_idle_is_ignored() {
        let mut tx = transmitter();
        assert_eq!(tx.fire(), Step::Ignored);
        assert!(!tx.line().is_high());
        assert_eq!(tx.line().edges(), 0);
    }

    #[test]
    fn stop_mid_flight() {
        let mut tx = transmitter();
        tx.start(RepeatMode::Continuous).unwrap();
        for _ in 0..17 {
            sim::step(&mut tx);
        }
        tx.stop().unwrap();

        assert_eq!(tx.state(), TxState::Idle);
        assert!(!tx.is_busy());
        assert!(!tx.line().is_high());
        assert_eq!(tx.alarm().pending(), None);
    }
}
