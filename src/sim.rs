//! Host-side stand-ins for the output line and the alarm
//!
//! A [`SimClock`] is shared between the line and the driver loop so every
//! recorded edge carries the simulated time at which it happened.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::radio::transmitter::{Alarm, Step, Transmitter};

/// Simulated microsecond clock
#[derive(Clone, Debug, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    /// Create a clock at t = 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in microseconds
    #[must_use]
    pub fn now_us(&self) -> u64 {
        self.0.get()
    }

    /// Move time forward
    pub fn advance(&self, us: u32) {
        self.0.set(self.0.get() + u64::from(us));
    }
}

/// Recording output line
#[derive(Debug)]
pub struct SimLine {
    clock: SimClock,
    high: bool,
    writes: usize,
    edges: usize,
    trace: Vec<(u64, bool)>,
}

impl SimLine {
    /// Create a low line
    #[must_use]
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            high: false,
            writes: 0,
            edges: 0,
            trace: Vec::new(),
        }
    }

    /// Current level
    #[must_use]
    pub const fn is_high(&self) -> bool {
        self.high
    }

    /// Number of writes, including ones that did not change the level
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Number of level changes
    #[must_use]
    pub const fn edges(&self) -> usize {
        self.edges
    }

    /// Every write as `(time_us, level)`
    #[must_use]
    pub fn trace(&self) -> &[(u64, bool)] {
        &self.trace
    }

    /// Clock this line stamps writes with
    #[must_use]
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    fn write(&mut self, high: bool) {
        self.writes += 1;
        if high != self.high {
            self.edges += 1;
        }
        self.high = high;
        self.trace.push((self.clock.now_us(), high));
    }
}

impl ErrorType for SimLine {
    type Error = Infallible;
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// Error returned by [`FaultyLine`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineFault;

impl embedded_hal::digital::Error for LineFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Line that fails every write after the first `ok_writes`
#[derive(Debug)]
pub struct FaultyLine {
    ok_writes: usize,
    writes: usize,
    high: bool,
}

impl FaultyLine {
    /// Create a line that accepts `ok_writes` writes before failing
    #[must_use]
    pub const fn new(ok_writes: usize) -> Self {
        Self {
            ok_writes,
            writes: 0,
            high: false,
        }
    }

    /// Current level (last successful write)
    #[must_use]
    pub const fn is_high(&self) -> bool {
        self.high
    }

    /// Allow writes again
    pub fn heal(&mut self) {
        self.ok_writes = usize::MAX;
    }

    fn write(&mut self, high: bool) -> Result<(), LineFault> {
        if self.writes >= self.ok_writes {
            return Err(LineFault);
        }
        self.writes += 1;
        self.high = high;
        Ok(())
    }
}

impl ErrorType for FaultyLine {
    type Error = LineFault;
}

impl OutputPin for FaultyLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

/// Alarm that only records what it was asked to do
#[derive(Debug, Default)]
pub struct SimAlarm {
    armed: Option<u32>,
    arms: usize,
    disarms: usize,
    sessions: usize,
}

impl SimAlarm {
    /// Create a disarmed alarm
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending delay, if armed
    #[must_use]
    pub const fn pending(&self) -> Option<u32> {
        self.armed
    }

    /// Consume the pending delay
    pub fn take(&mut self) -> Option<u32> {
        self.armed.take()
    }

    /// Number of `arm` calls
    #[must_use]
    pub const fn arms(&self) -> usize {
        self.arms
    }

    /// Number of `disarm` calls
    #[must_use]
    pub const fn disarms(&self) -> usize {
        self.disarms
    }

    /// Number of sessions begun
    #[must_use]
    pub const fn sessions(&self) -> usize {
        self.sessions
    }
}

impl Alarm for SimAlarm {
    fn arm(&mut self, delay_us: u32) {
        self.arms += 1;
        self.armed = Some(delay_us);
    }

    fn disarm(&mut self) {
        self.disarms += 1;
        self.armed = None;
    }

    fn begin_session(&mut self) {
        self.sessions += 1;
    }
}

/// Let the pending alarm expire and run the handler
///
/// Returns `None` if nothing was armed. The clock only moves when the
/// line is a [`SimLine`]; use [`step_with_clock`] otherwise.
pub fn step(tx: &mut Transmitter<SimLine, SimAlarm>) -> Option<Step> {
    let delay = tx.alarm_mut().take()?;
    tx.line().clock().advance(delay);
    Some(tx.fire())
}

/// Same as [`step`] for any line, advancing an external clock
pub fn step_with_clock<P: OutputPin>(
    tx: &mut Transmitter<P, SimAlarm>,
    clock: &SimClock,
) -> Option<Step> {
    let delay = tx.alarm_mut().take()?;
    clock.advance(delay);
    Some(tx.fire())
}

/// Fire alarms until the transmitter stops re-arming or `limit` firings
///
/// Returns the number of firings.
pub fn run_until_idle(tx: &mut Transmitter<SimLine, SimAlarm>, limit: usize) -> usize {
    let mut fired = 0;
    while fired < limit && step(tx).is_some() {
        fired += 1;
    }
    fired
}
