//! Embassy-backed one-shot alarm
//!
//! [`EmbassyAlarm`] never touches a hardware timer itself: it posts
//! commands to [`run_alarm`], which waits for the deadline and runs the
//! expiry callback. Re-arms within a session chain from the previous
//! deadline, so task latency does not accumulate; a new session always
//! starts from the current instant.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

use crate::radio::transmitter::Alarm;

/// Request posted to the alarm task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmCommand {
    /// Fire at this instant (replaces any pending deadline)
    Arm(Instant),
    /// Cancel the pending deadline
    Disarm,
}

/// Channel between [`EmbassyAlarm`] and [`run_alarm`]
pub type AlarmSignal = Signal<CriticalSectionRawMutex, AlarmCommand>;

/// [`Alarm`] implementation that signals the alarm task
pub struct EmbassyAlarm {
    signal: &'static AlarmSignal,
    last_deadline: Option<Instant>,
}

impl EmbassyAlarm {
    /// Create an alarm posting to `signal`
    #[must_use]
    pub const fn new(signal: &'static AlarmSignal) -> Self {
        Self {
            signal,
            last_deadline: None,
        }
    }
}

impl Alarm for EmbassyAlarm {
    fn arm(&mut self, delay_us: u32) {
        let now = Instant::now();
        let delay = Duration::from_micros(u64::from(delay_us));
        // Chain from the previous deadline unless it is already stale
        let base = match self.last_deadline {
            Some(prev) if prev <= now && now - prev < delay => prev,
            _ => now,
        };
        let deadline = base + delay;
        self.last_deadline = Some(deadline);
        self.signal.signal(AlarmCommand::Arm(deadline));
    }

    fn disarm(&mut self) {
        self.last_deadline = None;
        self.signal.signal(AlarmCommand::Disarm);
    }

    fn begin_session(&mut self) {
        self.last_deadline = None;
    }
}

/// Alarm task body: wait for deadlines and call `on_expiry`
///
/// A command posted before an expiry is handled wins over it, so a
/// deadline cancelled or replaced in time never reaches `on_expiry`.
pub async fn run_alarm<F>(signal: &'static AlarmSignal, mut on_expiry: F) -> !
where
    F: FnMut(),
{
    let mut pending: Option<Instant> = None;
    loop {
        let command = match pending {
            None => signal.wait().await,
            Some(deadline) => match select(signal.wait(), Timer::at(deadline)).await {
                Either::First(command) => command,
                Either::Second(()) => match signal.try_take() {
                    Some(command) => command,
                    None => {
                        pending = None;
                        on_expiry();
                        continue;
                    }
                },
            },
        };

        pending = match command {
            AlarmCommand::Arm(deadline) => Some(deadline),
            AlarmCommand::Disarm => None,
        };
    }
}
