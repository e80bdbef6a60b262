//! Wall-clock abstraction
//!
//! The measurement loops are gated on the wall clock's second-of-minute
//! value, so the clock is the one seam the whole crate depends on. Putting
//! it behind a trait lets tests script arbitrary second sequences instead
//! of waiting out real one-second windows.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Source of wall-clock timestamps and sleeps
pub trait Clock {
    /// Current local wall-clock time
    fn now(&self) -> DateTime<Local>;

    /// Block the calling thread for the given duration
    fn sleep(&self, duration: Duration);
}

/// Production clock backed by the OS wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Scripted clock for tests: returns a fixed sequence of timestamps and
/// records requested sleeps instead of performing them. Once the sequence
/// is exhausted the last timestamp repeats.
#[cfg(test)]
pub struct FakeClock {
    times: std::cell::RefCell<std::collections::VecDeque<DateTime<Local>>>,
    last: std::cell::Cell<DateTime<Local>>,
    sleeps: std::cell::RefCell<Vec<Duration>>,
}

#[cfg(test)]
impl FakeClock {
    pub fn new(times: Vec<DateTime<Local>>) -> Self {
        assert!(!times.is_empty(), "FakeClock needs at least one timestamp");
        let last = times[0];
        Self {
            times: std::cell::RefCell::new(times.into_iter().collect()),
            last: std::cell::Cell::new(last),
            sleeps: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

#[cfg(test)]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        match self.times.borrow_mut().pop_front() {
            Some(t) => {
                self.last.set(t);
                t
            }
            None => self.last.get(),
        }
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Build a local timestamp for tests: fixed date, varying time of day.
#[cfg(test)]
pub fn test_time(hour: u32, min: u32, sec: u32) -> DateTime<Local> {
    use chrono::TimeZone;
    Local
        .with_ymd_and_hms(2026, 1, 15, hour, min, sec)
        .single()
        .expect("valid test timestamp")
}
