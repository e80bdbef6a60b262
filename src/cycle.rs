//! Cycle Runner: one one-second-bounded measurement run
//!
//! A cycle busy-loops a trivial counter for one wall-clock second and
//! reports how many iterations fit. Termination is deliberately coarse:
//! the loop compares second-of-minute values, not elapsed durations, and
//! refreshes its view of the clock only at sampling points (every
//! 100,000th iteration). Sampling cost is part of the measured workload.
//!
//! Before the timed loop starts, the runner stalls while the current
//! second value is a multiple of 8, sleeping `second * 100` ms per check.
//! This irregular pre-roll pause is intentional scheduling noise and has
//! no effect on the count itself, only on when the loop begins.

use chrono::{DateTime, Local, Timelike};
use std::time::Duration;

use crate::clock::Clock;

/// Iterations between periodic samples (and clock refreshes)
pub const DEFAULT_SAMPLE_INTERVAL: u64 = 100_000;

/// A periodic timestamped checkpoint taken inside the timed loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Iteration index at which the sample was taken (0-based, a multiple
    /// of the sampling interval)
    pub iteration: u64,
    /// Wall-clock time observed at the sampling point
    pub at: DateTime<Local>,
}

/// Outcome of a single measurement cycle, immutable once the cycle ends
#[derive(Debug, Clone)]
pub struct CycleResult {
    /// 1-based cycle index within the session
    pub index: u32,
    /// Wall-clock time just before the timed loop began
    pub start: DateTime<Local>,
    /// Wall-clock time just after the loop observed a rolled-over second
    pub end: DateTime<Local>,
    /// Final iteration count, always at least 1
    pub iterations: u64,
    /// Ordered samples taken during the loop
    pub samples: Vec<Sample>,
    /// Pre-roll pauses taken before the loop, in milliseconds
    pub pauses_ms: Vec<u64>,
}

/// Receives live progress events from a running cycle.
///
/// All methods default to no-ops so callers implement only what they show.
pub trait CycleObserver {
    /// A cycle is about to start (before the pre-roll pause)
    fn on_cycle_start(&mut self, _cycle: u32, _total: u32) {}

    /// The pre-roll pause is about to sleep for `pause_ms` milliseconds
    fn on_pause(&mut self, _pause_ms: u64) {}

    /// A periodic sample was just taken inside the timed loop
    fn on_sample(&mut self, _cycle: u32, _total: u32, _sample: &Sample) {}

    /// The cycle finished and its result is final
    fn on_cycle_end(&mut self, _result: &CycleResult) {}
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct NullObserver;

impl CycleObserver for NullObserver {}

/// Executes one measurement cycle against a clock
pub struct CycleRunner<'a, C: Clock> {
    clock: &'a C,
    sample_interval: u64,
}

impl<'a, C: Clock> CycleRunner<'a, C> {
    pub fn new(clock: &'a C) -> Self {
        Self::with_sample_interval(clock, DEFAULT_SAMPLE_INTERVAL)
    }

    /// Runner with a custom sampling interval. Not exposed to end users;
    /// tests use small intervals so loops exit after a handful of
    /// iterations instead of 100,000.
    pub fn with_sample_interval(clock: &'a C, sample_interval: u64) -> Self {
        assert!(sample_interval >= 1, "sample interval must be at least 1");
        Self {
            clock,
            sample_interval,
        }
    }

    /// Run one cycle: pre-roll pause, then count until the wall clock's
    /// second-of-minute value rolls over.
    pub fn run(&self, cycle: u32, total: u32, observer: &mut dyn CycleObserver) -> CycleResult {
        observer.on_cycle_start(cycle, total);

        let mut pauses_ms = Vec::new();
        let mut pause_ms = u64::from(self.clock.now().second()) * 100;

        while self.clock.now().second() % 8 == 0 {
            observer.on_pause(pause_ms);
            self.clock.sleep(Duration::from_millis(pause_ms));
            pauses_ms.push(pause_ms);
            pause_ms = u64::from(self.clock.now().second()) * 100;
        }

        let start = self.clock.now();
        // Seeding the observed timestamp with `start` guarantees the loop
        // body runs at least once, so the final count is never 0.
        let mut observed = start;
        let mut samples = Vec::new();
        let mut iterations: u64 = 0;
        let mut i: u64 = 0;

        while observed.second() == start.second() {
            iterations = i + 1;
            if i % self.sample_interval == 0 {
                observed = self.clock.now();
                let sample = Sample {
                    iteration: i,
                    at: observed,
                };
                observer.on_sample(cycle, total, &sample);
                samples.push(sample);
            }
            // black_box keeps the optimizer from collapsing the spin into
            // a single jump to the next sampling point.
            i = std::hint::black_box(i) + 1;
        }

        let end = self.clock.now();
        log::debug!(
            "cycle {cycle}/{total}: {iterations} iterations, {} samples, {} pauses",
            samples.len(),
            pauses_ms.len()
        );

        let result = CycleResult {
            index: cycle,
            start,
            end,
            iterations,
            samples,
            pauses_ms,
        };
        observer.on_cycle_end(&result);
        result
    }
}
