//! Session Driver: repeats the Cycle Runner and aggregates results
//!
//! A session runs a user-requested number of cycles, accumulates the sum
//! of iteration counts, and reports the integer average as "operations
//! per second". Per-cycle blocks go to the session log sink and one
//! detail file per cycle goes through the detail sink factory.

use chrono::{DateTime, Local};
use std::fmt;

use crate::clock::Clock;
use crate::cycle::{CycleObserver, CycleResult, CycleRunner, DEFAULT_SAMPLE_INTERVAL};
use crate::error::Result;
use crate::report::{self, DetailSinkFactory, TextSink};

/// Coerce raw cycle-count input to a usable value.
///
/// Parse failures and non-positive values silently fall back to 1; bad
/// input is tolerated, not reported.
pub fn parse_cycles(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n.min(i64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

/// Elapsed wall-clock time decomposed into whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub millis: i64,
}

impl ElapsedParts {
    pub fn from_duration(duration: chrono::Duration) -> Self {
        let mut rest = duration.num_milliseconds().max(0);
        let days = rest / 86_400_000;
        rest %= 86_400_000;
        let hours = rest / 3_600_000;
        rest %= 3_600_000;
        let minutes = rest / 60_000;
        rest %= 60_000;
        let seconds = rest / 1_000;
        let millis = rest % 1_000;
        Self {
            days,
            hours,
            minutes,
            seconds,
            millis,
        }
    }
}

impl fmt::Display for ElapsedParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} days {} hrs {} min {} sec {} ms",
            self.days, self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

/// The full set of cycles from one invocation, plus aggregate statistics
#[derive(Debug, Clone)]
pub struct Session {
    /// Cycle count actually run (post-coercion, always at least 1)
    pub requested: u32,
    /// Per-cycle results, in run order
    pub results: Vec<CycleResult>,
    /// Wall-clock time when the first cycle was about to start
    pub started: DateTime<Local>,
    /// Wall-clock time after the last cycle completed
    pub ended: DateTime<Local>,
    /// Arithmetic sum of per-cycle iteration counts
    pub sum: u64,
    /// Integer (floor) average: sum / requested
    pub average: u64,
}

impl Session {
    /// Elapsed wall-clock time across all cycles
    pub fn elapsed(&self) -> ElapsedParts {
        ElapsedParts::from_duration(self.ended - self.started)
    }
}

/// Runs a full session of measurement cycles against a clock
pub struct SessionDriver<C: Clock> {
    clock: C,
    sample_interval: u64,
}

impl<C: Clock> SessionDriver<C> {
    pub fn new(clock: C) -> Self {
        Self::with_sample_interval(clock, DEFAULT_SAMPLE_INTERVAL)
    }

    /// Driver with a custom sampling interval, for tests
    pub fn with_sample_interval(clock: C, sample_interval: u64) -> Self {
        Self {
            clock,
            sample_interval,
        }
    }

    /// Run `requested` cycles, logging each to the session sink and one
    /// detail sink per cycle, and return the finalized session.
    ///
    /// A `requested` of 0 is coerced to 1, matching the input fallback.
    pub fn run(
        &self,
        requested: u32,
        session_log: &mut dyn TextSink,
        details: &mut dyn DetailSinkFactory,
        observer: &mut dyn CycleObserver,
    ) -> Result<Session> {
        let requested = requested.max(1);
        report::append_session_header(session_log, requested, self.clock.now())?;

        let started = self.clock.now();
        let runner = CycleRunner::with_sample_interval(&self.clock, self.sample_interval);
        let mut results = Vec::with_capacity(requested as usize);
        let mut sum: u64 = 0;

        for cycle in 1..=requested {
            let result = runner.run(cycle, requested, observer);
            sum += result.iterations;

            let mut detail = details.create(result.start, requested, cycle)?;
            detail.append(&report::render_detail(&result))?;
            report::append_cycle_block(session_log, &result)?;
            results.push(result);
        }

        let ended = self.clock.now();
        let average = sum / u64::from(requested);
        log::info!("session complete: {requested} cycles, sum {sum}, average {average}");

        let session = Session {
            requested,
            results,
            started,
            ended,
            sum,
            average,
        };
        report::append_summary_block(session_log, &session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{test_time, FakeClock};
    use crate::cycle::NullObserver;
    use crate::report::MemorySink;
    use chrono::TimeZone;

    /// Detail factory handing out memory sinks and keeping them readable
    #[derive(Default)]
    struct MemoryDetails {
        created: Vec<std::rc::Rc<std::cell::RefCell<String>>>,
    }

    struct SharedSink(std::rc::Rc<std::cell::RefCell<String>>);

    impl TextSink for SharedSink {
        fn append(&mut self, text: &str) -> Result<()> {
            self.0.borrow_mut().push_str(text);
            Ok(())
        }
    }

    impl DetailSinkFactory for MemoryDetails {
        fn create(
            &mut self,
            _stamp: DateTime<Local>,
            _total: u32,
            _cycle: u32,
        ) -> Result<Box<dyn TextSink>> {
            let buffer = std::rc::Rc::new(std::cell::RefCell::new(String::new()));
            self.created.push(buffer.clone());
            Ok(Box::new(SharedSink(buffer)))
        }
    }

    /// Clock script for one no-pause cycle that exits at its first sample
    /// after the one at iteration 0 (interval 2 -> 3 iterations).
    fn push_cycle(times: &mut Vec<DateTime<Local>>, sec: u32) {
        let next = (sec + 1) % 60;
        times.push(test_time(10, 20, sec)); // pause-ms calc
        times.push(test_time(10, 20, sec)); // pre-roll check
        times.push(test_time(10, 20, sec)); // start
        times.push(test_time(10, 20, sec)); // sample i = 0
        times.push(test_time(10, 20, next)); // sample i = 2
        times.push(test_time(10, 20, next)); // end
    }

    fn run_session(requested: u32) -> (Session, String, MemoryDetails) {
        let mut times = vec![
            test_time(10, 19, 58), // header timestamp
            test_time(10, 19, 58), // session start
        ];
        // The driver coerces 0 to 1, so script at least one cycle.
        for n in 0..requested.max(1) {
            push_cycle(&mut times, 1 + n * 2);
        }
        times.push(test_time(10, 20, 59)); // session end

        let clock = FakeClock::new(times);
        let driver = SessionDriver::with_sample_interval(clock, 2);
        let mut log = MemorySink::default();
        let mut details = MemoryDetails::default();
        let session = driver
            .run(requested, &mut log, &mut details, &mut NullObserver)
            .expect("session runs");
        (session, log.contents().to_string(), details)
    }

    #[test]
    fn test_session_contains_exactly_n_results() {
        let (session, _, details) = run_session(3);
        assert_eq!(session.results.len(), 3);
        assert_eq!(details.created.len(), 3);
        for (i, result) in session.results.iter().enumerate() {
            assert_eq!(result.index as usize, i + 1);
            assert!(result.iterations >= 1);
            assert!(result.end > result.start);
        }
    }

    #[test]
    fn test_sum_and_floor_average() {
        let (session, _, _) = run_session(3);
        let exact: u64 = session.results.iter().map(|r| r.iterations).sum();
        assert_eq!(session.sum, exact);
        assert_eq!(session.average, exact / 3);
    }

    #[test]
    fn test_requested_zero_coerces_to_one_cycle() {
        let (session, _, details) = run_session(0);
        assert_eq!(session.requested, 1);
        assert_eq!(session.results.len(), 1);
        assert_eq!(details.created.len(), 1);
    }

    #[test]
    fn test_session_log_has_header_blocks_and_summary() {
        let (session, log, _) = run_session(2);
        assert!(log.contains("Cycles: 2\t"));
        assert!(log.contains("***\t1\t"));
        assert!(log.contains("***\t2\t"));
        assert!(log.contains(&format!(
            "Sum: {} operations across 2 cycles",
            crate::report::format_count(session.sum)
        )));
        assert!(log.contains("operations per second"));
    }

    #[test]
    fn test_detail_sink_receives_samples_and_trailer() {
        let (session, _, details) = run_session(1);
        let detail = details.created[0].borrow();
        assert!(detail.contains("Iteration 0 "));
        assert!(detail.contains(&format!(
            "Iterations {} Start ",
            crate::report::format_count(session.results[0].iterations)
        )));
    }

    #[test]
    fn test_parse_cycles_fallback() {
        assert_eq!(parse_cycles("0"), 1);
        assert_eq!(parse_cycles("-5"), 1);
        assert_eq!(parse_cycles("abc"), 1);
        assert_eq!(parse_cycles(""), 1);
        assert_eq!(parse_cycles("  \n"), 1);
        assert_eq!(parse_cycles("3"), 3);
        assert_eq!(parse_cycles(" 12 \n"), 12);
    }

    #[test]
    fn test_elapsed_parts_decomposition() {
        let parts = ElapsedParts::from_duration(chrono::Duration::milliseconds(
            2 * 86_400_000 + 3 * 3_600_000 + 4 * 60_000 + 5_000 + 678,
        ));
        assert_eq!(
            parts,
            ElapsedParts {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5,
                millis: 678,
            }
        );
        assert_eq!(parts.to_string(), "2 days 3 hrs 4 min 5 sec 678 ms");
    }

    #[test]
    fn test_elapsed_parts_negative_clamped_to_zero() {
        let parts = ElapsedParts::from_duration(chrono::Duration::milliseconds(-500));
        assert_eq!(parts.to_string(), "0 days 0 hrs 0 min 0 sec 0 ms");
    }

    #[test]
    fn test_session_elapsed_uses_timestamps() {
        let started = Local.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).single().unwrap();
        let ended = Local.with_ymd_and_hms(2026, 1, 15, 10, 1, 30).single().unwrap();
        let session = Session {
            requested: 1,
            results: Vec::new(),
            started,
            ended,
            sum: 0,
            average: 0,
        };
        assert_eq!(session.elapsed().to_string(), "0 days 0 hrs 1 min 30 sec 0 ms");
    }
}
