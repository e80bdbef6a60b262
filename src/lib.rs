//! cyclebench: informal ops-per-second monitor
//!
//! Measures how many trivial loop iterations a machine executes within
//! repeated one-second wall-clock windows and reports the average as
//! "operations per second". The numbers deliberately include ordinary OS
//! scheduling noise, periodic sampling overhead, and irregular pre-roll
//! pauses; they are capacity-planning reference points, not rigorous
//! microbenchmark results.
//!
//! # Examples
//!
//! ```no_run
//! use cyclebenchlib::{NullObserver, SessionDriver, SystemClock};
//! use cyclebenchlib::config::LogPaths;
//! use cyclebenchlib::report::{DirDetailSinks, FileSink};
//!
//! # fn main() -> cyclebenchlib::Result<()> {
//! let paths = LogPaths::under(".");
//! paths.prepare()?;
//! paths.verify()?;
//!
//! let driver = SessionDriver::new(SystemClock);
//! let mut log = FileSink::new(paths.session_log_file());
//! let mut details = DirDetailSinks::new(paths.detail_dir.clone());
//! let session = driver.run(3, &mut log, &mut details, &mut NullObserver)?;
//! println!("{} operations per second", session.average);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod cycle;
pub mod error;
pub mod report;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use cycle::{
    CycleObserver, CycleResult, CycleRunner, NullObserver, Sample, DEFAULT_SAMPLE_INTERVAL,
};
pub use error::{BenchError, Result};
pub use session::{parse_cycles, ElapsedParts, Session, SessionDriver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
