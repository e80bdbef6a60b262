//! Log sinks and record formatting
//!
//! Two append-only text sinks carry everything the tool writes: a
//! session-wide log (header, one block per cycle, final summary) and one
//! detail file per cycle (pause lines, periodic samples, trailer). Any
//! text sink satisfies the interface; the file-backed implementations
//! open-append-close per write so partial sessions still leave records.

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use crate::cycle::CycleResult;
use crate::error::Result;
use crate::session::Session;

/// Timestamp layout used in every log record
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only text sink
pub trait TextSink {
    fn append(&mut self, text: &str) -> Result<()>;
}

/// Sink that appends to a file, creating it on first write
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TextSink for FileSink {
    fn append(&mut self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// In-memory sink, mainly for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: String,
}

impl MemorySink {
    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

impl TextSink for MemorySink {
    fn append(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}

/// Creates one detail sink per cycle. File naming and placement are the
/// factory's concern, not the session driver's.
pub trait DetailSinkFactory {
    fn create(
        &mut self,
        stamp: DateTime<Local>,
        total: u32,
        cycle: u32,
    ) -> Result<Box<dyn TextSink>>;
}

/// Factory writing one timestamp-named detail file per cycle into a
/// directory
#[derive(Debug, Clone)]
pub struct DirDetailSinks {
    dir: PathBuf,
}

impl DirDetailSinks {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DetailSinkFactory for DirDetailSinks {
    fn create(
        &mut self,
        stamp: DateTime<Local>,
        total: u32,
        cycle: u32,
    ) -> Result<Box<dyn TextSink>> {
        let path = self.dir.join(detail_file_name(stamp, total, cycle));
        log::info!("cycle detail file: {}", path.display());
        Ok(Box::new(FileSink::new(path)))
    }
}

/// Detail file name: timestamp plus total/cycle indices
pub fn detail_file_name(stamp: DateTime<Local>, total: u32, cycle: u32) -> String {
    format!(
        "T {} {:02} - {:02}.txt",
        stamp.format("%Y%m%d_%H_%M_%S"),
        total,
        cycle
    )
}

/// Group digits with thousands separators: 1234567 -> "1,234,567"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn stamp_str(t: &DateTime<Local>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Session log header: rule, requested cycle count with timestamp, rule
pub fn append_session_header(
    sink: &mut dyn TextSink,
    cycles: u32,
    at: DateTime<Local>,
) -> Result<()> {
    sink.append(&format!("{}\n", "*".repeat(33)))?;
    sink.append(&format!("Cycles: {}\t{}\n", cycles, stamp_str(&at)))?;
    sink.append(&format!("{}\n", "*".repeat(28)))?;
    Ok(())
}

/// Per-cycle session log block: separator, index, start, count, end,
/// blank-line terminator
pub fn append_cycle_block(sink: &mut dyn TextSink, result: &CycleResult) -> Result<()> {
    sink.append(&format!("***\t{}\t", result.index))?;
    sink.append(&format!("{}\n", "*".repeat(60)))?;
    sink.append(&format!("{}\n", stamp_str(&result.start)))?;
    sink.append(&format!("{}\n", format_count(result.iterations)))?;
    sink.append(&format!("{}\n", stamp_str(&result.end)))?;
    sink.append("\n\n")?;
    Ok(())
}

/// Final session log summary: sum, span, average, elapsed decomposition
pub fn append_summary_block(sink: &mut dyn TextSink, session: &Session) -> Result<()> {
    sink.append(&format!(
        "******\tSum: {} operations across {} cycles *********\n",
        format_count(session.sum),
        session.requested
    ))?;
    sink.append(&format!(
        "Cycle started: {} ... Cycle ended: {} **********\n",
        stamp_str(&session.started),
        stamp_str(&session.ended)
    ))?;
    sink.append(&format!(
        "Average: {} operations per second **********\n",
        format_count(session.average)
    ))?;
    sink.append(&format!("Time: {}\n", session.elapsed()))?;
    sink.append(&format!("{}\n\n", "_".repeat(33)))?;
    Ok(())
}

/// Render the full detail-file body for one cycle: pause lines, one line
/// per sample, and the closing iterations/start/end trailer.
pub fn render_detail(result: &CycleResult) -> String {
    let mut out = String::new();
    for pause_ms in &result.pauses_ms {
        let _ = writeln!(out, "Paused for {pause_ms}ms");
    }
    for sample in &result.samples {
        let _ = writeln!(
            out,
            "Iteration {} {}",
            format_count(sample.iteration),
            stamp_str(&sample.at)
        );
    }
    let _ = writeln!(
        out,
        "Iterations {} Start {} ... End {}",
        format_count(result.iterations),
        stamp_str(&result.start),
        stamp_str(&result.end)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_time;
    use crate::cycle::Sample;

    fn sample_result() -> CycleResult {
        CycleResult {
            index: 2,
            start: test_time(10, 20, 5),
            end: test_time(10, 20, 6),
            iterations: 1_234_567,
            samples: vec![
                Sample {
                    iteration: 0,
                    at: test_time(10, 20, 5),
                },
                Sample {
                    iteration: 100_000,
                    at: test_time(10, 20, 5),
                },
            ],
            pauses_ms: vec![800],
        }
    }

    #[test]
    fn test_format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(100_000), "100,000");
    }

    #[test]
    fn test_detail_file_name_layout() {
        let name = detail_file_name(test_time(9, 5, 7), 12, 3);
        assert_eq!(name, "T 20260115_09_05_07 12 - 03.txt");
    }

    #[test]
    fn test_session_header_block() {
        let mut sink = MemorySink::default();
        append_session_header(&mut sink, 3, test_time(10, 20, 5)).unwrap();
        let text = sink.contents();
        assert!(text.starts_with(&"*".repeat(33)));
        assert!(text.contains("Cycles: 3\t2026-01-15 10:20:05\n"));
    }

    #[test]
    fn test_cycle_block_layout() {
        let mut sink = MemorySink::default();
        append_cycle_block(&mut sink, &sample_result()).unwrap();
        let text = sink.contents();
        assert!(text.starts_with("***\t2\t"));
        assert!(text.contains("\n2026-01-15 10:20:05\n"));
        assert!(text.contains("\n1,234,567\n"));
        assert!(text.contains("\n2026-01-15 10:20:06\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_render_detail_pauses_samples_trailer() {
        let text = render_detail(&sample_result());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Paused for 800ms");
        assert_eq!(lines[1], "Iteration 0 2026-01-15 10:20:05");
        assert_eq!(lines[2], "Iteration 100,000 2026-01-15 10:20:05");
        assert_eq!(
            lines[3],
            "Iterations 1,234,567 Start 2026-01-15 10:20:05 ... End 2026-01-15 10:20:06"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_file_sink_appends_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Iteration.txt");
        let mut sink = FileSink::new(&path);
        sink.append("first\n").unwrap();
        sink.append("second\n").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn test_dir_detail_sinks_write_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut factory = DirDetailSinks::new(dir.path());
        let mut sink = factory.create(test_time(9, 5, 7), 2, 1).unwrap();
        sink.append("Iteration 0\n").unwrap();
        let expected = dir.path().join("T 20260115_09_05_07 02 - 01.txt");
        assert!(expected.exists());
    }
}
