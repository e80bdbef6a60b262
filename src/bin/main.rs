//! CLI tool for cyclebench (cybench)

use clap::Parser;
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use cyclebenchlib::config::{LogPaths, RunConfig};
use cyclebenchlib::report::{format_count, DirDetailSinks, FileSink, TIMESTAMP_FORMAT};
use cyclebenchlib::{
    parse_cycles, BenchError, CycleObserver, CycleResult, Sample, Session, SessionDriver,
    SystemClock,
};

#[derive(Parser)]
#[command(name = "cybench")]
#[command(about = "Informal ops-per-second monitor: one-second counting cycles for capacity planning", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of measurement cycles to run (prompts on stdin when omitted)
    #[arg(short = 'n', long)]
    cycles: Option<u32>,

    /// Base directory holding CycleLog/ and CycleLogDetail/
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Optional TOML config file (overrides --base-dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format for the final summary (json or text)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Print a sample config file and exit
    #[arg(long)]
    sample_config: bool,
}

/// Observer echoing live cycle progress to the console
struct ConsoleObserver;

impl CycleObserver for ConsoleObserver {
    fn on_cycle_start(&mut self, cycle: u32, total: u32) {
        println!("{}", "*".repeat(76));
        println!(
            "{}",
            format!("Running Cycle {:02} of {:02}", cycle, total).cyan().bold()
        );
        println!("{}", "*".repeat(44));
    }

    fn on_pause(&mut self, pause_ms: u64) {
        println!("Pausing for {}ms", pause_ms);
    }

    fn on_sample(&mut self, cycle: u32, total: u32, sample: &Sample) {
        println!(
            "Cycle {} of {} Iteration {} {}",
            cycle,
            total,
            format_count(sample.iteration),
            sample.at.format(TIMESTAMP_FORMAT)
        );
    }

    fn on_cycle_end(&mut self, result: &CycleResult) {
        println!(
            "{}",
            format!(
                "Iterations {} Start {} ... End {}",
                format_count(result.iterations),
                result.start.format(TIMESTAMP_FORMAT),
                result.end.format(TIMESTAMP_FORMAT)
            )
            .green()
        );
    }
}

fn print_banner() {
    println!("{}", "*".repeat(50));
    println!("{}", "Cyclebench Iteration Test".bold());
    println!("Provides an informal assessment of operations per second on a given system");
    println!("Helps in building better estimates for capacity planning and design");
    if let Ok(host) = hostname::get() {
        println!(
            "Host: {} ({} logical CPUs)",
            host.to_string_lossy(),
            num_cpus::get()
        );
    }
    println!("{}", "*".repeat(50));
}

/// Prompt on stdout and read one line of stdin; any unparsable or
/// non-positive answer falls back to a single cycle.
fn prompt_for_cycles() -> u32 {
    println!("How many times you want the test to run?");
    print!("Type number then <enter>:  ");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
    parse_cycles(&line)
}

fn print_text_summary(session: &Session) {
    println!(
        "{}",
        format!(
            "******\tSum: {} operations across {} cycles *********",
            format_count(session.sum),
            session.requested
        )
        .bold()
    );
    println!(
        "Average: {} operations per second **********",
        format_count(session.average)
    );
    println!(
        "Cycle started: {} ... Cycle ended: {} **********",
        session.started.format(TIMESTAMP_FORMAT),
        session.ended.format(TIMESTAMP_FORMAT)
    );
    println!("Time: {}", session.elapsed());
}

fn print_json_summary(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let results: Vec<_> = session
        .results
        .iter()
        .map(|r| {
            serde_json::json!({
                "cycle": r.index,
                "iterations": r.iterations,
                "start": r.start.format(TIMESTAMP_FORMAT).to_string(),
                "end": r.end.format(TIMESTAMP_FORMAT).to_string(),
                "samples": r.samples.len(),
                "pauses_ms": r.pauses_ms,
            })
        })
        .collect();
    let doc = serde_json::json!({
        "cycles": session.requested,
        "sum": session.sum,
        "average_ops_per_second": session.average,
        "started": session.started.format(TIMESTAMP_FORMAT).to_string(),
        "ended": session.ended.format(TIMESTAMP_FORMAT).to_string(),
        "elapsed": session.elapsed().to_string(),
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::init();

    if cli.sample_config {
        print!("{}", RunConfig::sample_toml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => RunConfig::from_toml_file(path)?,
        None => RunConfig {
            base_dir: cli.base_dir.clone(),
            cycles: None,
        },
    };

    let paths: LogPaths = config.log_paths();
    let _ = paths.prepare();
    if let Err(err) = paths.verify() {
        match err {
            BenchError::MissingDirectories(missing) => {
                println!("Directories do not exist");
                println!("Missing:");
                for path in missing {
                    println!("{}", path.display());
                }
                // Halt before running any cycle; no log is written.
                return Ok(());
            }
            other => return Err(other.into()),
        }
    }

    print_banner();

    let cycles = match cli.cycles.or(config.cycles) {
        Some(n) => n.max(1),
        None => prompt_for_cycles(),
    };
    println!("Running {} test runs", cycles);

    let mut session_log = FileSink::new(paths.session_log_file());
    let mut details = DirDetailSinks::new(paths.detail_dir.clone());
    let mut observer = ConsoleObserver;

    let driver = SessionDriver::new(SystemClock);
    let session = driver.run(cycles, &mut session_log, &mut details, &mut observer)?;

    match cli.format.as_str() {
        "json" => print_json_summary(&session)?,
        _ => print_text_summary(&session),
    }
    log::info!("session log: {}", session_log.path().display());
    Ok(())
}
