//! Log directory layout and run configuration
//!
//! The session log lives under `CycleLog/Iteration.txt` and per-cycle
//! detail files under `CycleLogDetail/`, both below a base directory
//! (current directory by default). Both directories must exist before a
//! session starts; a failed check halts the program before any cycle
//! runs and before any log write.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// Directory for per-cycle detail files
pub const DETAIL_DIR_NAME: &str = "CycleLogDetail";
/// Directory for the session log
pub const SESSION_DIR_NAME: &str = "CycleLog";
/// Session log file name inside [`SESSION_DIR_NAME`]
pub const SESSION_LOG_FILE: &str = "Iteration.txt";

/// Resolved locations of both log directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub detail_dir: PathBuf,
    pub session_dir: PathBuf,
}

impl LogPaths {
    /// Standard layout below a base directory
    pub fn under(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            detail_dir: base.join(DETAIL_DIR_NAME),
            session_dir: base.join(SESSION_DIR_NAME),
        }
    }

    /// Best-effort creation of both directories
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.detail_dir)?;
        fs::create_dir_all(&self.session_dir)?;
        Ok(())
    }

    /// Verify both directories exist, reporting every missing one
    pub fn verify(&self) -> Result<()> {
        let missing: Vec<PathBuf> = [&self.detail_dir, &self.session_dir]
            .into_iter()
            .filter(|p| !p.is_dir())
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BenchError::MissingDirectories(missing))
        }
    }

    /// Full path of the session log file
    pub fn session_log_file(&self) -> PathBuf {
        self.session_dir.join(SESSION_LOG_FILE)
    }
}

/// Run configuration, optionally loaded from a TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Base directory holding both log directories
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Default cycle count when the command line and stdin provide none
    #[serde(default)]
    pub cycles: Option<u32>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            cycles: None,
        }
    }
}

impl RunConfig {
    /// Load from TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| BenchError::Configuration(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BenchError::Configuration(format!("TOML parse error: {}", e)))
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# cyclebench run configuration
# Base directory holding CycleLog/ and CycleLogDetail/
base_dir = "."
# Default number of measurement cycles (stdin prompt is skipped when set)
# cycles = 5
"#
        .into()
    }

    /// Log directory layout derived from the base directory
    pub fn log_paths(&self) -> LogPaths {
        LogPaths::under(&self.base_dir)
    }
}
