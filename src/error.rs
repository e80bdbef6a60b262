//! Error types for cyclebench

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cyclebench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Main error type for cyclebench
#[derive(Error, Debug)]
pub enum BenchError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Required log directories are missing
    #[error("Directories do not exist: {}", format_paths(.0))]
    MissingDirectories(Vec<PathBuf>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
