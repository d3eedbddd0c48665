//! Pool configuration and command-line interface
//!
//! # Examples
//!
//! ```
//! use convsoak::{ExecutionMode, PoolConfig};
//!
//! let config = PoolConfig::new()
//!     .with_mode(ExecutionMode::Redundant)
//!     .with_iterations(100)
//!     .with_max_workers(8)
//!     .build();
//! assert_eq!(config.max_workers, 8);
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

use crate::{ConvError, ExecutionMode, Result, MAX_WORKERS};

/// Settings for a [`crate::WorkerPool`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// How workers divide and synchronize work
    pub mode: ExecutionMode,
    /// Passes each worker runs
    pub iterations: u64,
    /// Cap on pool size, within `1..=MAX_WORKERS`
    pub max_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            iterations: 1,
            max_workers: MAX_WORKERS,
        }
    }
}

impl PoolConfig {
    /// Parallel mode, one iteration, up to `MAX_WORKERS` workers
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution mode
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set passes per worker
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the pool size cap
    ///
    /// Values are clamped to `1..=MAX_WORKERS`.
    ///
    /// ```
    /// use convsoak::PoolConfig;
    ///
    /// assert_eq!(PoolConfig::new().with_max_workers(0).max_workers, 1);
    /// assert_eq!(PoolConfig::new().with_max_workers(99).max_workers, 16);
    /// ```
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Finalize configuration (no-op, for builder pattern consistency)
    pub fn build(self) -> Self {
        self
    }
}

/// Command-line arguments for the `convsoak` binary
#[derive(Debug, Parser)]
#[command(name = "convsoak")]
#[command(version, about = "Zero-padded 2D integer correlation on a fixed worker pool")]
#[command(long_about = "
Reads an input matrix and an odd-sized square kernel, runs the correlation
on up to 16 worker threads for ITERATIONS passes each, and prints the result.

File formats (whitespace-separated integers):
  input:  rows cols, then rows*cols values
  kernel: size, then size*size values
")]
pub struct Cli {
    /// Input matrix file
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Kernel file
    #[arg(value_name = "KERNEL_FILE")]
    pub kernel_file: PathBuf,

    /// Passes each worker runs
    #[arg(value_name = "ITERATIONS")]
    pub iterations: u64,

    /// Execution mode: parallel, serialized, or redundant
    #[arg(long, default_value_t = ExecutionMode::Parallel)]
    pub mode: ExecutionMode,

    /// Upper bound on worker threads (1-16)
    #[arg(long, default_value_t = MAX_WORKERS)]
    pub max_workers: usize,

    /// Log a run summary (throughput, contention) to stderr
    #[arg(long)]
    pub report: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Pool configuration described by the arguments
    ///
    /// # Errors
    ///
    /// Returns `Usage` if `--max-workers` is outside `1..=16`
    pub fn pool_config(&self) -> Result<PoolConfig> {
        if !(1..=MAX_WORKERS).contains(&self.max_workers) {
            return Err(ConvError::Usage(format!(
                "--max-workers must be between 1 and {MAX_WORKERS}, got {}",
                self.max_workers
            )));
        }
        Ok(PoolConfig::new()
            .with_mode(self.mode)
            .with_iterations(self.iterations)
            .with_max_workers(self.max_workers))
    }

    /// Maximum log level for the stderr subscriber
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 if self.report => Level::INFO,
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// One-line usage string for `program`
pub fn usage(program: &str) -> String {
    format!("Usage: {program} <input_file> <kernel_file> <iterations>")
}
