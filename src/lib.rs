//! convsoak: Zero-Padded 2D Correlation on a Fixed Worker Pool
//!
//! **convsoak** computes a 2D discrete correlation of an integer matrix against
//! a square, odd-sized integer kernel, and repeats that computation across a
//! pool of up to [`MAX_WORKERS`] OS threads for a configurable number of
//! iterations (a soak/benchmark workload).
//!
//! # Design Principles
//!
//! - **Disjoint writes**: rows are partitioned into contiguous ranges, one per
//!   worker, and each worker only ever holds a mutable borrow of its own rows
//! - **Immutable sharing**: input and kernel are shared by plain reference
//! - **Structured lifetime**: every worker is joined before the output is visible
//! - **Measurable contention**: serialized modes route work through an
//!   instrumented [`sync::SerialGate`]
//!
//! # Quick Start
//!
//! ```rust
//! use convsoak::{Kernel, Matrix, PoolConfig, WorkerPool};
//!
//! let input = Matrix::filled(3, 3, 1).unwrap();
//! let kernel = Kernel::filled(3, 1).unwrap();
//!
//! let pool = WorkerPool::new(PoolConfig::new().with_iterations(2));
//! let run = pool.run(&input, &kernel).unwrap();
//!
//! assert_eq!(run.output.as_slice(), &[4, 6, 4, 6, 9, 6, 4, 6, 4]);
//! ```

pub mod config;
pub mod convolve;
pub mod error;
pub mod io;
pub mod kernel;
pub mod matrix;
pub mod partition;
pub mod pool;
pub mod report;
pub mod sync;

pub use config::PoolConfig;
pub use error::{ConvError, Result};
pub use kernel::Kernel;
pub use matrix::Matrix;
pub use partition::RowRange;
pub use pool::{PoolRun, WorkerPool};
pub use report::RunReport;

use std::fmt;
use std::str::FromStr;

/// Upper bound on the number of workers in a pool
pub const MAX_WORKERS: usize = 16;

/// How workers divide and synchronize the convolution work
///
/// Every mode produces the same output matrix; they differ only in how much
/// work is done and how much of it runs concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Each worker computes its own row range with no lock (true parallelism)
    #[default]
    Parallel,
    /// Each worker computes its own row range, one worker at a time
    Serialized,
    /// Stress mode: every worker recomputes the whole output under the gate
    /// on every iteration, `workers × iterations` redundant full passes
    Redundant,
}

impl ExecutionMode {
    /// All modes, in declaration order
    pub const ALL: [ExecutionMode; 3] = [
        ExecutionMode::Parallel,
        ExecutionMode::Serialized,
        ExecutionMode::Redundant,
    ];

    /// Canonical lowercase name, as accepted on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Serialized => "serialized",
            ExecutionMode::Redundant => "redundant",
        }
    }

    /// Whether workers pass through the serial gate on each iteration
    pub fn uses_gate(self) -> bool {
        !matches!(self, ExecutionMode::Parallel)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parallel" => Ok(ExecutionMode::Parallel),
            "serialized" => Ok(ExecutionMode::Serialized),
            "redundant" => Ok(ExecutionMode::Redundant),
            other => Err(ConvError::Usage(format!("unknown execution mode: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_parallel() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Parallel);
    }

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in ExecutionMode::ALL {
            assert_eq!(mode.as_str().parse::<ExecutionMode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.as_str());
        }
    }

    #[test]
    fn test_mode_parse_is_case_insensitive() {
        assert_eq!(
            "Serialized".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Serialized
        );
    }

    #[test]
    fn test_mode_parse_unknown() {
        let err = "gpu".parse::<ExecutionMode>().unwrap_err();
        assert!(err.to_string().contains("unknown execution mode"));
    }

    #[test]
    fn test_only_parallel_skips_gate() {
        assert!(!ExecutionMode::Parallel.uses_gate());
        assert!(ExecutionMode::Serialized.uses_gate());
        assert!(ExecutionMode::Redundant.uses_gate());
    }
}
