//! Soak/benchmark statistics for a pool run

use std::time::Duration;

use tracing::info;

use crate::pool::WorkerState;
use crate::sync::GateStats;
use crate::{ExecutionMode, RowRange};

/// What one worker did during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker id (also its position in the partition)
    pub id: usize,
    /// Rows this worker owns
    pub range: RowRange,
    /// Lifecycle state when the report was taken
    pub state: WorkerState,
    /// Iterations finished
    pub iterations_completed: u64,
    /// Output cells written across all iterations
    pub cells_written: u64,
    /// Wall time inside the worker's iteration loop
    pub elapsed: Duration,
}

/// Cumulative report for one [`crate::WorkerPool::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Mode the pool ran in
    pub mode: ExecutionMode,
    /// Input shape (rows, cols)
    pub shape: (usize, usize),
    /// Kernel side length
    pub kernel_size: usize,
    /// Iterations requested per worker
    pub iterations: u64,
    /// Wall time from first spawn to last join
    pub elapsed: Duration,
    /// Per-worker reports, ordered by id
    pub workers: Vec<WorkerReport>,
    /// Gate contention counters (all zero in parallel mode)
    pub gate: GateStats,
}

impl RunReport {
    /// Number of workers that ran
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Total output cells computed across all workers and iterations
    #[must_use]
    pub fn cells_computed(&self) -> u64 {
        self.workers.iter().map(|w| w.cells_written).sum()
    }

    /// Cells needed for the result: one pass per iteration
    #[must_use]
    pub fn cells_required(&self) -> u64 {
        (self.shape.0 * self.shape.1) as u64 * self.iterations
    }

    /// Computed cells divided by required cells
    ///
    /// 1.0 for the partitioned modes; equal to the worker count in redundant mode.
    #[must_use]
    pub fn redundancy(&self) -> f64 {
        let required = self.cells_required();
        if required == 0 {
            return 0.0;
        }
        self.cells_computed() as f64 / required as f64
    }

    /// Cells computed per second of wall time
    #[must_use]
    pub fn cells_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.cells_computed() as f64 / secs
    }

    /// Mean wall time spent in a worker's iteration loop
    #[must_use]
    pub fn mean_worker_time(&self) -> Duration {
        if self.workers.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.workers.iter().map(|w| w.elapsed).sum();
        total / self.workers.len() as u32
    }

    /// Worker with the longest iteration loop
    #[must_use]
    pub fn slowest_worker(&self) -> Option<&WorkerReport> {
        self.workers.iter().max_by_key(|w| w.elapsed)
    }

    /// Whether every worker joined after completing all its iterations
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.workers
            .iter()
            .all(|w| w.state == WorkerState::Joined && w.iterations_completed == self.iterations)
    }

    /// Emits the summary as `info` events
    pub fn log_summary(&self) {
        info!(
            mode = %self.mode,
            rows = self.shape.0,
            cols = self.shape.1,
            kernel = self.kernel_size,
            workers = self.worker_count(),
            iterations = self.iterations,
            elapsed_ms = self.elapsed.as_millis() as u64,
            cells = self.cells_computed(),
            cells_per_sec = %format!("{:.0}", self.cells_per_second()),
            redundancy = %format!("{:.2}", self.redundancy()),
            "run complete"
        );
        if self.mode.uses_gate() {
            info!(
                acquisitions = self.gate.acquisitions,
                total_wait_ms = self.gate.total_wait.as_millis() as u64,
                mean_wait_us = self.gate.mean_wait().as_micros() as u64,
                "gate contention"
            );
        }
        if let Some(slowest) = self.slowest_worker() {
            info!(
                worker = slowest.id,
                range = %slowest.range,
                elapsed_ms = slowest.elapsed.as_millis() as u64,
                "slowest worker"
            );
        }
    }
}
