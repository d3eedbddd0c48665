//! Fixed-size worker pool
//!
//! A run partitions the input rows, spawns one named OS thread per range
//! inside a [`std::thread::scope`], and joins every worker before the output
//! is handed back. Each worker repeats its convolution pass `iterations`
//! times.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──spawn──▶ Running ──loop done + join──▶ Joined
//! ```
//!
//! All workers are spawned before the first join. No partial output is ever
//! observable: the scope is the join barrier.
//!
//! # Modes
//!
//! In [`ExecutionMode::Parallel`] and [`ExecutionMode::Serialized`] every
//! worker holds a mutable borrow of only its own rows, so writes are disjoint
//! by construction. Serialized additionally passes each iteration through
//! the shared gate. [`ExecutionMode::Redundant`] keeps the whole output inside
//! the gate and has every worker recompute all of it on every iteration.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, trace, warn};

use crate::convolve::{convolve_into, convolve_rows};
use crate::partition::{partition_rows, worker_count_capped};
use crate::report::{RunReport, WorkerReport};
use crate::sync::{GateStats, SharedState};
use crate::{ConvError, ExecutionMode, Kernel, Matrix, PoolConfig, Result, RowRange};

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Task assigned, thread not yet running
    Created,
    /// Executing its iteration loop
    Running,
    /// Thread finished and joined; results visible
    Joined,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Created => "created",
            WorkerState::Running => "running",
            WorkerState::Joined => "joined",
        };
        f.write_str(s)
    }
}

/// One worker's assignment
///
/// `rows_out` is the worker's private slice of the output (the rows in
/// `range`), or `None` when the worker writes through the gate instead.
#[derive(Debug)]
pub struct WorkerTask<'a> {
    /// Worker id, `0..workers`
    pub id: usize,
    /// Rows this worker owns
    pub range: RowRange,
    /// Passes to run
    pub iterations: u64,
    state: WorkerState,
    rows_out: Option<&'a mut [i64]>,
    completed: u64,
    cells_written: u64,
}

impl<'a> WorkerTask<'a> {
    fn new(id: usize, range: RowRange, iterations: u64, rows_out: Option<&'a mut [i64]>) -> Self {
        WorkerTask {
            id,
            range,
            iterations,
            state: WorkerState::Created,
            rows_out,
            completed: 0,
            cells_written: 0,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Iterations finished so far
    pub fn iterations_completed(&self) -> u64 {
        self.completed
    }

    fn into_report(self, elapsed: Duration) -> WorkerReport {
        WorkerReport {
            id: self.id,
            range: self.range,
            state: self.state,
            iterations_completed: self.completed,
            cells_written: self.cells_written,
            elapsed,
        }
    }
}

/// Output and statistics of one pool run
#[derive(Debug, Clone)]
pub struct PoolRun {
    /// Convolution result, same shape as the input
    pub output: Matrix,
    /// Timing and contention statistics
    pub report: RunReport,
}

/// Pool of up to [`crate::MAX_WORKERS`] convolution workers
///
/// # Example
///
/// ```
/// use convsoak::{ExecutionMode, Kernel, Matrix, PoolConfig, WorkerPool};
///
/// let input = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
/// let kernel = Kernel::identity(3).unwrap();
///
/// let pool = WorkerPool::new(
///     PoolConfig::new()
///         .with_mode(ExecutionMode::Serialized)
///         .with_iterations(3),
/// );
/// let run = pool.run(&input, &kernel).unwrap();
///
/// assert_eq!(run.output, input);
/// assert_eq!(run.report.worker_count(), 2);
/// assert_eq!(run.report.gate.acquisitions, 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    config: PoolConfig,
}

impl WorkerPool {
    /// Creates a pool with the given configuration
    pub fn new(config: PoolConfig) -> Self {
        WorkerPool { config }
    }

    /// The pool's configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Row ranges the pool would assign for an input with `rows` rows
    pub fn plan(&self, rows: usize) -> Vec<RowRange> {
        partition_rows(rows, worker_count_capped(rows, self.config.max_workers))
    }

    /// Runs the convolution on every worker and joins them all
    ///
    /// # Errors
    ///
    /// - `WorkerSpawn` if the OS refuses to create a thread; workers already
    ///   running are joined before the error is returned
    /// - `WorkerPanicked` if a worker thread panics
    #[instrument(
        skip_all,
        fields(
            mode = %self.config.mode,
            rows = input.rows(),
            cols = input.cols(),
            kernel = kernel.size(),
            iterations = self.config.iterations
        )
    )]
    pub fn run(&self, input: &Matrix, kernel: &Kernel) -> Result<PoolRun> {
        let ranges = self.plan(input.rows());
        info!(workers = ranges.len(), "starting worker pool");

        let started = Instant::now();
        let (output, workers, gate) = match self.config.mode {
            ExecutionMode::Parallel | ExecutionMode::Serialized => {
                self.run_partitioned(input, kernel, &ranges)?
            }
            ExecutionMode::Redundant => self.run_redundant(input, kernel, &ranges)?,
        };
        let elapsed = started.elapsed();

        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            "all workers joined"
        );

        let report = RunReport {
            mode: self.config.mode,
            shape: input.shape(),
            kernel_size: kernel.size(),
            iterations: self.config.iterations,
            elapsed,
            workers,
            gate,
        };
        Ok(PoolRun { output, report })
    }

    fn run_partitioned(
        &self,
        input: &Matrix,
        kernel: &Kernel,
        ranges: &[RowRange],
    ) -> Result<(Matrix, Vec<WorkerReport>, GateStats)> {
        let mut output = Matrix::new(input.rows(), input.cols())?;
        let shared = SharedState::new(input, kernel, ());
        let serialize = self.config.mode.uses_gate();
        let cols = input.cols();

        let tasks: Vec<_> = output
            .split_rows_mut(ranges)?
            .into_iter()
            .zip(ranges)
            .enumerate()
            .map(|(id, (rows_out, &range))| {
                WorkerTask::new(id, range, self.config.iterations, Some(rows_out))
            })
            .collect();

        let workers = spawn_and_join(&shared, tasks, |task, shared| {
            let _turn = serialize.then(|| shared.gate().acquire());
            match task.rows_out.as_deref_mut() {
                Some(out) => {
                    convolve_rows(shared.input(), shared.kernel(), task.range, out);
                    (task.range.len() * cols) as u64
                }
                None => 0,
            }
        })?;

        let gate = shared.gate().stats();
        Ok((output, workers, gate))
    }

    fn run_redundant(
        &self,
        input: &Matrix,
        kernel: &Kernel,
        ranges: &[RowRange],
    ) -> Result<(Matrix, Vec<WorkerReport>, GateStats)> {
        let shared = SharedState::new(input, kernel, Matrix::new(input.rows(), input.cols())?);
        let cells = input.len() as u64;

        let tasks: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(id, &range)| WorkerTask::new(id, range, self.config.iterations, None))
            .collect();

        // The assigned range is ignored: every pass rewrites the whole output
        let workers = spawn_and_join(&shared, tasks, |_task, shared| {
            let mut output = shared.gate().acquire();
            convolve_into(shared.input(), shared.kernel(), &mut output);
            cells
        })?;

        let gate = shared.gate().stats();
        Ok((shared.into_inner(), workers, gate))
    }
}

/// Thread builder for worker `id`
fn worker_builder(id: usize) -> thread::Builder {
    thread::Builder::new().name(format!("convsoak-worker-{id}"))
}

/// Spawns one scoped thread per task, then joins them all
///
/// `pass` runs once per iteration and returns the number of cells it wrote.
/// On a spawn failure no further workers are started; those already running
/// are still joined before the error is returned.
fn spawn_and_join<'t, 's, T, F>(
    shared: &SharedState<'s, T>,
    tasks: Vec<WorkerTask<'t>>,
    pass: F,
) -> Result<Vec<WorkerReport>>
where
    T: Send,
    F: Fn(&mut WorkerTask<'t>, &SharedState<'s, T>) -> u64 + Sync,
{
    spawn_and_join_with(shared, tasks, worker_builder, pass)
}

/// [`spawn_and_join`] with a caller-supplied thread builder per worker id
fn spawn_and_join_with<'t, 's, T, B, F>(
    shared: &SharedState<'s, T>,
    tasks: Vec<WorkerTask<'t>>,
    builder: B,
    pass: F,
) -> Result<Vec<WorkerReport>>
where
    T: Send,
    B: Fn(usize) -> thread::Builder,
    F: Fn(&mut WorkerTask<'t>, &SharedState<'s, T>) -> u64 + Sync,
{
    let pass = &pass;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(tasks.len());
        let mut failure = None;

        for mut task in tasks {
            let id = task.id;
            let range = task.range;
            let spawned = builder(id).spawn_scoped(scope, move || {
                    task.state = WorkerState::Running;
                    let started = Instant::now();
                    for iteration in 0..task.iterations {
                        let written = pass(&mut task, shared);
                        task.cells_written += written;
                        task.completed += 1;
                        trace!(worker = task.id, iteration, "pass complete");
                    }
                    task.into_report(started.elapsed())
                });

            match spawned {
                Ok(handle) => {
                    debug!(worker = id, range = %range, "worker spawned");
                    handles.push((id, handle));
                }
                Err(source) => {
                    warn!(worker = id, error = %source, "could not spawn worker");
                    failure = Some(ConvError::WorkerSpawn { id, source });
                    break;
                }
            }
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            match handle.join() {
                Ok(mut report) => {
                    report.state = WorkerState::Joined;
                    debug!(
                        worker = id,
                        iterations = report.iterations_completed,
                        "worker joined"
                    );
                    reports.push(report);
                }
                Err(_) => {
                    warn!(worker = id, "worker panicked");
                    failure.get_or_insert(ConvError::WorkerPanicked { id });
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(reports),
        }
    })
}
