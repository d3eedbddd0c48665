//! Shared state and the serial gate
//!
//! [`SharedState`] bundles what every worker sees: the read-only input and
//! kernel, plus a [`SerialGate`] for work that must run one worker at a time.
//! The input and kernel are plain shared references; only the gate's payload
//! is behind a lock.
//!
//! The gate counts acquisitions and the time spent waiting for them, so the
//! serialized modes can report how much contention they caused.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::{Kernel, Matrix};

/// Mutual-exclusion gate with contention counters
///
/// Release happens when the [`GateGuard`] is dropped, on every exit path.
/// A holder that panics does not wedge the gate: later acquirers recover the
/// payload from the poisoned lock.
///
/// # Example
///
/// ```
/// use convsoak::sync::SerialGate;
///
/// let gate = SerialGate::new(0u32);
/// {
///     let mut n = gate.acquire();
///     *n += 1;
/// } // released here
/// assert_eq!(gate.stats().acquisitions, 1);
/// assert_eq!(gate.into_inner(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SerialGate<T> {
    inner: Mutex<T>,
    acquisitions: AtomicU64,
    wait_nanos: AtomicU64,
}

impl<T> SerialGate<T> {
    /// Creates a gate guarding `value`
    pub fn new(value: T) -> Self {
        SerialGate {
            inner: Mutex::new(value),
            acquisitions: AtomicU64::new(0),
            wait_nanos: AtomicU64::new(0),
        }
    }

    /// Blocks until the gate is free, then holds it until the guard drops
    pub fn acquire(&self) -> GateGuard<'_, T> {
        let started = Instant::now();
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let waited = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.wait_nanos.fetch_add(waited, Ordering::Relaxed);

        GateGuard { guard }
    }

    /// Snapshot of the contention counters
    pub fn stats(&self) -> GateStats {
        GateStats {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            total_wait: Duration::from_nanos(self.wait_nanos.load(Ordering::Relaxed)),
        }
    }

    /// Consumes the gate, returning its payload
    pub fn into_inner(self) -> T {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped hold on a [`SerialGate`]
#[derive(Debug)]
pub struct GateGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> GateGuard<'_, T> {
    /// Releases the gate now instead of at end of scope
    pub fn release(self) {
        drop(self);
    }
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// Contention counters read from a [`SerialGate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Number of times the gate was acquired
    pub acquisitions: u64,
    /// Total time callers spent blocked in `acquire`
    pub total_wait: Duration,
}

impl GateStats {
    /// Mean wait per acquisition
    #[must_use]
    pub fn mean_wait(&self) -> Duration {
        if self.acquisitions == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_wait.as_nanos() / u128::from(self.acquisitions);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// State shared by every worker for the lifetime of one pool run
///
/// Created before the first worker spawns and dropped after the last one
/// joins. `T` is the gate payload: `()` when the gate only orders work, or
/// the output [`Matrix`] when workers write it through the gate.
#[derive(Debug)]
pub struct SharedState<'a, T = ()> {
    input: &'a Matrix,
    kernel: &'a Kernel,
    gate: SerialGate<T>,
}

impl<'a, T> SharedState<'a, T> {
    /// Bundles the read-only operands with a gate guarding `payload`
    pub fn new(input: &'a Matrix, kernel: &'a Kernel, payload: T) -> Self {
        SharedState {
            input,
            kernel,
            gate: SerialGate::new(payload),
        }
    }

    /// Input matrix (read-only)
    pub fn input(&self) -> &'a Matrix {
        self.input
    }

    /// Kernel (read-only)
    pub fn kernel(&self) -> &'a Kernel {
        self.kernel
    }

    /// The serialization gate
    pub fn gate(&self) -> &SerialGate<T> {
        &self.gate
    }

    /// Tears down the shared state, returning the gate payload
    pub fn into_inner(self) -> T {
        self.gate.into_inner()
    }
}
