//! Row partitioning across workers
//!
//! Rows `[0, rows)` are divided into `W` contiguous, disjoint, ordered ranges
//! with `start = id * rows / W` and `end = (id + 1) * rows / W`. Range sizes
//! differ by at most one row when `rows` is not a multiple of `W`.

use std::fmt;

use crate::MAX_WORKERS;

/// Half-open range of row indices `[start, end)` owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRange {
    /// First row (inclusive)
    pub start: usize,
    /// One past the last row (exclusive)
    pub end: usize,
}

impl RowRange {
    /// Creates a range `[start, end)`
    pub fn new(start: usize, end: usize) -> Self {
        RowRange { start, end }
    }

    /// Number of rows in the range
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range holds no rows
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `row` falls inside the range
    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row < self.end
    }

    /// Iterates the row indices in the range
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for RowRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        RowRange::new(r.start, r.end)
    }
}

/// Pool size for `rows` rows: `min(MAX_WORKERS, rows)`, at least 1
///
/// # Example
///
/// ```
/// use convsoak::partition::worker_count;
///
/// assert_eq!(worker_count(5), 5);
/// assert_eq!(worker_count(100), 16);
/// ```
pub fn worker_count(rows: usize) -> usize {
    worker_count_capped(rows, MAX_WORKERS)
}

/// Pool size for `rows` rows with a configured cap, clamped to `1..=MAX_WORKERS`
pub fn worker_count_capped(rows: usize, cap: usize) -> usize {
    rows.min(cap.clamp(1, MAX_WORKERS)).max(1)
}

/// Splits `[0, rows)` into `workers` contiguous ranges ordered by worker id
///
/// `workers` is clamped to `1..=rows` so no range is empty. Returns an empty
/// vector only when `rows == 0`.
///
/// # Example
///
/// ```
/// use convsoak::partition::partition_rows;
/// use convsoak::RowRange;
///
/// let ranges = partition_rows(10, 4);
/// assert_eq!(
///     ranges,
///     vec![
///         RowRange::new(0, 2),
///         RowRange::new(2, 5),
///         RowRange::new(5, 7),
///         RowRange::new(7, 10),
///     ]
/// );
/// ```
pub fn partition_rows(rows: usize, workers: usize) -> Vec<RowRange> {
    if rows == 0 {
        return Vec::new();
    }
    let w = workers.clamp(1, rows);
    (0..w)
        .map(|id| RowRange::new(id * rows / w, (id + 1) * rows / w))
        .collect()
}
