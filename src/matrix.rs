//! Integer matrices with row-major storage
//!
//! [`Matrix`] is the container for the input, the kernel weights, and the
//! output of a convolution run. It carries its own dimensions and enforces
//! bounds on every accessor.
//!
//! # Example
//!
//! ```
//! use convsoak::Matrix;
//!
//! let m = Matrix::new(2, 3).unwrap();
//! assert_eq!(m.rows(), 2);
//! assert_eq!(m.cols(), 3);
//! ```

use std::fmt;

use crate::{ConvError, Result, RowRange};

/// A rectangular grid of integers with row-major storage
///
/// For a 2x3 matrix:
/// ```text
/// [[a, b, c],
///  [d, e, f]]
/// ```
/// Data is stored as: [a, b, c, d, e, f]
///
/// Both dimensions are always at least 1.
///
/// # Example
///
/// ```
/// use convsoak::Matrix;
///
/// let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
/// assert_eq!(m.get(0, 1), Some(2));
/// assert_eq!(m.get(1, 0), Some(3));
/// assert_eq!(m.get(2, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    /// Creates a zero-filled matrix
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `rows` or `cols` is zero
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, 0)
    }

    /// Creates a matrix with every cell set to `value`
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `rows` or `cols` is zero
    pub fn filled(rows: usize, cols: usize, value: i64) -> Result<Self> {
        check_dims(rows, cols)?;
        Ok(Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        })
    }

    /// Creates a matrix from row-major data
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if either dimension is zero or
    /// `data.len() != rows * cols`
    ///
    /// # Example
    ///
    /// ```
    /// use convsoak::Matrix;
    ///
    /// assert!(Matrix::from_vec(2, 2, vec![1, 2, 3]).is_err());
    /// ```
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i64>) -> Result<Self> {
        check_dims(rows, cols)?;
        if data.len() != rows * cols {
            return Err(ConvError::InvalidDimensions(format!(
                "data length {} does not match matrix dimensions {}x{} (expected {})",
                data.len(),
                rows,
                cols,
                rows * cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Creates a matrix from a list of rows
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if there are no rows, the first row is
    /// empty, or the rows are ragged
    ///
    /// # Example
    ///
    /// ```
    /// use convsoak::Matrix;
    ///
    /// let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(m.shape(), (2, 2));
    /// assert!(Matrix::from_rows(vec![vec![1, 2], vec![3]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        check_dims(n_rows, n_cols)?;

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(ConvError::InvalidDimensions(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }
        Ok(Matrix {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Returns the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a matrix has at least one cell
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets the value at (row, col)
    ///
    /// Returns `None` if indices are out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row >= self.rows || col >= self.cols {
            None
        } else {
            self.data.get(row * self.cols + col).copied()
        }
    }

    /// Gets a mutable reference to the value at (row, col)
    ///
    /// Returns `None` if indices are out of bounds
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut i64> {
        if row >= self.rows || col >= self.cols {
            None
        } else {
            let idx = row * self.cols + col;
            self.data.get_mut(idx)
        }
    }

    /// Returns one row as a slice
    pub fn row(&self, row: usize) -> Option<&[i64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Iterates over rows in order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[i64]> {
        self.data.chunks_exact(self.cols)
    }

    /// Returns a reference to the underlying row-major data
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Returns a mutable reference to the underlying row-major data
    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.data
    }

    /// Returns the cells of `range` as one contiguous row-major slice
    ///
    /// Returns `None` if the range extends past the last row.
    pub fn rows_slice_mut(&mut self, range: RowRange) -> Option<&mut [i64]> {
        if range.end > self.rows || range.start > range.end {
            return None;
        }
        Some(&mut self.data[range.start * self.cols..range.end * self.cols])
    }

    /// Splits the matrix into one disjoint mutable slice per range
    ///
    /// `ranges` must be ordered, contiguous, and cover every row from 0 (the shape
    /// produced by [`crate::partition::partition_rows`]). Each returned slice
    /// covers exactly the rows of its range, so the slices can be handed to
    /// different threads at the same time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if the ranges leave a gap, overlap, run
    /// past the last row, or stop before it.
    pub fn split_rows_mut(&mut self, ranges: &[RowRange]) -> Result<Vec<&mut [i64]>> {
        let cols = self.cols;
        let rows = self.rows;
        let mut chunks = Vec::with_capacity(ranges.len());
        let mut remaining: &mut [i64] = &mut self.data;
        let mut next_row = 0;

        for range in ranges {
            if range.start != next_row || range.end < range.start || range.end > rows {
                return Err(ConvError::InvalidDimensions(format!(
                    "row range {} does not continue partition at row {} of {}",
                    range, next_row, rows
                )));
            }
            let (chunk, rest) = std::mem::take(&mut remaining).split_at_mut(range.len() * cols);
            chunks.push(chunk);
            remaining = rest;
            next_row = range.end;
        }

        if next_row != rows {
            return Err(ConvError::InvalidDimensions(format!(
                "row ranges end at row {next_row} of {rows}"
            )));
        }

        Ok(chunks)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for value in row {
                write!(f, "{value} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_dims(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(ConvError::InvalidDimensions(format!(
            "matrix must be at least 1x1, got {rows}x{cols}"
        )));
    }
    Ok(())
}
