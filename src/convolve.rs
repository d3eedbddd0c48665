//! Zero-padded 2D correlation
//!
//! For each output cell `(i, j)`:
//!
//! ```text
//! out[i][j] = Σ_{k,l} input[i + k - off][j + l - off] * kernel[k][l]
//! ```
//!
//! where `off = K / 2` and neighbors outside the input are omitted from the
//! sum. The kernel is not flipped. The output has the same shape as the input.
//!
//! Arithmetic wraps on `i64` overflow, so a pass never fails and gives the
//! same result in debug and release builds.

use crate::{Kernel, Matrix, RowRange};

/// Computes a single output cell `(i, j)`
///
/// # Example
///
/// ```
/// use convsoak::{convolve::convolve_cell, Kernel, Matrix};
///
/// let input = Matrix::filled(3, 3, 1).unwrap();
/// let kernel = Kernel::filled(3, 1).unwrap();
/// assert_eq!(convolve_cell(&input, &kernel, 0, 0), 4);
/// assert_eq!(convolve_cell(&input, &kernel, 0, 1), 6);
/// assert_eq!(convolve_cell(&input, &kernel, 1, 1), 9);
/// ```
///
/// # Panics
///
/// Panics if `(i, j)` is outside the input.
#[inline]
pub fn convolve_cell(input: &Matrix, kernel: &Kernel, i: usize, j: usize) -> i64 {
    let (rows, cols) = input.shape();
    assert!(
        i < rows && j < cols,
        "cell ({i}, {j}) outside {rows}x{cols} input"
    );
    let size = kernel.size();
    let offset = kernel.offset();
    let weights = kernel.as_matrix().as_slice();
    let data = input.as_slice();

    // Kernel rows/cols whose neighbor lands inside the input
    let k_lo = offset.saturating_sub(i);
    let k_hi = size.min(rows + offset - i);
    let l_lo = offset.saturating_sub(j);
    let l_hi = size.min(cols + offset - j);

    let mut sum: i64 = 0;
    for k in k_lo..k_hi {
        let in_row = &data[(i + k - offset) * cols..][..cols];
        let k_row = &weights[k * size..][..size];
        for l in l_lo..l_hi {
            sum = sum.wrapping_add(in_row[j + l - offset].wrapping_mul(k_row[l]));
        }
    }
    sum
}

/// Computes every cell of the rows in `range`, writing them into `out`
///
/// `out` is the row-major slice for exactly those rows, so it must hold
/// `range.len() * input.cols()` cells. The input is only read; `out` is only
/// written, never read.
///
/// # Panics
///
/// Panics if `out` has the wrong length or `range` runs past the last row.
pub fn convolve_rows(input: &Matrix, kernel: &Kernel, range: RowRange, out: &mut [i64]) {
    let cols = input.cols();
    assert!(
        range.end <= input.rows(),
        "row range {} exceeds {} rows",
        range,
        input.rows()
    );
    assert_eq!(
        out.len(),
        range.len() * cols,
        "output slice does not match row range {range}"
    );

    for (i, out_row) in range.iter().zip(out.chunks_exact_mut(cols)) {
        for (j, cell) in out_row.iter_mut().enumerate() {
            *cell = convolve_cell(input, kernel, i, j);
        }
    }
}

/// Full sequential pass producing a new output matrix
///
/// # Example
///
/// ```
/// use convsoak::{convolve::convolve, Kernel, Matrix};
///
/// let input = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// let out = convolve(&input, &Kernel::identity(3).unwrap());
/// assert_eq!(out, input);
/// ```
pub fn convolve(input: &Matrix, kernel: &Kernel) -> Matrix {
    let mut output = input.clone();
    convolve_into(input, kernel, &mut output);
    output
}

/// Full sequential pass into an existing output of the same shape
///
/// # Panics
///
/// Panics if `output` does not have the input's shape.
pub fn convolve_into(input: &Matrix, kernel: &Kernel, output: &mut Matrix) {
    assert_eq!(
        input.shape(),
        output.shape(),
        "output shape must match input shape"
    );
    let all = RowRange::new(0, input.rows());
    convolve_rows(input, kernel, all, output.as_mut_slice());
}
