//! Square, odd-sized convolution kernels

use crate::{ConvError, Matrix, Result};

/// A `K×K` weight matrix with `K` odd, so a unique center exists at `K / 2`
///
/// # Example
///
/// ```
/// use convsoak::{Kernel, Matrix};
///
/// let k = Kernel::new(Matrix::from_vec(3, 3, vec![0, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap()).unwrap();
/// assert_eq!(k.size(), 3);
/// assert_eq!(k.offset(), 1);
/// assert_eq!(k, Kernel::identity(3).unwrap());
///
/// // Even sizes have no center cell
/// assert!(Kernel::zeros(2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Kernel {
    weights: Matrix,
}

impl Kernel {
    /// Wraps a matrix as a kernel
    ///
    /// # Errors
    ///
    /// Returns `InvalidKernel` if the matrix is not square or its size is even
    pub fn new(weights: Matrix) -> Result<Self> {
        let (rows, cols) = weights.shape();
        if rows != cols {
            return Err(ConvError::InvalidKernel(format!(
                "kernel must be square, got {rows}x{cols}"
            )));
        }
        if rows % 2 == 0 {
            return Err(ConvError::InvalidKernel(format!(
                "kernel size must be odd, got {rows}"
            )));
        }
        Ok(Kernel { weights })
    }

    /// Kernel of size `k` with every weight set to `value`
    pub fn filled(k: usize, value: i64) -> Result<Self> {
        Self::new(Matrix::filled(k, k, value)?)
    }

    /// All-zero kernel of size `k`
    pub fn zeros(k: usize) -> Result<Self> {
        Self::filled(k, 0)
    }

    /// Kernel of size `k` with a single `1` at the center
    pub fn identity(k: usize) -> Result<Self> {
        let mut weights = Matrix::new(k, k)?;
        let center = k / 2;
        if let Some(cell) = weights.get_mut(center, center) {
            *cell = 1;
        }
        Self::new(weights)
    }

    /// Side length `K`
    pub fn size(&self) -> usize {
        self.weights.rows()
    }

    /// Offset of the center cell, `K / 2`
    pub fn offset(&self) -> usize {
        self.weights.rows() / 2
    }

    /// Weight at kernel row `k`, column `l`
    ///
    /// Returns `None` if either index is `>= size()`
    pub fn weight(&self, k: usize, l: usize) -> Option<i64> {
        self.weights.get(k, l)
    }

    /// Underlying weight matrix
    pub fn as_matrix(&self) -> &Matrix {
        &self.weights
    }

    /// Consumes the kernel, returning its weight matrix
    pub fn into_matrix(self) -> Matrix {
        self.weights
    }
}

impl TryFrom<Matrix> for Kernel {
    type Error = ConvError;

    fn try_from(weights: Matrix) -> Result<Self> {
        Kernel::new(weights)
    }
}
