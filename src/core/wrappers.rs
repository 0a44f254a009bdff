//! Wrappers for faer dense matrices, the crate's CSR type and plain vectors.
//!
//! This module implements the core linear algebra traits for `faer::Mat`, `CsrMatrix` and `Vec<T>`,
//! so that assembled element systems and IMF factors can be used by the generic Krylov solvers.
//! Inner products use Rayon when the `rayon` feature is enabled.

use crate::core::traits::{Indexing, InnerProduct, MatVec, Scalar};
use crate::matrix::sparse::{CsrMatrix, SparseMatrix};
use faer::{ColRef, Mat};
use num_traits::Float;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Scalar> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        let ax = self.as_ref() * ColRef::from_slice(x);
        for (yi, v) in y.iter_mut().zip(ax.iter()) {
            *yi = *v;
        }
    }
}

/// Implements matrix-vector multiplication for a compressed-row matrix.
///
/// Rows are processed in parallel when the `rayon` feature is enabled.
impl<T: Scalar> MatVec<Vec<T>> for CsrMatrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        #[cfg(feature = "rayon")]
        {
            self.spmv_parallel(x, y);
        }
        #[cfg(not(feature = "rayon"))]
        {
            self.spmv(x, y);
        }
    }
}

/// Implements inner product and norm for vectors, with optional Rayon parallelism.
impl<T: Float + From<f64> + Send + Sync> InnerProduct<Vec<T>> for () {
    type Scalar = T;
    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .zip(y.as_slice().par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }
    /// Computes the Euclidean norm of a vector: `||x||_2`.
    fn norm(&self, x: &Vec<T>) -> T {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .map(|xi| *xi * *xi)
                .reduce(|| T::zero(), |acc, v| acc + v)
                .sqrt()
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .map(|xi| *xi * *xi)
                .fold(T::zero(), |acc, v| acc + v)
                .sqrt()
        }
    }
}

impl<T> Indexing for Vec<T> {
    fn nrows(&self) -> usize {
        self.len()
    }
}

impl<T> Indexing for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
}

impl<T: Scalar> Indexing for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        SparseMatrix::nrows(self)
    }
}
