// Sparse coordinate (COO) and compressed-row (CSR) storage.

use crate::core::traits::Scalar;
use crate::error::ImfError;
use faer::Mat;
use faer::sparse::{
    SparseRowMat,         // owning numeric CSR alias
    SymbolicSparseRowMat, // owning symbolic CSR alias
    Triplet,
};

/// A read‐only sparse matrix supporting y = A * x.
pub trait SparseMatrix<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]);
}

/// Coordinate matrix used while the factors are being collected.
///
/// Entries are kept in insertion order; duplicates are summed on conversion.
#[derive(Clone, Debug)]
pub struct CooMatrix<T> {
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<T>,
}

impl<T: Scalar> CooMatrix<T> {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self::with_capacity(nrows, ncols, 0)
    }

    pub fn with_capacity(nrows: usize, ncols: usize, capacity: usize) -> Self {
        Self {
            nrows,
            ncols,
            rows: Vec::with_capacity(capacity),
            cols: Vec::with_capacity(capacity),
            vals: Vec::with_capacity(capacity),
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }
    pub fn ncols(&self) -> usize {
        self.ncols
    }
    /// Number of stored entries (duplicates counted separately).
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    pub fn insert(&mut self, row: usize, col: usize, val: T) {
        debug_assert!(row < self.nrows && col < self.ncols, "entry ({row}, {col}) out of bounds");
        self.rows.push(row);
        self.cols.push(col);
        self.vals.push(val);
    }

    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.rows
            .iter()
            .zip(&self.cols)
            .zip(&self.vals)
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// Renumber rows and columns into a matrix of a new shape.
    pub fn map_indices<R, C>(self, nrows: usize, ncols: usize, row_map: R, col_map: C) -> Self
    where
        R: Fn(usize) -> usize,
        C: Fn(usize) -> usize,
    {
        let rows: Vec<usize> = self.rows.into_iter().map(row_map).collect();
        let cols: Vec<usize> = self.cols.into_iter().map(col_map).collect();
        debug_assert!(rows.iter().all(|&r| r < nrows));
        debug_assert!(cols.iter().all(|&c| c < ncols));
        Self { nrows, ncols, rows, cols, vals: self.vals }
    }

    /// Compress into CSR; duplicate entries are summed.
    pub fn to_csr(&self) -> Result<CsrMatrix<T>, ImfError> {
        let triplets: Vec<Triplet<usize, usize, T>> = self
            .triplets()
            .map(|(r, c, v)| Triplet::new(r, c, v))
            .collect();
        let inner = SparseRowMat::try_new_from_triplets(self.nrows, self.ncols, &triplets)
            .map_err(|e| ImfError::InvalidMatrix(e.to_string()))?;
        Ok(CsrMatrix { inner })
    }
}

/// Compressed-row matrix backed by `faer::sparse::SparseRowMat`.
#[derive(Clone, Debug)]
pub struct CsrMatrix<T> {
    inner: SparseRowMat<usize, T>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Build a CSR from raw row‐ptr, col‐idx, and values.
    ///
    /// Column indices must be sorted and unique within each row.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        // Build symbolic structure; `None` means “no separate row_nnz”:
        let symbolic = SymbolicSparseRowMat::new_checked(nrows, ncols, row_ptr, None, col_idx);
        let inner = SparseRowMat::new(symbolic, values);
        Self { inner }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.inner.as_ref().val().len()
    }

    /// Value at `(i, j)`, zero when the entry is not stored.
    pub fn get(&self, i: usize, j: usize) -> T {
        let a = self.inner.as_ref();
        let row_ptr = a.symbolic().row_ptr();
        let cols = &a.symbolic().col_idx()[row_ptr[i]..row_ptr[i + 1]];
        match cols.binary_search(&j) {
            Ok(k) => a.val()[row_ptr[i] + k],
            Err(_) => T::zero(),
        }
    }

    pub fn to_dense(&self) -> Mat<T> {
        let a = self.inner.as_ref();
        let row_ptr = a.symbolic().row_ptr();
        let col_idx = a.symbolic().col_idx();
        let val = a.val();
        let mut m = Mat::zeros(self.nrows(), self.ncols());
        for i in 0..self.nrows() {
            for k in row_ptr[i]..row_ptr[i + 1] {
                m[(i, col_idx[k])] = m[(i, col_idx[k])] + val[k];
            }
        }
        m
    }

    /// y ← y − A x
    pub fn spmv_sub(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        let a = self.inner.as_ref();
        let row_ptr = a.symbolic().row_ptr();
        let col_idx = a.symbolic().col_idx();
        let val = a.val();
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = T::zero();
            for k in row_ptr[i]..row_ptr[i + 1] {
                sum = sum + val[k] * x[col_idx[k]];
            }
            *yi = *yi - sum;
        }
    }
}

impl<T: Scalar> SparseMatrix<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        let a = self.inner.as_ref();
        let row_ptr = a.symbolic().row_ptr();
        let col_idx = a.symbolic().col_idx();
        let val = a.val();
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = T::zero();
            for k in row_ptr[i]..row_ptr[i + 1] {
                sum = sum + val[k] * x[col_idx[k]];
            }
            *yi = sum;
        }
    }
}

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "rayon")]
impl<T: Scalar> CsrMatrix<T> {
    /// Parallel SpMV using Rayon
    pub fn spmv_parallel(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        let a = self.inner.as_ref();
        let row_ptr = a.symbolic().row_ptr();
        let col_idx = a.symbolic().col_idx();
        let val = a.val();
        y.par_iter_mut().enumerate().for_each(|(i, yi)| {
            let mut sum = T::zero();
            for k in row_ptr[i]..row_ptr[i + 1] {
                sum = sum + val[k] * x[col_idx[k]];
            }
            *yi = sum;
        });
    }
}
