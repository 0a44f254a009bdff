//! Forward and backward sweeps over the levels.

use super::Imf;
use crate::config::options::ImfSweep;
use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::matrix::dense::block_matvec;
use crate::matrix::sparse::SparseMatrix;

impl<T: Scalar> Imf<T> {
    /// Apply the factorization to a vector already in elimination order.
    ///
    /// Forward, levels ascending: `dy = D_l⁻¹ r_l`, then `r −= L_l dy`.
    /// Backward, levels descending: `r_l −= U_l r`, then `r_l = D_l⁻¹ r_l`.
    /// A forward-only sweep finishes with `r_l = D_l⁻¹ r_l` on every level.
    pub fn apply_permuted(&self, rhs: &[T]) -> Result<Vec<T>, ImfError> {
        if rhs.len() != self.nb_vars {
            return Err(ImfError::DimensionMismatch { expected: self.nb_vars, found: rhs.len() });
        }
        let mut res = rhs.to_vec();
        if self.sweep.contains(ImfSweep::FORWARD) {
            self.forward(&mut res);
            if !self.sweep.contains(ImfSweep::BACKWARD) {
                for l in 0..self.levels() {
                    let range = self.range(l);
                    let scaled = self.scale(l, &res[range.clone()]);
                    res[range].copy_from_slice(&scaled);
                }
            }
        }
        if self.sweep.contains(ImfSweep::BACKWARD) {
            self.backward(&mut res);
        }
        Ok(res)
    }

    fn range(&self, l: usize) -> std::ops::Range<usize> {
        self.diagonal_offsets[l]..self.diagonal_offsets[l + 1]
    }

    /// Multiply a level slice by that level's inverted pivots, block by block.
    fn scale(&self, l: usize, x: &[T]) -> Vec<T> {
        let mut y = vec![T::zero(); x.len()];
        let mut start = 0;
        for block in &self.diagonal[self.block_offsets[l]..self.block_offsets[l + 1]] {
            let end = start + block.nrows();
            block_matvec(block, &x[start..end], &mut y[start..end]);
            start = end;
        }
        debug_assert_eq!(start, x.len());
        y
    }

    fn forward(&self, res: &mut [T]) {
        for (l, level) in self.levels.iter().enumerate() {
            let dy = self.scale(l, &res[self.range(l)]);
            level.lower().spmv_sub(&dy, res);
        }
    }

    fn backward(&self, res: &mut [T]) {
        for (l, level) in self.levels.iter().enumerate().rev() {
            let range = self.range(l);
            let mut coupling = vec![T::zero(); range.len()];
            level.upper().spmv(res, &mut coupling);
            for (r, c) in res[range.clone()].iter_mut().zip(&coupling) {
                *r = *r - *c;
            }
            let x = self.scale(l, &res[range.clone()]);
            res[range].copy_from_slice(&x);
        }
    }
}
