//! Dense block helpers on top of Faer.
//!
//! Element blocks, frontal matrices and diagonal inverses are small dense
//! `faer::Mat<T>` values. This module gathers the few operations the
//! elimination needs on them: sub-block extraction, in-place zeroing,
//! inversion through a partial-pivoting LU, the Schur update and block mat-vec.

use crate::core::traits::Scalar;
use faer::linalg::solvers::DenseSolveCore;
use faer::{ColRef, Mat};
use std::ops::Range;

/// Copy of the `rows × cols` sub-block of `m`.
pub fn sub_block<T: Scalar>(m: &Mat<T>, rows: Range<usize>, cols: Range<usize>) -> Mat<T> {
    m.as_ref()
        .submatrix(rows.start, cols.start, rows.len(), cols.len())
        .to_owned()
}

pub fn set_zero<T: Scalar>(m: &mut Mat<T>) {
    m.as_mut().fill(T::zero());
}

/// Inverse of a square block, or `None` when the block is singular.
pub fn invert<T: Scalar>(block: &Mat<T>) -> Option<Mat<T>> {
    assert_eq!(block.nrows(), block.ncols(), "only square blocks can be inverted");
    let inv = block.partial_piv_lu().inverse();
    let n = inv.nrows();
    let finite = (0..n).all(|j| (0..n).all(|i| inv[(i, j)].is_finite()));
    finite.then_some(inv)
}

/// Schur complement `F[q,q] − F[q,p] · F[p,p] · F[p,q]` of a frontal matrix
/// whose leading `n1 × n1` block already holds the inverse pivot block.
pub fn schur_complement<T: Scalar>(frontal: &Mat<T>, n1: usize) -> Mat<T> {
    let f = frontal.as_ref();
    let n2 = f.nrows() - n1;
    let dinv = f.submatrix(0, 0, n1, n1);
    let f_pq = f.submatrix(0, n1, n1, n2);
    let f_qp = f.submatrix(n1, 0, n2, n1);
    let f_qq = f.submatrix(n1, n1, n2, n2);
    let tmp = dinv * f_pq;
    f_qq - f_qp * &tmp
}

/// y = B x for a square block `B`.
pub fn block_matvec<T: Scalar>(block: &Mat<T>, x: &[T], y: &mut [T]) {
    assert_eq!(block.ncols(), x.len(), "Input slice x has incorrect length");
    assert_eq!(block.nrows(), y.len(), "Output slice y has incorrect length");
    let z = block.as_ref() * ColRef::from_slice(x);
    for (yi, zi) in y.iter_mut().zip(z.iter()) {
        *yi = *zi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn invert_recovers_identity() {
        let a = Mat::from_fn(3, 3, |i, j| match (i, j) {
            (0, 0) => 2.0, (0, 1) => 1.0, (0, 2) => 1.0,
            (1, 0) => 1.0, (1, 1) => 3.0, (1, 2) => 2.0,
            (2, 0) => 1.0, (2, 1) => 0.0, (2, 2) => 4.0,
            _ => 0.0,
        });
        let inv = invert(&a).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let prod: f64 = (0..3).map(|k| a[(i, k)] * inv[(k, j)]).sum();
                assert_abs_diff_eq!(prod, if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn invert_handles_assembled_grid_block() {
        // 16×16 assembled Q1 matrix of a 3×3 grid, shifted; the pivot of a
        // single element that covers the whole mesh
        let mesh = crate::mesh::quad_grid(3, 3, |_, _| {
            let k = crate::mesh::q1_laplace();
            Mat::from_fn(4, 4, |i, j| k[(i, j)] + if i == j { 1.0 } else if i < j { 0.1 } else { -0.05 })
        })
        .unwrap();
        let a = mesh.assemble(None).unwrap().to_dense();
        assert_eq!(a.nrows(), 16);
        let inv = invert(&a).unwrap();
        let prod = &a * &inv;
        for i in 0..16 {
            for j in 0..16 {
                assert_abs_diff_eq!(prod[(i, j)], if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn invert_rejects_singular_block() {
        let a = Mat::<f64>::zeros(2, 2);
        assert!(invert(&a).is_none());
    }

    #[test]
    fn schur_of_2x2() {
        // F = [[2, 1], [1, 3]] with the pivot already inverted: S = 3 - 1 * 0.5 * 1
        let mut f = Mat::from_fn(2, 2, |i, j| if i == j { (2 + i) as f64 } else { 1.0 });
        f[(0, 0)] = 0.5;
        let s = schur_complement(&f, 1);
        assert_eq!((s.nrows(), s.ncols()), (1, 1));
        assert_abs_diff_eq!(s[(0, 0)], 2.5, epsilon = 1e-15);
    }

    #[test]
    fn sub_block_and_matvec() {
        let m = Mat::from_fn(3, 3, |i, j| (3 * i + j) as f64);
        let b = sub_block(&m, 1..3, 0..2);
        assert_eq!(b[(0, 0)], 3.0);
        assert_eq!(b[(1, 1)], 7.0);
        let mut y = vec![0.0; 2];
        block_matvec(&b, &[1.0, 1.0], &mut y);
        assert_eq!(y, vec![7.0, 13.0]);
    }
}
