//! Frontal matrix of a diagonal element and its local elimination.

use crate::core::traits::Scalar;
use crate::matrix::dense::{invert, schur_complement, set_zero, sub_block};
use crate::matrix::sparse::CooMatrix;
use crate::mesh::{ElementId, ElementStructure};
use faer::Mat;

/// Dense front `[[F_pp, F_pq], [F_qp, F_qq]]` of one diagonal element.
///
/// `p` are the element's own variables (local rows `0..p.len()`), `q` the
/// incident variables contributed by its neighbors (the remaining rows).
#[derive(Debug)]
pub(crate) struct Frontal<T> {
    pub(crate) p: Vec<usize>,
    pub(crate) q: Vec<usize>,
    pub(crate) matrix: Mat<T>,
}

impl<T: Scalar> Frontal<T> {
    /// Sum the blocks of `diag` and of its level-1 neighbors into a new front.
    ///
    /// Every summed block is zeroed in the mesh, so each contribution enters
    /// exactly one front.
    pub(crate) fn assemble(mesh: &mut ElementStructure<T>, diag: ElementId) -> Self {
        let p = mesh.element(diag).nodes().to_vec();
        let q = mesh.incident_nodes(diag);
        let n1 = p.len();
        let n = n1 + q.len();
        let local = |node: usize| match p.binary_search(&node) {
            Ok(i) => i,
            Err(_) => match q.binary_search(&node) {
                Ok(j) => n1 + j,
                Err(_) => unreachable!("node {node} outside the front of element {diag}"),
            },
        };

        let mut matrix = Mat::<T>::zeros(n, n);
        let neighbors = mesh.element(diag).neighbors().to_vec();
        for id in neighbors.into_iter().chain(std::iter::once(diag)) {
            let el = mesh.element_mut(id);
            let idx: Vec<usize> = el.nodes.iter().map(|&node| local(node)).collect();
            for (i, &li) in idx.iter().enumerate() {
                for (j, &lj) in idx.iter().enumerate() {
                    matrix[(li, lj)] = matrix[(li, lj)] + el.values[(i, j)];
                }
            }
            set_zero(&mut el.values);
        }
        Self { p, q, matrix }
    }

    pub(crate) fn n1(&self) -> usize {
        self.p.len()
    }
    pub(crate) fn n2(&self) -> usize {
        self.q.len()
    }

    /// Record the nonzero couplings `F_pq` into `upper` and `F_qp` into `lower`,
    /// in global numbering.
    pub(crate) fn extract_factors(&self, lower: &mut CooMatrix<T>, upper: &mut CooMatrix<T>) {
        let n1 = self.n1();
        for (i, &pi) in self.p.iter().enumerate() {
            for (k, &qk) in self.q.iter().enumerate() {
                let j = n1 + k;
                if self.matrix[(i, j)] != T::zero() {
                    upper.insert(pi, qk, self.matrix[(i, j)]);
                }
                if self.matrix[(j, i)] != T::zero() {
                    lower.insert(qk, pi, self.matrix[(j, i)]);
                }
            }
        }
    }

    /// Replace `F_pp` by its inverse and return a copy of it; `None` if singular.
    pub(crate) fn invert_pivot(&mut self) -> Option<Mat<T>> {
        let n1 = self.n1();
        let inv = invert(&sub_block(&self.matrix, 0..n1, 0..n1))?;
        self.matrix.as_mut().submatrix_mut(0, 0, n1, n1).copy_from(inv.as_ref());
        Some(inv)
    }

    /// `F_qq − F_qp · F_pp⁻¹ · F_pq`, once the pivot has been inverted.
    pub(crate) fn schur(&self) -> Mat<T> {
        schur_complement(&self.matrix, self.n1())
    }
}
