//! Incomplete multifrontal (IMF) factorization.
//!
//! The factorization is built directly on the element graph instead of an
//! assembled matrix. Every pass selects a set of diagonal elements no two of
//! which lie within two hops of each other, assembles a dense front for each,
//! records the off-diagonal couplings as this level's `L`/`U` entries, inverts
//! the pivot block and then either coalesces the Schur complement into a
//! fill-in element (passes `1..=maxlofi`) or distributes it over the surviving
//! neighbors. Passes repeat until every variable has been eliminated.
//!
//! Applying the factorization is a forward sweep over the levels followed by
//! a backward sweep; see [`Imf::apply_permuted`].
//!
//! # Usage
//!
//! - Build an `ElementStructure` (`from_elements`, `quad_grid` or the file reader).
//! - Call `Imf::new` (works on a copy) or `Imf::factor_in_place`.
//! - Use `solve`, or pass the `Imf` as a `Preconditioner` to a Krylov solver.

mod apply;
mod estimate;
mod factor;
mod fill;
mod frontal;
mod level;
mod select;

pub use level::ImfLevel;

use crate::config::options::{ImfOptions, ImfSweep};
use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::matrix::sparse::CsrMatrix;
use crate::mesh::ElementStructure;
use crate::preconditioner::Preconditioner;
use crate::utils::permutation::{permute, unpermute};
use factor::FactorContext;
use faer::Mat;

/// IMF preconditioner.
///
/// - `ordering[i]`: elimination position of original variable `i`
/// - `levels`: compressed `L`/`U` couplings per pass
/// - `diagonal`: inverted pivot blocks in selection order
/// - `block_offsets[l]..block_offsets[l + 1]`: the pivot blocks of level `l`
/// - `diagonal_offsets[l]..diagonal_offsets[l + 1]`: the positions of level `l`
#[derive(Clone, Debug)]
pub struct Imf<T> {
    nb_vars: usize,
    ordering: Vec<usize>,
    levels: Vec<ImfLevel<T>>,
    diagonal: Vec<Mat<T>>,
    block_offsets: Vec<usize>,
    diagonal_offsets: Vec<usize>,
    sweep: ImfSweep,
}

impl<T: Scalar> Imf<T> {
    /// Factor a private copy of `mesh`; the caller's structure is untouched.
    pub fn new(mesh: &ElementStructure<T>, opts: &ImfOptions) -> Result<Self, ImfError> {
        let mut work = mesh.clone();
        FactorContext::new(&mut work, opts).run()
    }

    /// Factor `mesh` itself.
    ///
    /// The blocks of `mesh` are consumed by the elimination: diagonal elements
    /// end up holding their inverted pivots and the others are emptied or
    /// reduced. Fill-in elements created on the way are discarded afterwards.
    pub fn factor_in_place(mesh: &mut ElementStructure<T>, opts: &ImfOptions) -> Result<Self, ImfError> {
        let original = mesh.total_elements();
        let result = FactorContext::new(mesh, opts).run();
        mesh.truncate(original);
        result
    }

    pub fn nb_vars(&self) -> usize {
        self.nb_vars
    }
    /// Number of elimination passes.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }
    /// Number of diagonal blocks over all levels.
    pub fn nb_blocks(&self) -> usize {
        self.diagonal.len()
    }
    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }
    /// `[0, end of level 1, …, end of last level, nb_vars]`; `levels() + 2` entries.
    pub fn diagonal_offsets(&self) -> &[usize] {
        &self.diagonal_offsets
    }
    /// Inverted pivot blocks in selection order.
    pub fn diagonal_blocks(&self) -> &[Mat<T>] {
        &self.diagonal
    }
    pub fn level(&self, l: usize) -> &ImfLevel<T> {
        &self.levels[l]
    }
    pub fn lower(&self, l: usize) -> &CsrMatrix<T> {
        self.levels[l].lower()
    }
    pub fn upper(&self, l: usize) -> &CsrMatrix<T> {
        self.levels[l].upper()
    }
    pub fn lower_nnz(&self) -> usize {
        self.levels.iter().map(|l| l.lower().nnz()).sum()
    }
    pub fn upper_nnz(&self) -> usize {
        self.levels.iter().map(|l| l.upper().nnz()).sum()
    }
    pub fn sweep(&self) -> ImfSweep {
        self.sweep
    }
    pub fn set_sweep(&mut self, sweep: ImfSweep) {
        self.sweep = sweep;
    }

    /// Approximate `A⁻¹ b` in the original numbering.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, ImfError> {
        if b.len() != self.nb_vars {
            return Err(ImfError::DimensionMismatch { expected: self.nb_vars, found: b.len() });
        }
        let permuted = permute(b, &self.ordering);
        let y = self.apply_permuted(&permuted)?;
        Ok(unpermute(&y, &self.ordering))
    }
}

impl<M, T: Scalar> Preconditioner<M, Vec<T>> for Imf<T> {
    fn apply(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), ImfError> {
        if z.len() != self.nb_vars {
            return Err(ImfError::DimensionMismatch { expected: self.nb_vars, found: z.len() });
        }
        *z = self.solve(r)?;
        Ok(())
    }

    /// The factorization is built from an element structure, never from an
    /// assembled matrix.
    fn setup(&mut self, _a: &M) -> Result<(), ImfError> {
        Err(ImfError::Unsupported("IMF is built from an element structure; use Imf::new"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;

    #[test]
    fn isolated_element_inverts_its_block() {
        let a = Mat::from_fn(3, 3, |i, j| if i == j { 4.0 } else { 1.0 });
        let mesh = ElementStructure::from_elements(3, vec![(vec![2, 0, 1], a)]).unwrap();
        let imf = Imf::new(&mesh, &ImfOptions::default()).unwrap();
        assert_eq!(imf.levels(), 1);
        assert_eq!(imf.nb_blocks(), 1);
        assert_eq!(imf.lower_nnz() + imf.upper_nnz(), 0);
        assert_eq!(imf.diagonal_offsets(), &[0, 3, 3]);
        // the copy leaves the caller's block alone
        assert_eq!(mesh.element(0).values()[(0, 0)], 4.0);
    }

    #[test]
    fn in_place_drops_fill_elements() {
        let mut mesh = quad_grid(3, 3, |_, _| {
            Mat::from_fn(4, 4, |i, j| if i == j { 5.0 } else { -1.0 })
        })
        .unwrap();
        let imf = Imf::factor_in_place(&mut mesh, &ImfOptions::new(2)).unwrap();
        assert_eq!(mesh.total_elements(), 9);
        assert!(mesh.elements().all(|el| el.neighbors().iter().all(|&nb| nb < 9)));
        assert_eq!(imf.nb_vars(), 16);
    }

    #[test]
    fn setup_from_matrix_is_unsupported() {
        let mesh = ElementStructure::from_elements(1, vec![(vec![0], Mat::<f64>::identity(1, 1))]).unwrap();
        let mut imf = Imf::new(&mesh, &ImfOptions::default()).unwrap();
        let err = Preconditioner::<CsrMatrix<f64>, Vec<f64>>::setup(&mut imf, &mesh.assemble(None).unwrap()).unwrap_err();
        assert!(matches!(err, ImfError::Unsupported(_)));
    }
}
