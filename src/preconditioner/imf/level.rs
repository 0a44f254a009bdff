//! Per-pass factor bookkeeping and its compression once the ordering is final.

use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::matrix::sparse::{CooMatrix, CsrMatrix};
use crate::mesh::{ElementId, ElementStructure};
use crate::mesh::element::common_positions;

/// Upper bound on the couplings the blocks of one pass can contribute to
/// either factor: `Σ c · (n_neighbor − c)` with `c` the shared node count.
pub(crate) fn capacity<T: Scalar>(mesh: &ElementStructure<T>, selected: &[ElementId]) -> usize {
    selected
        .iter()
        .map(|&d| {
            let diag = mesh.element(d);
            diag.neighbors()
                .iter()
                .map(|&nb| {
                    let neigh = mesh.element(nb);
                    let c = common_positions(diag.nodes(), neigh.nodes()).len();
                    c * (neigh.size() - c)
                })
                .sum::<usize>()
        })
        .sum()
}

/// Couplings collected during one pass, in original numbering.
#[derive(Debug)]
pub(crate) struct LevelBuilder<T> {
    pub(crate) lower: CooMatrix<T>,
    pub(crate) upper: CooMatrix<T>,
    pub(crate) low: usize,
    pub(crate) high: usize,
}

impl<T: Scalar> LevelBuilder<T> {
    pub(crate) fn new(nb_vars: usize, capacity: usize, low: usize, high: usize) -> Self {
        Self {
            lower: CooMatrix::with_capacity(nb_vars, nb_vars, capacity),
            upper: CooMatrix::with_capacity(nb_vars, nb_vars, capacity),
            low,
            high,
        }
    }

    /// Renumber through `ordering` and compress.
    ///
    /// `L` keeps global rows and indexes its columns inside the level, `U` the
    /// other way round.
    pub(crate) fn finalize(self, ordering: &[usize]) -> Result<ImfLevel<T>, ImfError> {
        let n = ordering.len();
        let (low, width) = (self.low, self.high - self.low);
        let lower = self
            .lower
            .map_indices(n, width, |r| ordering[r], |c| ordering[c] - low)
            .to_csr()?;
        let upper = self
            .upper
            .map_indices(width, n, |r| ordering[r] - low, |c| ordering[c])
            .to_csr()?;
        Ok(ImfLevel { lower, upper })
    }
}

/// Compressed factors of one elimination level.
#[derive(Clone, Debug)]
pub struct ImfLevel<T> {
    lower: CsrMatrix<T>,
    upper: CsrMatrix<T>,
}

impl<T: Scalar> ImfLevel<T> {
    /// `n × width` coupling from the level's variables into the rest.
    pub fn lower(&self) -> &CsrMatrix<T> {
        &self.lower
    }
    /// `width × n` coupling from the rest into the level's variables.
    pub fn upper(&self) -> &CsrMatrix<T> {
        &self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::sparse::SparseMatrix;
    use faer::Mat;

    #[test]
    fn capacity_counts_outside_couplings() {
        // {0,1} with neighbors {1,2,3} (c = 1) and {0,1,4} (c = 2)
        let m = ElementStructure::from_elements(
            5,
            vec![
                (vec![0, 1], Mat::<f64>::identity(2, 2)),
                (vec![1, 2, 3], Mat::identity(3, 3)),
                (vec![0, 1, 4], Mat::identity(3, 3)),
            ],
        )
        .unwrap();
        assert_eq!(capacity(&m, &[0]), 4);
    }

    #[test]
    fn finalize_shifts_into_level_range() {
        // three variables, the level owns original variable 2 which sits at position 1
        let ordering = [0, 2, 1];
        let mut b = LevelBuilder::new(3, 2, 1, 2);
        b.lower.insert(0, 2, 0.5);
        b.upper.insert(2, 1, -0.25);
        let level = b.finalize(&ordering).unwrap();
        assert_eq!((level.lower().nrows(), level.lower().ncols()), (3, 1));
        assert_eq!((level.upper().nrows(), level.upper().ncols()), (1, 3));
        assert_eq!(level.lower().get(0, 0), 0.5);
        assert_eq!(level.upper().get(0, 2), -0.25);
    }
}
