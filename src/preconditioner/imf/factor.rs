//! Construction of the factorization: one context threaded through every pass.

use super::Imf;
use super::fill::{self, Strategy};
use super::frontal::Frontal;
use super::level::{ImfLevel, LevelBuilder, capacity};
use super::select::{OrderingState, select_diagonals};
use crate::config::options::ImfOptions;
use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::mesh::{ElementId, ElementStructure, Status};
use faer::Mat;
use tracing::{debug, info};

/// Mutable state of a running factorization, dropped once `Imf` is built.
pub(crate) struct FactorContext<'a, T> {
    mesh: &'a mut ElementStructure<T>,
    opts: &'a ImfOptions,
    state: OrderingState,
    diagonal_offsets: Vec<usize>,
    block_offsets: Vec<usize>,
    diagonal: Vec<Mat<T>>,
    levels: Vec<LevelBuilder<T>>,
    pass: usize,
}

#[derive(Default)]
struct PassStats {
    coalesced: usize,
    distributed: usize,
    dropped: usize,
    lost_entries: usize,
}

impl<'a, T: Scalar> FactorContext<'a, T> {
    pub(crate) fn new(mesh: &'a mut ElementStructure<T>, opts: &'a ImfOptions) -> Self {
        let state = OrderingState::new(mesh.total_vars());
        Self {
            mesh,
            opts,
            state,
            diagonal_offsets: vec![0],
            block_offsets: vec![0],
            diagonal: Vec::new(),
            levels: Vec::new(),
            pass: 1,
        }
    }

    pub(crate) fn run(mut self) -> Result<Imf<T>, ImfError> {
        let n = self.mesh.total_vars();
        if let Some(var) = self.mesh.uncovered_variable() {
            return Err(ImfError::InvalidMesh(format!("variable {var} belongs to no element")));
        }
        info!(
            variables = n,
            elements = self.mesh.total_elements(),
            maxlofi = self.opts.maxlofi,
            "starting imf factorization"
        );
        while self.state.next < n {
            self.run_pass()?;
        }
        self.finish()
    }

    fn run_pass(&mut self) -> Result<(), ImfError> {
        let n = self.mesh.total_vars();
        let low = self.state.next;
        let selected = select_diagonals(self.mesh, &mut self.state, self.opts.use_node_status);
        // Every unnumbered variable lives in a live element once the coverage
        // check has passed, so this only fires on a corrupted structure and
        // keeps `run` from looping forever.
        debug_assert!(!selected.is_empty(), "pass {} selected nothing with {} variables left", self.pass, n - low);
        if selected.is_empty() {
            return Err(ImfError::Stalled { level: self.pass, remaining: n - low });
        }
        let high = self.state.next;
        self.diagonal_offsets.push(high);

        let mut level = LevelBuilder::new(n, capacity(self.mesh, &selected), low, high);
        let mut stats = PassStats::default();
        for &diag in &selected {
            self.eliminate(diag, &mut level, &mut stats)?;
        }

        let survivors: Vec<ElementId> = self
            .mesh
            .elements()
            .filter(|el| !matches!(el.status(), Status::Diagonal | Status::Removed))
            .map(|el| el.id())
            .collect();
        for id in survivors {
            self.mesh.set_status(id, Status::NonDiagonal);
        }

        self.block_offsets.push(self.diagonal.len());
        debug!(
            pass = self.pass,
            blocks = selected.len(),
            coalesced = stats.coalesced,
            distributed = stats.distributed,
            dropped = stats.dropped,
            lost_entries = stats.lost_entries,
            remaining = n - high,
            "elimination pass done"
        );
        self.levels.push(level);
        self.pass += 1;
        Ok(())
    }

    /// Eliminate one diagonal element: assemble its front, record the
    /// couplings, invert the pivot and deal with the Schur complement.
    fn eliminate(
        &mut self,
        diag: ElementId,
        level: &mut LevelBuilder<T>,
        stats: &mut PassStats,
    ) -> Result<(), ImfError> {
        let mut front = Frontal::assemble(self.mesh, diag);
        front.extract_factors(&mut level.lower, &mut level.upper);
        let inverse = front
            .invert_pivot()
            .ok_or(ImfError::SingularBlock { element: diag, level: self.pass })?;
        self.mesh.element_mut(diag).values = inverse.clone();
        self.diagonal.push(inverse);

        match Strategy::choose(self.pass, self.opts.maxlofi, front.n2()) {
            Strategy::Coalesce => {
                let schur = front.schur();
                fill::coalesce(self.mesh, diag, front.q, schur);
                stats.coalesced += 1;
            }
            Strategy::Distribute => {
                let schur = front.schur();
                stats.lost_entries += fill::distribute(self.mesh, diag, &front.p, &front.q, schur);
                stats.distributed += 1;
            }
            Strategy::Drop => {
                fill::drop_neighbors(self.mesh, diag, &front.p);
                stats.dropped += 1;
            }
        }
        self.mesh.element_mut(diag).neighbors.clear();
        Ok(())
    }

    fn finish(self) -> Result<Imf<T>, ImfError> {
        let n = self.mesh.total_vars();
        let mut diagonal_offsets = self.diagonal_offsets;
        diagonal_offsets.push(n);
        let ordering = self
            .state
            .finish()
            .ok_or_else(|| ImfError::InvalidMesh("elimination left variables unnumbered".into()))?;
        let levels = self
            .levels
            .into_iter()
            .map(|l| l.finalize(&ordering))
            .collect::<Result<Vec<ImfLevel<T>>, ImfError>>()?;

        let imf = Imf {
            nb_vars: n,
            ordering,
            levels,
            diagonal: self.diagonal,
            block_offsets: self.block_offsets,
            diagonal_offsets,
            sweep: self.opts.sweep,
        };
        info!(
            levels = imf.levels(),
            blocks = imf.nb_blocks(),
            lower_nnz = imf.lower_nnz(),
            upper_nnz = imf.upper_nnz(),
            "imf factorization done"
        );
        Ok(imf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_structure_has_no_levels() {
        let mut m = ElementStructure::from_elements(0, Vec::<(Vec<usize>, Mat<f64>)>::new()).unwrap();
        let opts = ImfOptions::default();
        let imf = FactorContext::new(&mut m, &opts).run().unwrap();
        assert_eq!(imf.levels(), 0);
        assert_eq!(imf.diagonal_offsets(), &[0, 0]);
    }

    #[test]
    fn uncovered_variable_is_rejected() {
        let mut m = ElementStructure::from_elements(3, vec![(vec![0, 1], Mat::<f64>::identity(2, 2))]).unwrap();
        let opts = ImfOptions::default();
        let err = FactorContext::new(&mut m, &opts).run().unwrap_err();
        assert!(matches!(err, ImfError::InvalidMesh(_)));
    }

    #[test]
    fn singular_pivot_is_reported() {
        let mut m = ElementStructure::from_elements(2, vec![(vec![0, 1], Mat::<f64>::zeros(2, 2))]).unwrap();
        let opts = ImfOptions::default();
        let err = FactorContext::new(&mut m, &opts).run().unwrap_err();
        assert!(matches!(err, ImfError::SingularBlock { element: 0, level: 1 }));
    }

    #[test]
    fn survivors_are_tagged_non_diagonal() {
        // chain of three: the far end lies two hops away, so pass 1 takes element 0 only
        let blocks = (0..3).map(|k| (vec![k, k + 1], Mat::from_fn(2, 2, |i, j| if i == j { 4.0 } else { -1.0 })));
        let mut m = ElementStructure::from_elements(4, blocks).unwrap();
        let opts = ImfOptions::default();
        let mut ctx = FactorContext::new(&mut m, &opts);
        ctx.run_pass().unwrap();
        drop(ctx);
        assert_eq!(m.element(0).status(), Status::Diagonal);
        assert!(m.element(0).neighbors().is_empty());
        assert_eq!(m.element(1).status(), Status::NonDiagonal);
        assert_eq!(m.element(1).nodes(), &[2]);
        assert_eq!(m.element(2).status(), Status::NonDiagonal);
    }
}
