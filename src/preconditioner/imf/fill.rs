//! What happens to the coupling left behind by an eliminated block.
//!
//! * Coalesce: the Schur complement becomes a new fill-in element replacing
//!   all level-1 neighbors.
//! * Distribute: the neighbors lose the eliminated variables and absorb the
//!   part of the Schur complement that fits inside their own blocks.
//! * Drop: nothing is left to couple; the neighbors empty out.

use crate::core::traits::Scalar;
use crate::mesh::{ElementId, ElementStructure, Status};
use faer::Mat;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    Coalesce,
    Distribute,
    Drop,
}

impl Strategy {
    /// Strategy for a block with `n2` incident variables during pass `pass`.
    pub(crate) fn choose(pass: usize, maxlofi: usize, n2: usize) -> Self {
        if n2 == 0 {
            Strategy::Drop
        } else if pass <= maxlofi {
            Strategy::Coalesce
        } else {
            Strategy::Distribute
        }
    }
}

/// Replace the level-1 neighbors of `diag` by one fill-in element over `q`
/// holding `schur`. Returns the new element's id.
pub(crate) fn coalesce<T: Scalar>(
    mesh: &mut ElementStructure<T>,
    diag: ElementId,
    q: Vec<usize>,
    schur: Mat<T>,
) -> ElementId {
    let reach = mesh.level_neighbors(diag, 2);
    let fill = mesh.push_fill(q, schur);

    let neighbors = mesh.element(diag).neighbors().to_vec();
    for nb in neighbors {
        mesh.element_mut(nb).clear();
        mesh.set_status(nb, Status::Removed);
    }

    for id in reach {
        if matches!(mesh.element(id).status(), Status::Diagonal | Status::Removed) {
            continue;
        }
        let stale: Vec<ElementId> = mesh
            .element(id)
            .neighbors()
            .iter()
            .copied()
            .filter(|&nb| mesh.element(nb).status() == Status::Removed)
            .collect();
        let el = mesh.element_mut(id);
        for nb in stale {
            el.unlink(nb);
        }
        mesh.link(id, fill);
    }
    fill
}

/// Strip the variables `p` of `diag` from its neighbors and spread `schur`
/// (indexed by `q`) over the survivors.
///
/// Returns the number of nonzero Schur entries no neighbor could take.
pub(crate) fn distribute<T: Scalar>(
    mesh: &mut ElementStructure<T>,
    diag: ElementId,
    p: &[usize],
    q: &[usize],
    mut schur: Mat<T>,
) -> usize {
    let neighbors = mesh.element(diag).neighbors().to_vec();
    for &nb in &neighbors {
        debug_assert!(!matches!(mesh.element(nb).status(), Status::Diagonal | Status::Removed));
        if mesh.remove_nodes(nb, p, Some(diag)) {
            mesh.set_status(nb, Status::Removed);
        }
    }
    for &nb in &neighbors {
        if mesh.element(nb).status() != Status::Removed {
            mesh.absorb(nb, &mut schur, q);
        }
    }
    let n2 = q.len();
    (0..n2)
        .flat_map(|j| (0..n2).map(move |i| (i, j)))
        .filter(|&ij| schur[ij] != T::zero())
        .count()
}

/// Remove the neighbors of a block whose front has no incident variables.
pub(crate) fn drop_neighbors<T: Scalar>(mesh: &mut ElementStructure<T>, diag: ElementId, p: &[usize]) {
    let neighbors = mesh.element(diag).neighbors().to_vec();
    for nb in neighbors {
        let emptied = mesh.remove_nodes(nb, p, Some(diag));
        debug_assert!(emptied, "neighbor {nb} of element {diag} kept variables outside the front");
        mesh.set_status(nb, Status::Removed);
    }
}
