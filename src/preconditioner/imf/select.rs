//! Greedy selection of structurally independent diagonal blocks.

use super::estimate::estimate;
use crate::core::traits::Scalar;
use crate::mesh::{ElementId, ElementStructure, Status};

/// Ordering positions handed out so far, one per variable.
#[derive(Debug)]
pub(crate) struct OrderingState {
    pub(crate) position: Vec<Option<usize>>,
    pub(crate) numbered: Vec<bool>,
    pub(crate) next: usize,
}

impl OrderingState {
    pub(crate) fn new(total_vars: usize) -> Self {
        Self { position: vec![None; total_vars], numbered: vec![false; total_vars], next: 0 }
    }

    fn assign(&mut self, node: usize) {
        debug_assert!(self.position[node].is_none(), "node {node} numbered twice");
        self.position[node] = Some(self.next);
        self.numbered[node] = true;
        self.next += 1;
    }

    /// Final permutation; `None` if a variable never got a position.
    pub(crate) fn finish(self) -> Option<Vec<usize>> {
        self.position.into_iter().collect()
    }
}

/// Run one selection pass and return the chosen diagonal elements in
/// selection order.
///
/// Every live element that is not yet diagonal is reset to `Unmarked` and
/// ranked by `(estimate, id)`. Scanning in that order, each still unmarked
/// element becomes `Diagonal`, its nodes take the next ordering positions,
/// and everything within two hops is marked so no two blocks of the same pass
/// touch a common neighbor.
pub(crate) fn select_diagonals<T: Scalar>(
    mesh: &mut ElementStructure<T>,
    state: &mut OrderingState,
    use_node_status: bool,
) -> Vec<ElementId> {
    let mut candidates: Vec<(isize, ElementId)> = Vec::new();
    {
        // estimates read the graph as it stands at the start of the pass
        let numbered = use_node_status.then_some(state.numbered.as_slice());
        for el in mesh.elements() {
            if matches!(el.status(), Status::Removed | Status::Diagonal) {
                continue;
            }
            debug_assert!(!el.is_empty(), "live element {} has no nodes", el.id());
            candidates.push((estimate(mesh, el.id(), numbered), el.id()));
        }
    }
    for &(_, id) in &candidates {
        mesh.set_status(id, Status::Unmarked);
    }
    candidates.sort_unstable();

    let mut selected = Vec::new();
    for (_, id) in candidates {
        if mesh.element(id).status() != Status::Unmarked {
            continue;
        }
        mesh.set_status(id, Status::Diagonal);
        for &node in mesh.element(id).nodes() {
            state.assign(node);
        }
        for nb in mesh.level_neighbors(id, 2) {
            debug_assert_ne!(mesh.element(nb).status(), Status::Diagonal);
            mesh.set_status(nb, Status::MarkedCurrent);
        }
        selected.push(id);
    }
    selected
}
