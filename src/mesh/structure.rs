//! Arena of elements linked through shared nodes.
//!
//! Elements are addressed by their stable `ElementId` (their position in the
//! arena). Neighbor sets are stored as sorted id lists, so the cyclic
//! element–neighbor graph never needs shared references: removing or rewiring
//! an element only edits index lists.

use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::matrix::sparse::{CooMatrix, CsrMatrix};
use crate::mesh::element::{Element, ElementId, Status, common_positions, shares_node};
use faer::Mat;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
pub struct ElementStructure<T> {
    elements: Vec<Element<T>>,
    total_vars: usize,
}

impl<T: Scalar> ElementStructure<T> {
    /// Build the arena from `(nodes, block)` pairs over `total_vars` variables.
    ///
    /// Ids follow the input order; neighbor lists connect every pair of elements
    /// sharing at least one node.
    pub fn from_elements<I>(total_vars: usize, blocks: I) -> Result<Self, ImfError>
    where
        I: IntoIterator<Item = (Vec<usize>, Mat<T>)>,
    {
        let mut elements = Vec::new();
        for (id, (nodes, values)) in blocks.into_iter().enumerate() {
            if nodes.is_empty() {
                return Err(ImfError::InvalidMesh(format!("element {id} has no nodes")));
            }
            if let Some(&bad) = nodes.iter().find(|&&n| n >= total_vars) {
                return Err(ImfError::InvalidMesh(format!(
                    "element {id} references node {bad} but there are only {total_vars} variables"
                )));
            }
            let el = Element::new(id, nodes, values);
            if el.nodes.windows(2).any(|w| w[0] == w[1]) {
                return Err(ImfError::InvalidMesh(format!("element {id} lists a node twice")));
            }
            elements.push(el);
        }

        let mut node_elements: Vec<Vec<ElementId>> = vec![Vec::new(); total_vars];
        for el in &elements {
            for &n in &el.nodes {
                node_elements[n].push(el.id);
            }
        }
        for el in elements.iter_mut() {
            let mut neigh: Vec<ElementId> = el
                .nodes
                .iter()
                .flat_map(|&n| node_elements[n].iter().copied())
                .filter(|&other| other != el.id)
                .collect();
            neigh.sort_unstable();
            neigh.dedup();
            el.neighbors = neigh;
        }
        Ok(Self { elements, total_vars })
    }

    pub fn total_vars(&self) -> usize {
        self.total_vars
    }
    /// Number of elements, fill-in elements and removed ones included.
    pub fn total_elements(&self) -> usize {
        self.elements.len()
    }
    /// Stored block entries over all elements.
    pub fn total_nnz(&self) -> usize {
        self.elements.iter().map(Element::nnz).sum()
    }

    pub fn element(&self, id: ElementId) -> &Element<T> {
        &self.elements[id]
    }
    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut Element<T> {
        &mut self.elements[id]
    }
    pub fn elements(&self) -> impl Iterator<Item = &Element<T>> {
        self.elements.iter()
    }

    /// First variable that no element covers.
    pub fn uncovered_variable(&self) -> Option<usize> {
        let mut covered = vec![false; self.total_vars];
        for el in &self.elements {
            for &n in &el.nodes {
                covered[n] = true;
            }
        }
        covered.iter().position(|&c| !c)
    }

    /// All elements reachable from `id` in at most `k` hops, `id` itself excluded.
    pub fn level_neighbors(&self, id: ElementId, k: usize) -> BTreeSet<ElementId> {
        let mut seen = BTreeSet::from([id]);
        let mut frontier = vec![id];
        for _ in 0..k {
            let mut next = Vec::new();
            for &e in &frontier {
                for &nb in &self.elements[e].neighbors {
                    if seen.insert(nb) {
                        next.push(nb);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        seen.remove(&id);
        seen
    }

    /// Nodes of the level-1 neighbors of `id` that `id` does not own, ascending.
    pub fn incident_nodes(&self, id: ElementId) -> Vec<usize> {
        let el = &self.elements[id];
        let mut nodes: Vec<usize> = el
            .neighbors
            .iter()
            .flat_map(|&nb| self.elements[nb].nodes.iter().copied())
            .filter(|n| el.position(*n).is_none())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Remove the ascending node list `nodes` from element `id`.
    ///
    /// The block shrinks to the remaining variables. Neighbors that no longer
    /// share a node are unlinked in both directions, except that the neighbor
    /// list of `keep` is left untouched. An element left without variables is
    /// cleared. Returns whether the element became empty.
    pub fn remove_nodes(&mut self, id: ElementId, nodes: &[usize], keep: Option<ElementId>) -> bool {
        let el = &self.elements[id];
        let kept: Vec<usize> = (0..el.nodes.len())
            .filter(|&i| nodes.binary_search(&el.nodes[i]).is_err())
            .collect();
        let new_nodes: Vec<usize> = kept.iter().map(|&i| el.nodes[i]).collect();
        let new_values = Mat::from_fn(kept.len(), kept.len(), |i, j| el.values[(kept[i], kept[j])]);
        let disconnected: Vec<ElementId> = el
            .neighbors
            .iter()
            .copied()
            .filter(|&nb| !shares_node(&new_nodes, &self.elements[nb].nodes))
            .collect();

        for &nb in &disconnected {
            if Some(nb) != keep {
                self.elements[nb].unlink(id);
            }
        }
        let el = &mut self.elements[id];
        el.nodes = new_nodes;
        el.values = new_values;
        el.neighbors.retain(|nb| !disconnected.contains(nb));
        if el.nodes.is_empty() {
            el.clear();
            true
        } else {
            false
        }
    }

    /// Add the entries of `update` (indexed by the ascending global list `idx`)
    /// that fall inside element `id`'s block, zeroing them in `update`.
    ///
    /// Returns the number of entries taken.
    pub fn absorb(&mut self, id: ElementId, update: &mut Mat<T>, idx: &[usize]) -> usize {
        let el = &mut self.elements[id];
        let common = common_positions(&el.nodes, idx);
        for &(mi, oi) in &common {
            for &(mj, oj) in &common {
                el.values[(mi, mj)] = el.values[(mi, mj)] + update[(oi, oj)];
                update[(oi, oj)] = T::zero();
            }
        }
        common.len() * common.len()
    }

    /// Append a fill-in element without links; returns its id.
    pub(crate) fn push_fill(&mut self, nodes: Vec<usize>, values: Mat<T>) -> ElementId {
        let id = self.elements.len();
        self.elements.push(Element::new(id, nodes, values));
        id
    }

    /// Link two elements in both directions.
    pub(crate) fn link(&mut self, a: ElementId, b: ElementId) {
        self.elements[a].link(b);
        self.elements[b].link(a);
    }

    pub(crate) fn set_status(&mut self, id: ElementId, status: Status) {
        self.elements[id].status = status;
    }

    /// Drop every element with id `>= len` and all links pointing at them.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
        for el in self.elements.iter_mut() {
            el.neighbors.retain(|&nb| nb < len);
        }
    }

    /// Sum all element blocks into a global matrix, optionally renumbering
    /// variable `i` to `ordering[i]`.
    pub fn assemble(&self, ordering: Option<&[usize]>) -> Result<CsrMatrix<T>, ImfError> {
        let n = self.total_vars;
        let map = |i: usize| ordering.map_or(i, |o| o[i]);
        let mut coo = CooMatrix::with_capacity(n, n, self.total_nnz());
        for el in &self.elements {
            for (i, &ni) in el.nodes.iter().enumerate() {
                for (j, &nj) in el.nodes.iter().enumerate() {
                    coo.insert(map(ni), map(nj), el.values[(i, j)]);
                }
            }
        }
        coo.to_csr()
    }
}
