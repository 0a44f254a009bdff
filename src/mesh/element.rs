//! A generalized element: a sorted set of global variables plus the dense
//! block coupling them.

use crate::core::traits::Scalar;
use faer::Mat;

/// Stable arena index of an element inside an `ElementStructure`.
pub type ElementId = usize;

/// Role of an element during the current elimination pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Unmarked,
    /// Selected as a diagonal block; eliminated.
    Diagonal,
    /// Within two hops of a diagonal block of the current pass.
    MarkedCurrent,
    /// Consumed by an elimination; holds no variables any more.
    Removed,
    /// Survived a pass without being eliminated.
    NonDiagonal,
}

#[derive(Clone, Debug)]
pub struct Element<T> {
    pub(crate) id: ElementId,
    pub(crate) nodes: Vec<usize>,
    pub(crate) values: Mat<T>,
    pub(crate) neighbors: Vec<ElementId>,
    pub(crate) status: Status,
}

impl<T: Scalar> Element<T> {
    /// Create an element, sorting `nodes` ascending and permuting `values` to match.
    ///
    /// Panics if `values` is not `nodes.len() × nodes.len()`.
    pub fn new(id: ElementId, nodes: Vec<usize>, values: Mat<T>) -> Self {
        let n = nodes.len();
        assert_eq!(values.nrows(), values.ncols(), "element block must be square");
        assert_eq!(values.nrows(), n, "element block size must match its node count");

        let mut perm: Vec<usize> = (0..n).collect();
        perm.sort_by_key(|&k| nodes[k]);
        let sorted_nodes = perm.iter().map(|&k| nodes[k]).collect();
        let sorted_values = Mat::from_fn(n, n, |i, j| values[(perm[i], perm[j])]);
        Self {
            id,
            nodes: sorted_nodes,
            values: sorted_values,
            neighbors: Vec::new(),
            status: Status::Unmarked,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }
    /// Global variable indices, ascending.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }
    pub fn values(&self) -> &Mat<T> {
        &self.values
    }
    /// Ids of elements sharing at least one node, ascending.
    pub fn neighbors(&self) -> &[ElementId] {
        &self.neighbors
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn size(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of stored block entries.
    pub fn nnz(&self) -> usize {
        self.size() * self.size()
    }

    /// Local position of a global node.
    pub fn position(&self, node: usize) -> Option<usize> {
        self.nodes.binary_search(&node).ok()
    }

    /// Drop all variables, values and links.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.values = Mat::zeros(0, 0);
        self.neighbors.clear();
    }

    pub(crate) fn link(&mut self, other: ElementId) {
        if let Err(pos) = self.neighbors.binary_search(&other) {
            self.neighbors.insert(pos, other);
        }
    }

    pub(crate) fn unlink(&mut self, other: ElementId) {
        if let Ok(pos) = self.neighbors.binary_search(&other) {
            self.neighbors.remove(pos);
        }
    }
}

/// Whether two ascending index lists have an entry in common.
pub(crate) fn shares_node(a: &[usize], b: &[usize]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}

/// Position pairs `(ia, ib)` with `a[ia] == b[ib]` for two ascending lists.
pub(crate) fn common_positions(a: &[usize], b: &[usize]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((i, j));
                i += 1;
                j += 1;
            }
        }
    }
    out
}
