//! Selection priority of a candidate diagonal element.
//!
//! The estimate approximates the size of the Schur complement an element
//! would produce: the number of distinct nodes touched by its neighbors, less
//! the element's own size. Smaller is better.

use crate::core::traits::Scalar;
use crate::mesh::{ElementId, ElementStructure};

/// Minimum-connected-nodes estimate of element `id`.
///
/// With `numbered`, nodes that already hold an ordering position are not
/// counted.
pub(crate) fn estimate<T: Scalar>(
    mesh: &ElementStructure<T>,
    id: ElementId,
    numbered: Option<&[bool]>,
) -> isize {
    let el = mesh.element(id);
    let mut nodes: Vec<usize> = el
        .neighbors()
        .iter()
        .flat_map(|&nb| mesh.element(nb).nodes().iter().copied())
        .collect();
    nodes.sort_unstable();

    let mut degree = 1 - el.size() as isize;
    for w in nodes.windows(2) {
        if w[0] != w[1] && numbered.is_none_or(|taken| !taken[w[1]]) {
            degree += 1;
        }
    }
    degree
}
