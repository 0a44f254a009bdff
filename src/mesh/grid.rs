//! Structured quadrilateral meshes for tests and benchmarks.

use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::mesh::structure::ElementStructure;
use faer::Mat;

/// `nx × ny` bilinear quads on an `(nx+1) × (ny+1)` node lattice.
///
/// Node `(i, j)` is numbered `j * (nx + 1) + i`. Each element lists its nodes
/// as `[(i,j), (i+1,j), (i,j+1), (i+1,j+1)]` and gets the block returned by
/// `block(element_index, nodes)`, elements numbered row by row.
pub fn quad_grid<T, F>(nx: usize, ny: usize, mut block: F) -> Result<ElementStructure<T>, ImfError>
where
    T: Scalar,
    F: FnMut(usize, &[usize]) -> Mat<T>,
{
    let node = |i: usize, j: usize| j * (nx + 1) + i;
    let mut blocks = Vec::with_capacity(nx * ny);
    for ey in 0..ny {
        for ex in 0..nx {
            let nodes = vec![node(ex, ey), node(ex + 1, ey), node(ex, ey + 1), node(ex + 1, ey + 1)];
            let values = block(ey * nx + ex, &nodes);
            blocks.push((nodes, values));
        }
    }
    let total_vars = if nx * ny == 0 { 0 } else { (nx + 1) * (ny + 1) };
    ElementStructure::from_elements(total_vars, blocks)
}

/// Bilinear Laplace stiffness of a unit square in `quad_grid` node order.
pub fn q1_laplace() -> Mat<f64> {
    Mat::from_fn(4, 4, |i, j| {
        if i == j {
            4.0 / 6.0
        } else if i + j == 3 {
            // diagonally opposite corners
            -2.0 / 6.0
        } else {
            -1.0 / 6.0
        }
    })
}
