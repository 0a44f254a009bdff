//! Scenario tests for the IMF factorization.
//!
//! Covers the isolated element, two elements sharing one node, exactness of
//! the always-coalescing factorization on small grids, the drop branch, sweep
//! selection, both construction modes and the element-matrix file round trip.

use approx::assert_abs_diff_eq;
use faer::Mat;
use imf::matrix::dense::{block_matvec, invert};
use imf::mesh::{ElementStructure, Status, q1_laplace, quad_grid, read_element_matrix, write_element_matrix};
use imf::{Imf, ImfError, ImfOptions, ImfSweep};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn element_block(e: usize, _: &[usize]) -> Mat<f64> {
    let k = q1_laplace();
    let shift = 1.0 + 0.1 * (e % 3) as f64;
    Mat::from_fn(4, 4, |i, j| {
        k[(i, j)]
            + if i == j {
                shift
            } else if i < j {
                0.1
            } else {
                -0.05
            }
    })
}

/// Reference solution through a dense inverse of the assembled matrix.
fn dense_solve(mesh: &ElementStructure<f64>, b: &[f64]) -> Vec<f64> {
    let a = mesh.assemble(None).unwrap().to_dense();
    let inv = invert(&a).unwrap();
    let mut x = vec![0.0; b.len()];
    block_matvec(&inv, b, &mut x);
    x
}

fn random_rhs(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

#[test]
fn isolated_element() {
    let a = Mat::from_fn(3, 3, |i, j| if i == j { 3.0 } else { 0.5 * (i as f64 - j as f64) + 0.25 });
    let mesh = ElementStructure::from_elements(3, vec![(vec![0, 1, 2], a.clone())]).unwrap();
    let imf = Imf::new(&mesh, &ImfOptions::default()).unwrap();
    assert_eq!(imf.levels(), 1);
    assert_eq!(imf.lower_nnz(), 0);
    assert_eq!(imf.upper_nnz(), 0);

    let expected = invert(&a).unwrap();
    let d = &imf.diagonal_blocks()[0];
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!(d[(i, j)], expected[(i, j)], epsilon = 1e-14);
        }
    }
    let b = [1.0, -2.0, 0.5];
    let x = imf.solve(&b).unwrap();
    let reference = dense_solve(&mesh, &b);
    for i in 0..3 {
        assert_abs_diff_eq!(x[i], reference[i], epsilon = 1e-13);
    }
}

#[test]
fn whole_grid_as_one_element() {
    // the assembled 3×3 grid (16 variables) as the pivot of a single element
    let grid = quad_grid(3, 3, element_block).unwrap();
    let a = grid.assemble(None).unwrap().to_dense();
    let mesh = ElementStructure::from_elements(16, vec![((0..16).collect(), a)]).unwrap();
    let imf = Imf::new(&mesh, &ImfOptions::default()).unwrap();
    assert_eq!(imf.levels(), 1);

    let b = random_rhs(16, 29);
    let x = imf.solve(&b).unwrap();
    let reference = dense_solve(&grid, &b);
    for i in 0..16 {
        assert_abs_diff_eq!(x[i], reference[i], epsilon = 1e-12);
    }
}

#[test]
fn two_elements_sharing_one_node() {
    let a = Mat::from_fn(2, 2, |i, j| if i == j { 2.0 } else { -1.0 });
    let b = Mat::from_fn(2, 2, |i, j| if i == j { 3.0 } else { -0.5 - i as f64 });
    let mesh = ElementStructure::from_elements(3, vec![(vec![0, 1], a), (vec![1, 2], b)]).unwrap();

    for maxlofi in [0, 1] {
        let imf = Imf::new(&mesh, &ImfOptions::new(maxlofi)).unwrap();
        // the lower id wins the tie; its neighbor waits for the next pass
        assert_eq!(imf.levels(), 2);
        assert_eq!(imf.ordering(), &[0, 1, 2]);
        assert_eq!(imf.diagonal_offsets(), &[0, 2, 3, 3]);
        // one coupling through the shared node in each factor
        assert_eq!(imf.lower_nnz(), 1);
        assert_eq!(imf.upper_nnz(), 1);
        assert_eq!(imf.lower(0).get(2, 1), -1.5);
        assert_eq!(imf.upper(0).get(1, 2), -0.5);

        // nothing is dropped, so the factorization is exact
        let rhs = [1.0, 2.0, 3.0];
        let x = imf.solve(&rhs).unwrap();
        let reference = dense_solve(&mesh, &rhs);
        for i in 0..3 {
            assert_abs_diff_eq!(x[i], reference[i], epsilon = 1e-13);
        }
    }
}

#[test]
fn coalescing_everything_is_exact() {
    for (nx, ny) in [(2, 2), (3, 3), (4, 2)] {
        let mesh = quad_grid(nx, ny, element_block).unwrap();
        let imf = Imf::new(&mesh, &ImfOptions::new(usize::MAX)).unwrap();
        let b = random_rhs(mesh.total_vars(), 11);
        let x = imf.solve(&b).unwrap();
        let reference = dense_solve(&mesh, &b);
        for i in 0..b.len() {
            assert_abs_diff_eq!(x[i], reference[i], epsilon = 1e-10);
        }
    }
}

#[test]
fn distribution_is_approximate_but_close() {
    let mesh = quad_grid(4, 4, element_block).unwrap();
    let b = random_rhs(mesh.total_vars(), 3);
    let reference = dense_solve(&mesh, &b);
    let imf = Imf::new(&mesh, &ImfOptions::new(0)).unwrap();
    let x = imf.solve(&b).unwrap();
    let err: f64 = x.iter().zip(&reference).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt();
    let norm: f64 = reference.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert!(err / norm < 0.5, "relative error {}", err / norm);
}

#[test]
fn fully_covered_neighbor_is_dropped() {
    let a = Mat::from_fn(2, 2, |i, j| if i == j { 2.0 } else { 1.0 });
    let b = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.5 });
    let mut mesh = ElementStructure::from_elements(2, vec![(vec![0, 1], a.clone()), (vec![1, 0], b.clone())]).unwrap();
    let imf = Imf::factor_in_place(&mut mesh, &ImfOptions::default()).unwrap();

    assert_eq!(imf.levels(), 1);
    assert_eq!(mesh.element(0).status(), Status::Diagonal);
    let dropped = mesh.element(1);
    assert_eq!(dropped.status(), Status::Removed);
    assert!(dropped.is_empty());
    assert!(dropped.neighbors().is_empty());

    let sum = Mat::from_fn(2, 2, |i, j| a[(i, j)] + b[(i, j)]);
    let expected = invert(&sum).unwrap();
    for i in 0..2 {
        for j in 0..2 {
            assert_abs_diff_eq!(imf.diagonal_blocks()[0][(i, j)], expected[(i, j)], epsilon = 1e-14);
            // the diagonal element keeps its inverted pivot
            assert_abs_diff_eq!(mesh.element(0).values()[(i, j)], expected[(i, j)], epsilon = 1e-14);
        }
    }
}

#[test]
fn full_sweep_is_backward_after_unscaled_forward() {
    let mesh = quad_grid(3, 3, element_block).unwrap();
    let n = mesh.total_vars();
    let mut imf = Imf::new(&mesh, &ImfOptions::new(1)).unwrap();
    let r = random_rhs(n, 5);
    let full = imf.apply_permuted(&r).unwrap();

    imf.set_sweep(ImfSweep::FORWARD);
    let scaled = imf.apply_permuted(&r).unwrap();
    // undo the final block scaling of the forward-only sweep
    let mut unscaled = vec![0.0; n];
    let mut start = 0;
    for block in imf.diagonal_blocks() {
        let end = start + block.nrows();
        let pivot = invert(block).unwrap();
        block_matvec(&pivot, &scaled[start..end], &mut unscaled[start..end]);
        start = end;
    }

    imf.set_sweep(ImfSweep::BACKWARD);
    let composed = imf.apply_permuted(&unscaled).unwrap();
    for i in 0..n {
        assert_abs_diff_eq!(full[i], composed[i], epsilon = 1e-10);
    }

    imf.set_sweep(ImfSweep::empty());
    assert_eq!(imf.apply_permuted(&r).unwrap(), r);
}

#[test]
fn construction_modes_agree() {
    let mesh = quad_grid(4, 4, element_block).unwrap();
    let opts = ImfOptions::new(1);
    let copy = Imf::new(&mesh, &opts).unwrap();
    // the copying constructor leaves the caller's structure untouched
    assert!(mesh.elements().all(|el| el.size() == 4 && el.status() == Status::Unmarked));

    let mut consumed = mesh.clone();
    let in_place = Imf::factor_in_place(&mut consumed, &opts).unwrap();
    assert_eq!(consumed.total_elements(), mesh.total_elements());
    assert_eq!(copy.ordering(), in_place.ordering());
    assert_eq!(copy.diagonal_offsets(), in_place.diagonal_offsets());

    let b = random_rhs(mesh.total_vars(), 17);
    let (x1, x2) = (copy.solve(&b).unwrap(), in_place.solve(&b).unwrap());
    assert_eq!(x1, x2);
}

#[test]
fn wrong_vector_length() {
    let mesh = quad_grid(2, 1, element_block).unwrap();
    let imf = Imf::new(&mesh, &ImfOptions::default()).unwrap();
    let err = imf.solve(&[1.0; 4]).unwrap_err();
    assert!(matches!(err, ImfError::DimensionMismatch { expected: 6, found: 4 }));
}

#[test]
fn permuted_assembly_matches_ordering() {
    let mesh = quad_grid(3, 2, element_block).unwrap();
    let imf = Imf::new(&mesh, &ImfOptions::new(2)).unwrap();
    let a = mesh.assemble(None).unwrap();
    let p = mesh.assemble(Some(imf.ordering())).unwrap();
    let o = imf.ordering();
    for i in 0..mesh.total_vars() {
        for j in 0..mesh.total_vars() {
            assert_eq!(p.get(o[i], o[j]), a.get(i, j));
        }
    }
}

#[test]
fn file_round_trip_gives_same_factorization() {
    let mesh = quad_grid(3, 3, element_block).unwrap();
    let mut buf = Vec::new();
    write_element_matrix(&mesh, &mut buf).unwrap();
    let reread = read_element_matrix::<f64, _>(buf.as_slice()).unwrap();
    assert_eq!(reread.total_vars(), mesh.total_vars());

    let opts = ImfOptions::new(1);
    let b = random_rhs(mesh.total_vars(), 23);
    let x1 = Imf::new(&mesh, &opts).unwrap().solve(&b).unwrap();
    let x2 = Imf::new(&reread, &opts).unwrap().solve(&b).unwrap();
    assert_eq!(x1, x2);
}
