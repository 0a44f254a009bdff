//! Core linear-algebra traits for imf.

use faer::traits::RealField;
use num_traits::Float;
use std::fmt::Debug;

/// Real scalar usable for element blocks, factors and vectors.
pub trait Scalar: Float + RealField + Debug + Send + Sync + 'static {}

impl<T> Scalar for T where T: Float + RealField + Debug + Send + Sync + 'static {}

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Uniform indexing into vectors (dense or sparse).
pub trait Indexing {
    /// Number of rows (or length for a vector).
    fn nrows(&self) -> usize;
}
