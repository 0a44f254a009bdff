//! Core traits and their implementations for faer types and vectors.

pub mod traits;
pub mod wrappers;

pub use traits::{Indexing, InnerProduct, MatVec, Scalar};
