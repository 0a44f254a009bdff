//! Matrix module: dense block helpers and sparse matrix types.

pub mod dense;
pub mod sparse;
pub use sparse::{CooMatrix, CsrMatrix, SparseMatrix};
