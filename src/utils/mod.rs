//! Utility modules: convergence checks and permutations.

pub mod convergence;
pub mod permutation;

pub use convergence::{Convergence, SolveStats};
pub use permutation::{is_permutation, permute, unpermute};
