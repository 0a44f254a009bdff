//! imf: incomplete multifrontal preconditioning over Faer
//!
//! This crate factors element-structured sparse systems directly on their
//! element graph, without assembling a global matrix first, and applies the
//! resulting block-triangular factorization as a preconditioner for Krylov
//! solvers.

pub mod config;
pub mod core;
pub mod error;
pub mod matrix;
pub mod mesh;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use self::core::*;
pub use error::*;
pub use matrix::*;
pub use mesh::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
