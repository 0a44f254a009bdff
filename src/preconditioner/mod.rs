//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait and the incomplete multifrontal (IMF) factorization.

use crate::error::ImfError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), ImfError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), ImfError> {
        Ok(())
    }
}

pub mod imf;

pub use imf::{Imf, ImfLevel};
