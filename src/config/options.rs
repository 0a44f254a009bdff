//! Options for building and applying the IMF preconditioner.
//!
//! `ImfOptions` collects the construction parameters: the level of fill
//! `maxlofi` deciding when the elimination switches from coalescing the
//! Schur complement into a fill-in element to distributing it over the
//! surviving neighbors, the optional node-status filter of the degree
//! estimate, and which triangular sweeps `apply` performs.

use bitflags::bitflags;

bitflags! {
    /// Sweeps performed when the factorization is applied to a vector.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ImfSweep: u8 {
        const FORWARD  = 0b01; // block-lower solve, levels ascending
        const BACKWARD = 0b10; // block-upper solve, levels descending
        const FULL     = Self::FORWARD.bits() | Self::BACKWARD.bits();
    }
}

impl Default for ImfSweep {
    fn default() -> Self {
        ImfSweep::FULL
    }
}

/// IMF construction & application parameters.
#[derive(Debug, Clone)]
pub struct ImfOptions {
    /// Last pass (counted from 1) that coalesces the Schur complement into a
    /// new fill-in element. Later passes distribute it instead; 0 never coalesces.
    pub maxlofi: usize,

    /// Skip nodes that already hold an ordering position when estimating degrees.
    pub use_node_status: bool,

    /// Sweeps performed by `apply`.
    pub sweep: ImfSweep,
}

impl ImfOptions {
    pub fn new(maxlofi: usize) -> Self {
        Self { maxlofi, ..Self::default() }
    }
    pub fn with_maxlofi(mut self, maxlofi: usize) -> Self {
        self.maxlofi = maxlofi;
        self
    }
    pub fn with_node_status(mut self, flag: bool) -> Self {
        self.use_node_status = flag;
        self
    }
    pub fn with_sweep(mut self, sweep: ImfSweep) -> Self {
        self.sweep = sweep;
        self
    }
}

impl Default for ImfOptions {
    fn default() -> Self {
        Self { maxlofi: 0, use_node_status: false, sweep: ImfSweep::FULL }
    }
}
