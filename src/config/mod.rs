//! Configuration for the IMF preconditioner.

pub mod options;
pub use options::{ImfOptions, ImfSweep};
