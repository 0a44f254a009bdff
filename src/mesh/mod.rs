//! Element graph: generalized elements, their arena, mesh generators and file I/O.

pub mod element;
pub mod grid;
pub mod io;
pub mod structure;

pub use element::{Element, ElementId, Status};
pub use grid::{q1_laplace, quad_grid};
pub use io::{read_element_matrix, write_element_matrix};
pub use structure::ElementStructure;
