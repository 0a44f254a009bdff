use thiserror::Error;

// Unified error type for imf

#[derive(Error, Debug)]
pub enum ImfError {
    #[error("invalid element structure: {0}")]
    InvalidMesh(String),
    #[error("invalid sparse matrix: {0}")]
    InvalidMatrix(String),
    #[error("singular diagonal block in element {element} at level {level}")]
    SingularBlock { element: usize, level: usize },
    #[error("elimination stalled at level {level} with {remaining} variables left")]
    Stalled { level: usize, remaining: usize },
    #[error("dimension mismatch: expected a vector of length {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("solve error: {0}")]
    SolveError(String),
}
