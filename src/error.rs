use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected before any trial runs; no partial table is produced.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Internal state that should be unreachable. Aborts the run.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
