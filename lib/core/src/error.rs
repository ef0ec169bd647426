use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Entity id {id} out of range for {len} entities")]
    OutOfRange { id: usize, len: usize },

    #[error("Catalog has {catalog} entities but feature matrix has {matrix} rows")]
    DimensionMismatch { catalog: usize, matrix: usize },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
