use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Ambiguous specification: {0}")]
    AmbiguousSpecification(String),
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Raster(#[from] raster::Error),
}
