use thiserror::Error;

use crate::{CellType, RasterSize};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Raster dimensions do not match {size1} <-> {size2}")]
    SizeMismatch { size1: RasterSize, size2: RasterSize },
    #[error("Cell type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: CellType, actual: CellType },
}
