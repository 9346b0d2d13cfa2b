#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;

#[macro_use]
mod anyraster_macros;

mod anyraster;
mod cell;
mod celltype;
mod denseraster;
mod error;
mod nodata;
mod rasternum;
mod rastersize;

#[doc(inline)]
pub use anyraster::AnyRaster;
pub use cell::{Cell, CellIterator};
pub use celltype::CellType;
pub use denseraster::DenseRaster;
#[doc(inline)]
pub use error::Error;
pub use nodata::Nodata;
pub use rasternum::RasterNum;
pub use rastersize::{Columns, RasterSize, Rows};
