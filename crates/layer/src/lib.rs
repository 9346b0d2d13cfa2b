#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;
pub type Point<T = f64> = geo_types::Point<T>;

pub mod crs;
mod error;
mod extent;
mod keys;
mod layout;
mod metadata;
mod rasterlayer;
mod reclassify;
mod resample;
mod tiledlayer;
mod tiling;

pub use crs::Crs;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use extent::Extent;
pub use keys::{ProjectedExtent, SourceKey, SpaceTimeKey, SpatialKey, TemporalProjectedExtent, TileKey, TimeInstant};
pub use layout::{LayoutDefinition, LayoutScheme, TileLayout};
pub use metadata::{Bounds, LayerMetadata, MetadataOptions};
pub use rasterlayer::{RasterLayer, TemporalRasterLayer};
pub use reclassify::{BoundaryStrategy, Reclassification, ValueMap};
pub use resample::ResampleMethod;
pub use tiledlayer::{TemporalTiledRasterLayer, TiledRasterLayer};

// the value types that show up in the layer api
pub use raster::{AnyRaster, Cell, CellType, Columns, DenseRaster, RasterSize, Rows};
