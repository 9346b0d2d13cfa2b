//! Layer metadata: the contract a collection of rasters has to satisfy to
//! become a tiled layer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Crs, Extent, LayoutDefinition, LayoutScheme, Result, SpatialKey, TileKey, TileLayout};
use raster::{CellType, RasterSize};

/// The minimum and maximum key actually populated in a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds<K> {
    pub min_key: K,
    pub max_key: K,
}

impl<K: TileKey> Bounds<K> {
    pub fn new(min_key: K, max_key: K) -> Self {
        Bounds { min_key, max_key }
    }

    pub fn contains_spatial(&self, key: SpatialKey) -> bool {
        let min = self.min_key.spatial();
        let max = self.max_key.spatial();

        key.col >= min.col && key.col <= max.col && key.row >= min.row && key.row <= max.row
    }
}

/// Describes a tiled layer: the grid it is tiled against, the coordinate
/// reference system, the cell type, the extent of the data and the range of
/// keys actually populated.
///
/// Computed once from an untiled collection and immutable afterwards, every
/// tiled layer owns exactly one metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMetadata<K = SpatialKey> {
    pub cell_type: CellType,
    pub extent: Extent,
    pub crs: Crs,
    pub bounds: Bounds<K>,
    pub layout_definition: LayoutDefinition,
}

impl<K: TileKey> LayerMetadata<K> {
    pub fn tile_size(&self) -> RasterSize {
        self.layout_definition.tile_layout.tile_size()
    }

    pub fn to_json(&self) -> Result<String>
    where
        K: Serialize,
    {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self>
    where
        K: DeserializeOwned,
    {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for metadata collection.
///
/// `extent` and `layout` are only valid together, when both are absent the
/// scheme derives the grid. A supplied crs overrides the crs recorded on the
/// records for layout computation, no reprojection is implied.
#[derive(Debug, Clone, Default)]
pub struct MetadataOptions {
    pub extent: Option<Extent>,
    pub layout: Option<TileLayout>,
    pub crs: Option<Crs>,
    pub scheme: LayoutScheme,
}

impl MetadataOptions {
    pub fn with_scheme(scheme: LayoutScheme) -> Self {
        MetadataOptions {
            scheme,
            ..Default::default()
        }
    }

    pub fn with_layout(extent: Extent, layout: TileLayout) -> Self {
        MetadataOptions {
            extent: Some(extent),
            layout: Some(layout),
            ..Default::default()
        }
    }
}
