//! Untiled raster collections.

use log::debug;

use crate::{
    BoundaryStrategy, Bounds, Crs, Error, Extent, LayerMetadata, MetadataOptions, ProjectedExtent, Reclassification,
    ResampleMethod, Result, SourceKey, TemporalProjectedExtent, TiledRasterLayer, layout,
    reclassify::reclassify_raster, tiling,
};
use crate::keys::TileKey;
use raster::{AnyRaster, CellType};

/// A collection of rasters keyed by their projected extent.
///
/// The data has not been tiled yet: record extents overlap freely and do not
/// line up with any grid. Tiling against a negotiated layout turns this into a
/// [`TiledRasterLayer`].
#[derive(Debug, Clone)]
pub struct RasterLayer<K: SourceKey = ProjectedExtent> {
    records: Vec<(K, AnyRaster)>,
}

pub type TemporalRasterLayer = RasterLayer<TemporalProjectedExtent>;

struct CollectionStats {
    extent: Extent,
    cell_type: CellType,
    cell_size: (f64, f64),
    crs: Crs,
}

impl<K: SourceKey> RasterLayer<K> {
    pub fn from_records(records: Vec<(K, AnyRaster)>) -> Result<Self> {
        for (key, raster) in &records {
            if raster.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "record at {} contains an empty raster",
                    key.extent()
                )));
            }

            if key.extent().is_empty() {
                return Err(Error::InvalidArgument(format!("record has an empty extent {}", key.extent())));
            }
        }

        Ok(RasterLayer { records })
    }

    pub fn records(&self) -> &[(K, AnyRaster)] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One pass over the collection: the union extent, the promoted cell type
    /// and the finest cell size.
    fn stats(&self, crs_override: Option<&Crs>) -> Result<CollectionStats> {
        let Some((first, rest)) = self.records.split_first() else {
            return Err(Error::InvalidArgument("the layer contains no records".to_string()));
        };

        let (first_key, first_raster) = first;
        let mut extent = *first_key.extent();
        let mut cell_type = first_raster.cell_type();
        let mut cell_width = first_key.extent().width() / first_raster.columns().count() as f64;
        let mut cell_height = first_key.extent().height() / first_raster.rows().count() as f64;

        for (key, raster) in rest {
            if crs_override.is_none() && key.crs() != first_key.crs() {
                return Err(Error::InvalidArgument(format!(
                    "records have mixed coordinate reference systems: '{}' and '{}'",
                    first_key.crs(),
                    key.crs()
                )));
            }

            extent = extent.combine(key.extent());
            cell_type = cell_type.union(raster.cell_type());
            cell_width = cell_width.min(key.extent().width() / raster.columns().count() as f64);
            cell_height = cell_height.min(key.extent().height() / raster.rows().count() as f64);
        }

        Ok(CollectionStats {
            extent,
            cell_type,
            cell_size: (cell_width, cell_height),
            crs: crs_override.cloned().unwrap_or_else(|| first_key.crs().clone()),
        })
    }

    pub(crate) fn resolved_metadata(&self, options: &MetadataOptions) -> Result<(LayerMetadata<K::Tiled>, Option<i32>)> {
        let stats = self.stats(options.crs.as_ref())?;
        let resolved = layout::resolve(
            options.extent,
            options.layout,
            options.scheme,
            &stats.extent,
            stats.cell_size,
            &stats.crs,
        )?;

        let (min_spatial, max_spatial) = resolved
            .definition
            .key_bounds_for_extent(&stats.extent)
            .ok_or_else(|| Error::InvalidArgument("the collection does not intersect the layout grid".to_string()))?;

        let mut bounds = Bounds::new(
            self.records[0].0.tile_key(min_spatial),
            self.records[0].0.tile_key(max_spatial),
        );
        for (key, _) in &self.records[1..] {
            bounds = Bounds::new(
                bounds.min_key.combine_min(key.tile_key(min_spatial)),
                bounds.max_key.combine_max(key.tile_key(max_spatial)),
            );
        }

        debug!("Resolved layout {} (zoom: {:?})", resolved.definition, resolved.zoom);

        let metadata = LayerMetadata {
            cell_type: stats.cell_type,
            extent: options.extent.unwrap_or(stats.extent),
            crs: stats.crs,
            bounds,
            layout_definition: resolved.definition,
        };

        Ok((metadata, resolved.zoom))
    }

    /// Scans the collection and produces the layer metadata describing the
    /// contained rasters under the requested layout.
    pub fn collect_metadata(&self, options: &MetadataOptions) -> Result<LayerMetadata<K::Tiled>> {
        Ok(self.resolved_metadata(options)?.0)
    }

    /// Cut tiles to the layout recorded in the metadata. Overlapping records
    /// produce duplicate keys, no merging takes place.
    pub fn cut_tiles(&self, metadata: &LayerMetadata<K::Tiled>, method: ResampleMethod) -> Result<TiledRasterLayer<K::Tiled>> {
        let records = tiling::cut_records(&self.records, metadata, method)?;
        Ok(TiledRasterLayer::from_parts(records, metadata.clone(), None))
    }

    /// Cut tiles to the layout recorded in the metadata and merge overlapping
    /// tiles. The result has unique keys.
    pub fn tile_to_layout(
        &self,
        metadata: &LayerMetadata<K::Tiled>,
        method: ResampleMethod,
    ) -> Result<TiledRasterLayer<K::Tiled>> {
        let records = tiling::merge_records(tiling::cut_records(&self.records, metadata, method)?)?;
        Ok(TiledRasterLayer::from_parts(records, metadata.clone(), None))
    }

    /// Metadata collection and tiling in one step.
    pub fn to_tiled_layer(&self, options: &MetadataOptions, method: ResampleMethod) -> Result<TiledRasterLayer<K::Tiled>> {
        let (metadata, zoom) = self.resolved_metadata(options)?;
        let records = tiling::merge_records(tiling::cut_records(&self.records, &metadata, method)?)?;
        Ok(TiledRasterLayer::from_parts(records, metadata, zoom))
    }

    /// Converts the raster values to a new cell type.
    pub fn convert_cell_type(&self, cell_type: CellType) -> Self {
        RasterLayer {
            records: self
                .records
                .iter()
                .map(|(key, raster)| (key.clone(), raster.convert(cell_type)))
                .collect(),
        }
    }

    /// Changes the cell values based on how the value range is broken up.
    pub fn reclassify(&self, reclassification: &Reclassification, strategy: BoundaryStrategy) -> Self {
        RasterLayer {
            records: self
                .records
                .iter()
                .map(|(key, raster)| (key.clone(), reclassify_raster(raster, reclassification, strategy)))
                .collect(),
        }
    }

    /// The minimum and maximum value over all records.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|(_, raster)| raster.min_max())
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }
}
