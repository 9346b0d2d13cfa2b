//! Tiled raster layers.

use std::collections::BTreeMap;

use crate::{
    BoundaryStrategy, Bounds, Error, LayerMetadata, LayoutDefinition, Reclassification, ResampleMethod, Result,
    SpaceTimeKey, SpatialKey, TileKey, TileLayout, reclassify::reclassify_raster, tiling,
};
use raster::{AnyRaster, CellType, Columns, RasterSize, Rows};

/// A collection of rasters tiled against a layout, keyed by their grid
/// coordinate.
///
/// Owns exactly one [`LayerMetadata`] for its lifetime; every operation
/// produces a new layer instead of mutating in place.
#[derive(Debug, Clone)]
pub struct TiledRasterLayer<K: TileKey = SpatialKey> {
    records: Vec<(K, AnyRaster)>,
    metadata: LayerMetadata<K>,
    zoom: Option<i32>,
}

pub type TemporalTiledRasterLayer = TiledRasterLayer<SpaceTimeKey>;

macro_rules! impl_local_op {
    ($name:ident, $scalar_name:ident, $tile_op:ident, $tile_scalar_op:ident) => {
        /// Cell wise arithmetic with another layer over matching keys.
        /// Both layers have to share the same layout, cell types are promoted.
        pub fn $name(&self, other: &Self) -> Result<Self> {
            self.check_layout_compatibility(other)?;

            let rhs: BTreeMap<K, &AnyRaster> = other.records.iter().map(|(key, tile)| (*key, tile)).collect();

            let mut records = Vec::new();
            for (key, tile) in &self.records {
                if let Some(other_tile) = rhs.get(key) {
                    records.push((*key, tile.$tile_op(other_tile)?));
                }
            }

            let mut metadata = self.metadata.clone();
            metadata.cell_type = self.metadata.cell_type.union(other.metadata.cell_type);

            Ok(TiledRasterLayer {
                records,
                metadata,
                zoom: if self.zoom == other.zoom { self.zoom } else { None },
            })
        }

        /// Cell wise arithmetic with a constant operand.
        pub fn $scalar_name(&self, value: f64) -> Self {
            TiledRasterLayer {
                records: self
                    .records
                    .iter()
                    .map(|(key, tile)| (*key, tile.$tile_scalar_op(value)))
                    .collect(),
                metadata: self.metadata.clone(),
                zoom: self.zoom,
            }
        }
    };
}

impl<K: TileKey> TiledRasterLayer<K> {
    /// Creates a tiled layer from pre-tiled records. Every tile has to match
    /// the pixel dimensions of the layout and the cell type of the metadata.
    pub fn from_records(records: Vec<(K, AnyRaster)>, metadata: LayerMetadata<K>, zoom: Option<i32>) -> Result<Self> {
        let tile_size = metadata.tile_size();
        for (key, raster) in &records {
            if raster.size() != tile_size {
                return Err(Error::InvalidArgument(format!(
                    "tile at {key:?} has size {} instead of the layout tile size {}",
                    raster.size(),
                    tile_size
                )));
            }

            if raster.cell_type() != metadata.cell_type {
                return Err(Error::InvalidArgument(format!(
                    "tile at {key:?} has cell type {} instead of the layer cell type {}",
                    raster.cell_type(),
                    metadata.cell_type
                )));
            }
        }

        Ok(Self::from_parts(records, metadata, zoom))
    }

    pub(crate) fn from_parts(records: Vec<(K, AnyRaster)>, metadata: LayerMetadata<K>, zoom: Option<i32>) -> Self {
        TiledRasterLayer { records, metadata, zoom }
    }

    pub fn records(&self) -> &[(K, AnyRaster)] {
        &self.records
    }

    pub fn metadata(&self) -> &LayerMetadata<K> {
        &self.metadata
    }

    /// The zoom level of the layer, only present when the layer was tiled
    /// against a global layout or produced by pyramiding.
    pub fn zoom_level(&self) -> Option<i32> {
        self.zoom
    }

    pub fn cell_type(&self) -> CellType {
        self.metadata.cell_type
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cut tiles to a new layout and merge overlapping tiles, re-gridding the
    /// layer. The result has unique keys.
    pub fn tile_to_layout(&self, layout: &LayoutDefinition, method: ResampleMethod) -> Result<Self> {
        let Some((first, rest)) = self.records.split_first() else {
            return Err(Error::InvalidArgument("the layer contains no tiles".to_string()));
        };

        let (min_spatial, max_spatial) = layout
            .key_bounds_for_extent(&self.metadata.extent)
            .ok_or_else(|| Error::InvalidArgument("the layer does not intersect the layout grid".to_string()))?;

        let mut bounds = Bounds::new(first.0.with_spatial(min_spatial), first.0.with_spatial(max_spatial));
        for (key, _) in rest {
            bounds = Bounds::new(
                bounds.min_key.combine_min(key.with_spatial(min_spatial)),
                bounds.max_key.combine_max(key.with_spatial(max_spatial)),
            );
        }

        let metadata = LayerMetadata {
            cell_type: self.metadata.cell_type,
            extent: self.metadata.extent,
            crs: self.metadata.crs.clone(),
            bounds,
            layout_definition: layout.clone(),
        };

        let mut cut = Vec::new();
        for (key, tile) in &self.records {
            let src_extent = self.metadata.layout_definition.tile_extent(key.spatial());
            tiling::cut_source(
                tile,
                &src_extent,
                |spatial| key.with_spatial(spatial),
                metadata.cell_type,
                layout,
                method,
                &mut cut,
            )?;
        }

        Ok(Self::from_parts(tiling::merge_records(cut)?, metadata, None))
    }

    /// Converts the raster values to a new cell type.
    pub fn convert_cell_type(&self, cell_type: CellType) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.cell_type = cell_type;

        TiledRasterLayer {
            records: self
                .records
                .iter()
                .map(|(key, tile)| (*key, tile.convert(cell_type)))
                .collect(),
            metadata,
            zoom: self.zoom,
        }
    }

    /// Changes the cell values based on how the value range is broken up.
    pub fn reclassify(&self, reclassification: &Reclassification, strategy: BoundaryStrategy) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.cell_type = reclassification.result_cell_type();

        TiledRasterLayer {
            records: self
                .records
                .iter()
                .map(|(key, tile)| (*key, reclassify_raster(tile, reclassification, strategy)))
                .collect(),
            metadata,
            zoom: self.zoom,
        }
    }

    /// The minimum and maximum value over all tiles.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|(_, tile)| tile.min_max())
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }

    fn check_layout_compatibility(&self, other: &Self) -> Result {
        if self.metadata.layout_definition != other.metadata.layout_definition {
            return Err(Error::TypeMismatch(format!(
                "layer layouts differ: {} <-> {}",
                self.metadata.layout_definition, other.metadata.layout_definition
            )));
        }

        Ok(())
    }

    impl_local_op!(local_add, local_add_scalar, add, add_scalar);
    impl_local_op!(local_subtract, local_subtract_scalar, sub, sub_scalar);
    impl_local_op!(local_multiply, local_multiply_scalar, mul, mul_scalar);
    impl_local_op!(local_divide, local_divide_scalar, div, div_scalar);
}

fn is_power_of_two(v: i32) -> bool {
    v > 0 && (v & (v - 1)) == 0
}

impl TiledRasterLayer<SpatialKey> {
    /// All tiles stored under the given grid coordinate.
    /// Coordinates outside of the recorded key bounds are rejected.
    pub fn lookup(&self, col: i32, row: i32) -> Result<Vec<AnyRaster>> {
        let min = self.metadata.bounds.min_key;
        let max = self.metadata.bounds.max_key;

        if col < min.col || col > max.col {
            return Err(Error::OutOfBounds(format!(
                "column {col} is outside of the key bounds [{}, {}]",
                min.col, max.col
            )));
        }

        if row < min.row || row > max.row {
            return Err(Error::OutOfBounds(format!(
                "row {row} is outside of the key bounds [{}, {}]",
                min.row, max.row
            )));
        }

        Ok(self
            .records
            .iter()
            .filter(|(key, _)| key.col == col && key.row == row)
            .map(|(_, tile)| tile.clone())
            .collect())
    }

    /// Assembles all tiles within the key bounds into a single raster.
    pub fn stitch(&self) -> Result<AnyRaster> {
        if self.records.is_empty() {
            return Err(Error::InvalidArgument("the layer contains no tiles".to_string()));
        }

        let min = self.metadata.bounds.min_key;
        let max = self.metadata.bounds.max_key;
        let tile_layout = self.metadata.layout_definition.tile_layout;

        let size = RasterSize::with_rows_cols(
            Rows((max.row - min.row + 1) * tile_layout.tile_rows),
            Columns((max.col - min.col + 1) * tile_layout.tile_cols),
        );

        let mut result = AnyRaster::filled_with_nodata(self.metadata.cell_type, size);
        for (key, tile) in &self.records {
            result.merge_at(
                tile,
                (key.row - min.row) * tile_layout.tile_rows,
                (key.col - min.col) * tile_layout.tile_cols,
            )?;
        }

        Ok(result)
    }

    /// Builds a pyramid of layers from `start_zoom` down to `end_zoom` by
    /// successively halving the grid. Requires power of two tile dimensions.
    pub fn pyramid(&self, start_zoom: i32, end_zoom: i32, method: ResampleMethod) -> Result<Vec<Self>> {
        let tile_layout = self.metadata.layout_definition.tile_layout;
        if !is_power_of_two(tile_layout.tile_cols) || !is_power_of_two(tile_layout.tile_rows) {
            return Err(Error::InvalidArgument(
                "tiles must have a col and row count that is a power of two".to_string(),
            ));
        }

        if start_zoom < end_zoom {
            return Err(Error::InvalidArgument(format!(
                "start zoom {start_zoom} must not be smaller than end zoom {end_zoom}"
            )));
        }

        let mut levels = Vec::with_capacity((start_zoom - end_zoom + 1) as usize);
        let mut current = self.clone();
        current.zoom = Some(start_zoom);

        for zoom in (end_zoom..start_zoom).rev() {
            let layout = &current.metadata.layout_definition;
            let next_layout = LayoutDefinition::new(
                layout.extent,
                TileLayout::new(
                    (layout.tile_layout.layout_cols / 2).max(1),
                    (layout.tile_layout.layout_rows / 2).max(1),
                    layout.tile_layout.tile_cols,
                    layout.tile_layout.tile_rows,
                ),
            );

            let mut next = current.tile_to_layout(&next_layout, method)?;
            next.zoom = Some(zoom);
            levels.push(std::mem::replace(&mut current, next));
        }

        levels.push(current);
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Crs, Extent};
    use raster::DenseRaster;

    fn metadata(tile_layout: TileLayout) -> LayerMetadata<SpatialKey> {
        LayerMetadata {
            cell_type: CellType::Float32,
            extent: Extent::new(0.0, 0.0, 10.0, 6.0),
            crs: Crs::from_epsg(crate::crs::WGS84),
            bounds: Bounds::new(SpatialKey::new(0, 0), SpatialKey::new(1, 1)),
            layout_definition: LayoutDefinition::new(Extent::new(0.0, -4.0, 10.0, 6.0), tile_layout),
        }
    }

    fn layer_with_value(value: f32) -> TiledRasterLayer<SpatialKey> {
        let tile = || AnyRaster::from(DenseRaster::filled_with(value, RasterSize::square(5)));

        TiledRasterLayer::from_records(
            vec![
                (SpatialKey::new(0, 0), tile()),
                (SpatialKey::new(1, 0), tile()),
                (SpatialKey::new(0, 1), tile()),
                (SpatialKey::new(1, 1), tile()),
            ],
            metadata(TileLayout::new(2, 2, 5, 5)),
            None,
        )
        .expect("valid tiles")
    }

    #[test]
    fn from_records_validates_tile_dimensions() {
        let result = TiledRasterLayer::from_records(
            vec![(
                SpatialKey::new(0, 0),
                AnyRaster::from(DenseRaster::filled_with(1.0_f32, RasterSize::square(4))),
            )],
            metadata(TileLayout::new(2, 2, 5, 5)),
            None,
        );

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn local_operations_combine_matching_keys() {
        let lhs = layer_with_value(4.0);
        let rhs = layer_with_value(2.0);

        let sum = lhs.local_add(&rhs).expect("same layout");
        assert_eq!(sum.len(), 4);
        assert_eq!(sum.min_max(), Some((6.0, 6.0)));

        let quotient = lhs.local_divide(&rhs).expect("same layout");
        assert_eq!(quotient.min_max(), Some((2.0, 2.0)));

        let scaled = lhs.local_multiply_scalar(3.0);
        assert_eq!(scaled.min_max(), Some((12.0, 12.0)));
    }

    #[test]
    fn combining_layers_with_different_layouts_fails() {
        let lhs = layer_with_value(1.0);

        let rhs = TiledRasterLayer::from_records(
            vec![(
                SpatialKey::new(0, 0),
                AnyRaster::from(DenseRaster::filled_with(1.0_f32, RasterSize::square(10))),
            )],
            metadata(TileLayout::new(1, 1, 10, 10)),
            None,
        )
        .expect("valid tiles");

        assert!(matches!(lhs.local_add(&rhs), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn local_operations_promote_cell_types() {
        let lhs = layer_with_value(4.0).convert_cell_type(CellType::Int16);
        let rhs = layer_with_value(2.0).convert_cell_type(CellType::Uint8);

        let sum = lhs.local_add(&rhs).expect("same layout");
        assert_eq!(sum.cell_type(), CellType::Int16);
    }

    #[test]
    fn lookup_is_bounds_checked() {
        let layer = layer_with_value(1.0);

        assert_eq!(layer.lookup(1, 1).expect("inside the bounds").len(), 1);
        assert!(matches!(layer.lookup(2, 0), Err(Error::OutOfBounds(_))));
        assert!(matches!(layer.lookup(0, -1), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn stitch_assembles_the_key_bounds() {
        let stitched = layer_with_value(7.0).stitch().expect("stitchable");

        assert_eq!(stitched.size(), RasterSize::square(10));
        assert_eq!(stitched.nodata_count(), 0);
        assert_eq!(stitched.min_max(), Some((7.0, 7.0)));
    }

    #[test]
    fn pyramid_requires_power_of_two_tiles() {
        let layer = layer_with_value(1.0);

        assert!(matches!(
            layer.pyramid(2, 0, ResampleMethod::Average),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn reclassify_updates_the_metadata_cell_type() {
        let layer = layer_with_value(1.0);

        let reclassified = layer.reclassify(
            &Reclassification::Float {
                value_map: crate::ValueMap::new().map(10.0, 1.0),
                replace_nodata_with: None,
            },
            BoundaryStrategy::LessThanOrEqualTo,
        );

        assert_eq!(reclassified.cell_type(), CellType::Float64);
        assert_eq!(reclassified.records()[0].1.cell_type(), CellType::Float64);
    }
}
