//! Partitioning of source rasters against a layout grid.
//!
//! `cut` keeps every fragment, so overlapping inputs produce duplicate keys.
//! `merge` combines all fragments under one key into a single tile, record
//! order wins for cells covered by more than one fragment.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::debug;

use crate::{
    Extent, LayerMetadata, LayoutDefinition, ResampleMethod, Result, SourceKey, SpatialKey, TileKey,
    resample::resample_region,
};
use raster::{AnyRaster, CellType, DenseRaster, dispatch_celltype};

/// Cuts a single source raster into tiles for every layout cell its extent
/// intersects and appends them to `out`.
pub(crate) fn cut_source<K, F>(
    raster: &AnyRaster,
    src_extent: &Extent,
    make_key: F,
    cell_type: CellType,
    layout: &LayoutDefinition,
    method: ResampleMethod,
    out: &mut Vec<(K, AnyRaster)>,
) -> Result
where
    K: TileKey,
    F: Fn(SpatialKey) -> K,
{
    let src = raster.convert(cell_type);
    let tile_size = layout.tile_layout.tile_size();

    for spatial in layout.keys_for_extent(src_extent) {
        let tile_extent = layout.tile_extent(spatial);
        let tile = dispatch_celltype!(cell_type, T, {
            let src_typed: &DenseRaster<T> = (&src).try_into()?;
            let mut tile = DenseRaster::<T>::filled_with_nodata(tile_size);
            resample_region(src_typed, src_extent, &mut tile, &tile_extent, method);
            tile
        });

        out.push((make_key(spatial), tile));
    }

    Ok(())
}

pub(crate) fn cut_records<K: SourceKey>(
    records: &[(K, AnyRaster)],
    metadata: &LayerMetadata<K::Tiled>,
    method: ResampleMethod,
) -> Result<Vec<(K::Tiled, AnyRaster)>> {
    let mut result = Vec::new();
    for (key, raster) in records {
        cut_source(
            raster,
            key.extent(),
            |spatial| key.tile_key(spatial),
            metadata.cell_type,
            &metadata.layout_definition,
            method,
            &mut result,
        )?;
    }

    debug!("Cut {} source rasters into {} tiles", records.len(), result.len());
    Ok(result)
}

pub(crate) fn merge_records<K: TileKey>(cut: Vec<(K, AnyRaster)>) -> Result<Vec<(K, AnyRaster)>> {
    let tile_count = cut.len();

    let mut merged: BTreeMap<K, AnyRaster> = BTreeMap::new();
    for (key, tile) in cut {
        match merged.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(tile);
            }
            Entry::Occupied(mut entry) => entry.get_mut().merge_from(&tile)?,
        }
    }

    debug!("Merged {tile_count} tiles into {} unique keys", merged.len());
    Ok(merged.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileLayout;
    use raster::{Cell, Columns, RasterSize, Rows};

    fn tile(value: f32) -> AnyRaster {
        AnyRaster::from(DenseRaster::filled_with(value, RasterSize::square(2)))
    }

    #[test]
    fn merge_keeps_the_first_value_per_cell() {
        let key = SpatialKey::new(0, 0);
        let mut first: DenseRaster<f32> = DenseRaster::filled_with_nodata(RasterSize::square(2));
        first.set_cell_value(raster::Cell::from_row_col(0, 0), Some(1.0));

        let merged = merge_records(vec![(key, AnyRaster::from(first)), (key, tile(2.0))]).expect("same cell types");

        assert_eq!(merged.len(), 1);
        let (_, merged_tile) = &merged[0];
        assert_eq!(merged_tile.sample(Cell::from_row_col(0, 0)), Some(1.0));
        assert_eq!(merged_tile.sample(Cell::from_row_col(1, 1)), Some(2.0));
    }

    #[test]
    fn merge_leaves_distinct_keys_alone() {
        let merged = merge_records(vec![
            (SpatialKey::new(0, 0), tile(1.0)),
            (SpatialKey::new(1, 0), tile(2.0)),
        ])
        .expect("same cell types");

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn cut_source_produces_a_tile_per_intersected_cell() {
        let layout = LayoutDefinition::new(Extent::new(0.0, -4.0, 10.0, 6.0), TileLayout::new(2, 2, 5, 5));
        let raster = AnyRaster::from(
            DenseRaster::new(RasterSize::with_rows_cols(Rows(4), Columns(4)), vec![1.0_f32; 16]).expect("valid raster"),
        );

        let mut out: Vec<(SpatialKey, AnyRaster)> = Vec::new();
        cut_source(
            &raster,
            &Extent::new(3.0, 2.0, 7.0, 6.0),
            |spatial| spatial,
            CellType::Float32,
            &layout,
            ResampleMethod::NearestNeighbor,
            &mut out,
        )
        .expect("cuttable");

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, SpatialKey::new(0, 0));
        assert_eq!(out[1].0, SpatialKey::new(1, 0));
        assert_eq!(out[0].1.size(), RasterSize::square(5));
        // the covered part carries data, the rest stays nodata
        assert_eq!(out[0].1.sample(Cell::from_row_col(0, 3)), Some(1.0));
        assert_eq!(out[0].1.sample(Cell::from_row_col(0, 0)), None);
    }
}
