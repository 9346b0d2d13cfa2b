//! Resampling of raster regions onto a destination grid.
//!
//! Destination pixel centers are sampled against the source grid, so aligned
//! grids reproduce the source values exactly.

use crate::{Error, Extent, Point, layout::snap_to_grid};
use raster::{Cell, CellIterator, DenseRaster, RasterNum};

/// The fixed set of supported resample methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMethod {
    #[default]
    NearestNeighbor,
    Bilinear,
    Average,
    Mode,
    Median,
    Max,
    Min,
}

impl ResampleMethod {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::NearestNeighbor => "NearestNeighbor",
            Self::Bilinear => "Bilinear",
            Self::Average => "Average",
            Self::Mode => "Mode",
            Self::Median => "Median",
            Self::Max => "Max",
            Self::Min => "Min",
        }
    }
}

impl std::str::FromStr for ResampleMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NearestNeighbor" => Ok(Self::NearestNeighbor),
            "Bilinear" => Ok(Self::Bilinear),
            "Average" => Ok(Self::Average),
            "Mode" => Ok(Self::Mode),
            "Median" => Ok(Self::Median),
            "Max" => Ok(Self::Max),
            "Min" => Ok(Self::Min),
            _ => Err(Error::InvalidArgument(format!("'{s}' is not a known resample method"))),
        }
    }
}

impl std::fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

struct SourceGrid<'a, T: RasterNum> {
    raster: &'a DenseRaster<T>,
    extent: &'a Extent,
    cell_width: f64,
    cell_height: f64,
}

impl<T: RasterNum> SourceGrid<'_, T> {
    fn value(&self, row: i32, col: i32) -> Option<f64> {
        self.raster.cell_value(Cell::from_row_col(row, col)).and_then(|v| v.to_sample())
    }

    fn clamp_col(&self, col: i32) -> i32 {
        col.clamp(0, self.raster.columns().count() - 1)
    }

    fn clamp_row(&self, row: i32) -> i32 {
        row.clamp(0, self.raster.rows().count() - 1)
    }
}

/// Samples the source raster into the nodata cells of `dst`.
/// Destination cells whose center falls outside of the source extent are left
/// untouched.
pub(crate) fn resample_region<T: RasterNum>(
    src: &DenseRaster<T>,
    src_extent: &Extent,
    dst: &mut DenseRaster<T>,
    dst_extent: &Extent,
    method: ResampleMethod,
) {
    if src.is_empty() || dst.is_empty() {
        return;
    }

    let grid = SourceGrid {
        raster: src,
        extent: src_extent,
        cell_width: src_extent.width() / src.columns().count() as f64,
        cell_height: src_extent.height() / src.rows().count() as f64,
    };

    let dst_cell_width = dst_extent.width() / dst.columns().count() as f64;
    let dst_cell_height = dst_extent.height() / dst.rows().count() as f64;

    for cell in CellIterator::for_raster_with_size(dst.size()) {
        let x = dst_extent.min_x + (cell.col as f64 + 0.5) * dst_cell_width;
        let y = dst_extent.max_y - (cell.row as f64 + 0.5) * dst_cell_height;

        if !src_extent.contains(Point::new(x, y)) {
            continue;
        }

        let sampled = match method {
            ResampleMethod::NearestNeighbor => sample_nearest(&grid, x, y),
            ResampleMethod::Bilinear => sample_bilinear(&grid, x, y),
            stat => sample_block(
                &grid,
                x - 0.5 * dst_cell_width,
                y - 0.5 * dst_cell_height,
                x + 0.5 * dst_cell_width,
                y + 0.5 * dst_cell_height,
                stat,
            ),
        };

        if let Some(value) = sampled {
            dst.set_cell_value(cell, Some(T::from_sample(value)));
        }
    }
}

fn sample_nearest<T: RasterNum>(grid: &SourceGrid<T>, x: f64, y: f64) -> Option<f64> {
    let col = grid.clamp_col(((x - grid.extent.min_x) / grid.cell_width).floor() as i32);
    let row = grid.clamp_row(((grid.extent.max_y - y) / grid.cell_height).floor() as i32);

    grid.value(row, col)
}

fn sample_bilinear<T: RasterNum>(grid: &SourceGrid<T>, x: f64, y: f64) -> Option<f64> {
    // fractional position relative to the cell centers
    let fx = (x - grid.extent.min_x) / grid.cell_width - 0.5;
    let fy = (grid.extent.max_y - y) / grid.cell_height - 0.5;

    let col0 = fx.floor();
    let row0 = fy.floor();
    let tx = fx - col0;
    let ty = fy - row0;

    let mut weight_sum = 0.0;
    let mut value_sum = 0.0;

    for (row_offset, row_weight) in [(0, 1.0 - ty), (1, ty)] {
        for (col_offset, col_weight) in [(0, 1.0 - tx), (1, tx)] {
            let weight = row_weight * col_weight;
            if weight <= 0.0 {
                continue;
            }

            let row = grid.clamp_row(row0 as i32 + row_offset);
            let col = grid.clamp_col(col0 as i32 + col_offset);
            if let Some(value) = grid.value(row, col) {
                weight_sum += weight;
                value_sum += value * weight;
            }
        }
    }

    if weight_sum > 0.0 { Some(value_sum / weight_sum) } else { None }
}

/// Aggregates all source cells covered by the destination pixel footprint.
fn sample_block<T: RasterNum>(
    grid: &SourceGrid<T>,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    method: ResampleMethod,
) -> Option<f64> {
    let col0 = grid.clamp_col(snap_to_grid((x0 - grid.extent.min_x) / grid.cell_width).floor() as i32);
    let col1 = grid.clamp_col(snap_to_grid((x1 - grid.extent.min_x) / grid.cell_width).ceil() as i32 - 1);
    let row0 = grid.clamp_row(snap_to_grid((grid.extent.max_y - y1) / grid.cell_height).floor() as i32);
    let row1 = grid.clamp_row(snap_to_grid((grid.extent.max_y - y0) / grid.cell_height).ceil() as i32 - 1);

    let mut values = Vec::with_capacity(((row1 - row0 + 1) * (col1 - col0 + 1)).max(0) as usize);
    for row in row0..=row1 {
        for col in col0..=col1 {
            if let Some(value) = grid.value(row, col) {
                values.push(value);
            }
        }
    }

    if values.is_empty() {
        return None;
    }

    match method {
        ResampleMethod::Average => Some(values.iter().sum::<f64>() / values.len() as f64),
        ResampleMethod::Max => values.iter().copied().reduce(f64::max),
        ResampleMethod::Min => values.iter().copied().reduce(f64::min),
        ResampleMethod::Median => {
            values.sort_by(f64::total_cmp);
            Some(values[(values.len() - 1) / 2])
        }
        ResampleMethod::Mode => {
            values.sort_by(f64::total_cmp);

            let mut best = values[0];
            let mut best_count = 0;
            let mut current = values[0];
            let mut count = 0;
            for &value in &values {
                if value == current {
                    count += 1;
                } else {
                    current = value;
                    count = 1;
                }

                if count > best_count {
                    best = current;
                    best_count = count;
                }
            }

            Some(best)
        }
        ResampleMethod::NearestNeighbor | ResampleMethod::Bilinear => None,
    }
}
