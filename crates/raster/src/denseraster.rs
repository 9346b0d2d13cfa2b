use crate::{
    Cell, Error, Nodata, RasterNum, RasterSize, Result,
    rastersize::{Columns, Rows},
};

/// Raster implementation using a dense data structure.
/// Nodata values are stored in band as the [`crate::Nodata::NODATA`] sentinel
/// for the type T, so no additional data is allocated for tracking nodata cells.
#[derive(Debug, Clone)]
pub struct DenseRaster<T: RasterNum> {
    size: RasterSize,
    data: Vec<T>,
}

impl<T: RasterNum> DenseRaster<T> {
    pub fn new(size: RasterSize, data: Vec<T>) -> Result<Self> {
        if data.len() != size.cell_count() {
            return Err(Error::InvalidArgument(format!(
                "Data length {} does not match the raster size {}",
                data.len(),
                size
            )));
        }

        Ok(DenseRaster { size, data })
    }

    pub fn filled_with(val: T, size: RasterSize) -> Self {
        let cell_count = size.cell_count();
        DenseRaster {
            size,
            data: vec![val; cell_count],
        }
    }

    pub fn filled_with_nodata(size: RasterSize) -> Self {
        Self::filled_with(T::NODATA, size)
    }

    pub fn zeros(size: RasterSize) -> Self {
        Self::filled_with(T::zero(), size)
    }

    pub fn from_iter_opt<Iter>(size: RasterSize, iter: Iter) -> Result<Self>
    where
        Iter: Iterator<Item = Option<T>>,
    {
        let data: Vec<T> = iter.map(|val| val.unwrap_or(T::NODATA)).collect();
        Self::new(size, data)
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn rows(&self) -> Rows {
        self.size.rows
    }

    pub fn columns(&self) -> Columns {
        self.size.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    pub fn into_raw_parts(self) -> (RasterSize, Vec<T>) {
        (self.size, self.data)
    }

    pub fn contains_cell(&self, cell: Cell) -> bool {
        cell.is_valid() && cell.row < self.size.rows.count() && cell.col < self.size.cols.count()
    }

    fn index_of(&self, cell: Cell) -> usize {
        cell.row as usize * self.size.cols.count() as usize + cell.col as usize
    }

    /// The value at the given index or `None` if the index contains nodata.
    pub fn value(&self, index: usize) -> Option<T> {
        let val = self.data[index];
        if val.is_nodata() { None } else { Some(val) }
    }

    /// The value at the given cell, `None` for nodata cells and cells outside of the raster.
    pub fn cell_value(&self, cell: Cell) -> Option<T> {
        if !self.contains_cell(cell) {
            return None;
        }

        self.value(self.index_of(cell))
    }

    /// Set the value at the given cell, `None` marks the cell as nodata.
    pub fn set_cell_value(&mut self, cell: Cell, val: Option<T>) {
        let index = self.index_of(cell);
        self.data[index] = val.unwrap_or(T::NODATA);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    pub fn nodata_count(&self) -> usize {
        self.data.iter().filter(|x| x.is_nodata()).count()
    }

    /// The smallest and largest data value, `None` if the raster holds no data.
    pub fn min_max(&self) -> Option<(T, T)> {
        let mut result: Option<(T, T)> = None;
        for &val in self.data.iter().filter(|v| !v.is_nodata()) {
            result = match result {
                None => Some((val, val)),
                Some((min, max)) => Some((if val < min { val } else { min }, if val > max { val } else { max })),
            };
        }

        result
    }

    pub fn unary<F: Fn(T) -> T>(&self, op: F) -> Self {
        DenseRaster {
            size: self.size,
            data: self.data.iter().map(|&a| op(a)).collect(),
        }
    }

    pub fn binary<F: Fn(T, T) -> T>(&self, other: &Self, op: F) -> Result<Self> {
        if self.size != other.size {
            return Err(Error::SizeMismatch {
                size1: self.size,
                size2: other.size,
            });
        }

        let data = self.data.iter().zip(other.data.iter()).map(|(&a, &b)| op(a, b)).collect();

        Ok(DenseRaster { size: self.size, data })
    }

    /// Cast the raster to a different pixel type, nodata maps to nodata and
    /// values that are not representable in the destination type become nodata.
    pub fn cast<TDest: RasterNum>(&self) -> DenseRaster<TDest> {
        DenseRaster {
            size: self.size,
            data: self
                .data
                .iter()
                .map(|&v| {
                    if v.is_nodata() {
                        TDest::NODATA
                    } else {
                        num::NumCast::from(v).unwrap_or(TDest::NODATA)
                    }
                })
                .collect(),
        }
    }

    /// Fill nodata cells with data from the other raster, existing data is kept.
    pub fn merge_from(&mut self, other: &Self) -> Result<()> {
        if self.size != other.size {
            return Err(Error::SizeMismatch {
                size1: self.size,
                size2: other.size,
            });
        }

        for (dst, &src) in self.data.iter_mut().zip(other.data.iter()) {
            if dst.is_nodata() && !src.is_nodata() {
                *dst = src;
            }
        }

        Ok(())
    }

    /// Place the other raster at the given offset, filling only nodata cells.
    /// Parts that fall outside of this raster are clipped away.
    pub fn merge_at(&mut self, other: &Self, row_offset: i32, col_offset: i32) {
        for src_row in 0..other.size.rows.count() {
            let dst_row = src_row + row_offset;
            if dst_row < 0 || dst_row >= self.size.rows.count() {
                continue;
            }

            for src_col in 0..other.size.cols.count() {
                let dst_col = src_col + col_offset;
                if dst_col < 0 || dst_col >= self.size.cols.count() {
                    continue;
                }

                let dst_index = self.index_of(Cell::from_row_col(dst_row, dst_col));
                if self.data[dst_index].is_nodata() {
                    let src = other.data[other.index_of(Cell::from_row_col(src_row, src_col))];
                    if !src.is_nodata() {
                        self.data[dst_index] = src;
                    }
                }
            }
        }
    }
}

impl<T: RasterNum> std::ops::Index<Cell> for DenseRaster<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &Self::Output {
        &self.data[cell.row as usize * self.size.cols.count() as usize + cell.col as usize]
    }
}

impl<T: RasterNum> PartialEq for DenseRaster<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }

        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(&a, &b)| match (a.is_nodata(), b.is_nodata()) {
                (true, true) => true,
                (false, false) => a == b,
                _ => false,
            })
    }
}
