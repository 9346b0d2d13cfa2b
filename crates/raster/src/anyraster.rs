use crate::{
    Cell, CellType, DenseRaster, Error, RasterNum, RasterSize, Result,
    rastersize::{Columns, Rows},
};

/// Type erased `DenseRaster`
/// Needed when the cell type of the data is only known at runtime, e.g. when
/// it is negotiated from collection metadata.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyRaster {
    U8(DenseRaster<u8>),
    U16(DenseRaster<u16>),
    U32(DenseRaster<u32>),
    U64(DenseRaster<u64>),
    I8(DenseRaster<i8>),
    I16(DenseRaster<i16>),
    I32(DenseRaster<i32>),
    I64(DenseRaster<i64>),
    F32(DenseRaster<f32>),
    F64(DenseRaster<f64>),
}

macro_rules! impl_anyraster_binary_op {
    ($fn_name:ident, $scalar_fn:ident, $op:ident) => {
        /// Cell wise nodata aware arithmetic, the operands are promoted to
        /// their common cell type first.
        pub fn $fn_name(&self, other: &Self) -> Result<Self> {
            let cell_type = self.cell_type().union(other.cell_type());
            let lhs = self.convert(cell_type);
            let rhs = other.convert(cell_type);

            Ok(apply_to_anyraster!(&lhs, ras, {
                let rhs_typed: &DenseRaster<_> = (&rhs).try_into()?;
                ras.binary(rhs_typed, |a, b| a.$op(b))?
            }))
        }

        /// Cell wise nodata aware arithmetic with a constant operand.
        pub fn $scalar_fn(&self, value: f64) -> Self {
            apply_to_anyraster!(self, ras, {
                let scalar = RasterNum::from_sample(value);
                ras.unary(|v| v.$op(scalar))
            })
        }
    };
}

impl AnyRaster {
    anyraster_method!(size, RasterSize);
    anyraster_method!(rows, Rows);
    anyraster_method!(columns, Columns);
    anyraster_method!(len, usize);
    anyraster_method!(is_empty, bool);
    anyraster_method!(nodata_count, usize);

    pub fn filled_with_nodata(cell_type: CellType, size: RasterSize) -> Self {
        dispatch_celltype!(cell_type, T, DenseRaster::<T>::filled_with_nodata(size))
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            AnyRaster::U8(_) => CellType::Uint8,
            AnyRaster::U16(_) => CellType::Uint16,
            AnyRaster::U32(_) => CellType::Uint32,
            AnyRaster::U64(_) => CellType::Uint64,
            AnyRaster::I8(_) => CellType::Int8,
            AnyRaster::I16(_) => CellType::Int16,
            AnyRaster::I32(_) => CellType::Int32,
            AnyRaster::I64(_) => CellType::Int64,
            AnyRaster::F32(_) => CellType::Float32,
            AnyRaster::F64(_) => CellType::Float64,
        }
    }

    /// Cast the raster to the given cell type, nodata maps to nodata and
    /// values that are not representable in the destination type become nodata.
    pub fn convert(&self, cell_type: CellType) -> Self {
        if cell_type == self.cell_type() {
            return self.clone();
        }

        dispatch_anyraster!(self, ras, dispatch_celltype!(cell_type, T, ras.cast::<T>()))
    }

    /// The value at the given cell as f64, `None` for nodata cells and cells
    /// outside of the raster.
    pub fn sample(&self, cell: Cell) -> Option<f64> {
        dispatch_anyraster!(self, ras, ras.cell_value(cell).and_then(|v| v.to_sample()))
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        dispatch_anyraster!(
            self,
            ras,
            ras.min_max().and_then(|(min, max)| Some((min.to_sample()?, max.to_sample()?)))
        )
    }

    /// Fill nodata cells with data from the other raster, existing data is kept.
    /// The cell types of both rasters have to match.
    pub fn merge_from(&mut self, other: &Self) -> Result<()> {
        dispatch_anyraster!(self, ras, ras.merge_from(other.try_into()?))
    }

    /// Place the other raster at the given offset, filling only nodata cells.
    /// The cell types of both rasters have to match.
    pub fn merge_at(&mut self, other: &Self, row_offset: i32, col_offset: i32) -> Result<()> {
        dispatch_anyraster!(self, ras, Ok(ras.merge_at(other.try_into()?, row_offset, col_offset)))
    }

    impl_anyraster_binary_op!(add, add_scalar, add_nodata_aware);
    impl_anyraster_binary_op!(sub, sub_scalar, sub_nodata_aware);
    impl_anyraster_binary_op!(mul, mul_scalar, mul_nodata_aware);
    impl_anyraster_binary_op!(div, div_scalar, div_nodata_aware);
}

macro_rules! impl_anyraster_conversions {
    ($variant:ident, $t:ty) => {
        impl From<DenseRaster<$t>> for AnyRaster {
            fn from(raster: DenseRaster<$t>) -> Self {
                AnyRaster::$variant(raster)
            }
        }

        impl TryFrom<AnyRaster> for DenseRaster<$t> {
            type Error = Error;

            fn try_from(value: AnyRaster) -> Result<Self> {
                match value {
                    AnyRaster::$variant(ras) => Ok(ras),
                    other => Err(Error::TypeMismatch {
                        expected: <$t as RasterNum>::TYPE,
                        actual: other.cell_type(),
                    }),
                }
            }
        }

        impl<'a> TryFrom<&'a AnyRaster> for &'a DenseRaster<$t> {
            type Error = Error;

            fn try_from(value: &'a AnyRaster) -> Result<Self> {
                match value {
                    AnyRaster::$variant(ras) => Ok(ras),
                    other => Err(Error::TypeMismatch {
                        expected: <$t as RasterNum>::TYPE,
                        actual: other.cell_type(),
                    }),
                }
            }
        }
    };
}

impl_anyraster_conversions!(U8, u8);
impl_anyraster_conversions!(U16, u16);
impl_anyraster_conversions!(U32, u32);
impl_anyraster_conversions!(U64, u64);
impl_anyraster_conversions!(I8, i8);
impl_anyraster_conversions!(I16, i16);
impl_anyraster_conversions!(I32, i32);
impl_anyraster_conversions!(I64, i64);
impl_anyraster_conversions!(F32, f32);
impl_anyraster_conversions!(F64, f64);
