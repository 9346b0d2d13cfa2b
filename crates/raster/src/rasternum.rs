use crate::{CellType, Nodata};

/// Type requirements for data stored in rasters.
///
/// Arithmetic is nodata aware: an operation with a nodata operand yields
/// nodata, integer division by zero yields nodata instead of panicking.
pub trait RasterNum:
    Copy
    + Nodata
    + num::Num
    + num::NumCast
    + num::Bounded
    + num::traits::NumAssignOps
    + std::cmp::PartialOrd
    + std::fmt::Debug
{
    const TYPE: CellType;
    const IS_SIGNED: bool;

    fn add_nodata_aware(self, other: Self) -> Self;
    fn sub_nodata_aware(self, other: Self) -> Self;
    fn mul_nodata_aware(self, other: Self) -> Self;
    fn div_nodata_aware(self, other: Self) -> Self;

    /// Converts a sampled f64 value back to the pixel type.
    /// NaN and unrepresentable values become the nodata sentinel.
    fn from_sample(v: f64) -> Self;

    /// The pixel value as f64, `None` for nodata cells.
    fn to_sample(self) -> Option<f64>;
}

macro_rules! rasternum_int_impl {
    ($t:ty, $cell_type:ident, $signed:literal) => {
        impl RasterNum for $t {
            const TYPE: CellType = CellType::$cell_type;
            const IS_SIGNED: bool = $signed;

            #[inline]
            fn add_nodata_aware(self, other: Self) -> Self {
                if self.is_nodata() || other.is_nodata() {
                    Self::NODATA
                } else {
                    self.wrapping_add(other)
                }
            }

            #[inline]
            fn sub_nodata_aware(self, other: Self) -> Self {
                if self.is_nodata() || other.is_nodata() {
                    Self::NODATA
                } else {
                    self.wrapping_sub(other)
                }
            }

            #[inline]
            fn mul_nodata_aware(self, other: Self) -> Self {
                if self.is_nodata() || other.is_nodata() {
                    Self::NODATA
                } else {
                    self.wrapping_mul(other)
                }
            }

            #[inline]
            fn div_nodata_aware(self, other: Self) -> Self {
                if self.is_nodata() || other.is_nodata() || other == 0 {
                    Self::NODATA
                } else {
                    self / other
                }
            }

            fn from_sample(v: f64) -> Self {
                if v.is_nan() {
                    return Self::NODATA;
                }

                num::NumCast::from(v.round()).unwrap_or(Self::NODATA)
            }

            fn to_sample(self) -> Option<f64> {
                if self.is_nodata() { None } else { num::ToPrimitive::to_f64(&self) }
            }
        }
    };
}

macro_rules! rasternum_fp_impl {
    ($t:ty, $cell_type:ident) => {
        impl RasterNum for $t {
            const TYPE: CellType = CellType::$cell_type;
            const IS_SIGNED: bool = true;

            #[inline]
            fn add_nodata_aware(self, other: Self) -> Self {
                // NaN propagates
                self + other
            }

            #[inline]
            fn sub_nodata_aware(self, other: Self) -> Self {
                self - other
            }

            #[inline]
            fn mul_nodata_aware(self, other: Self) -> Self {
                self * other
            }

            #[inline]
            fn div_nodata_aware(self, other: Self) -> Self {
                if other == 0.0 { Self::NODATA } else { self / other }
            }

            fn from_sample(v: f64) -> Self {
                if v.is_nan() {
                    return Self::NODATA;
                }

                num::NumCast::from(v).unwrap_or(Self::NODATA)
            }

            fn to_sample(self) -> Option<f64> {
                if self.is_nodata() { None } else { num::ToPrimitive::to_f64(&self) }
            }
        }
    };
}

rasternum_int_impl!(i8, Int8, true);
rasternum_int_impl!(i16, Int16, true);
rasternum_int_impl!(i32, Int32, true);
rasternum_int_impl!(i64, Int64, true);
rasternum_int_impl!(u8, Uint8, false);
rasternum_int_impl!(u16, Uint16, false);
rasternum_int_impl!(u32, Uint32, false);
rasternum_int_impl!(u64, Uint64, false);

rasternum_fp_impl!(f32, Float32);
rasternum_fp_impl!(f64, Float64);
