use num::ToPrimitive;

/// Trait for types that can represent a no-data value in raster data.
/// Floating point types use NaN as the no-data value, integer types use their
/// maximum value for unsigned types and minimum value for signed types.
pub trait Nodata: ToPrimitive + PartialEq + Sized + Copy {
    const NODATA: Self;

    #[inline]
    fn is_nodata(self) -> bool {
        self == Self::NODATA
    }
}

macro_rules! impl_nodata_fixed_point {
    ( $t:ident, $nodata:ident ) => {
        impl Nodata for $t {
            const NODATA: $t = $t::$nodata;
        }
    };
}

macro_rules! impl_nodata_floating_point {
    ( $t:ident ) => {
        impl Nodata for $t {
            const NODATA: $t = $t::NAN;

            fn is_nodata(self) -> bool {
                self.is_nan()
            }
        }
    };
}

impl_nodata_fixed_point!(u8, MAX);
impl_nodata_fixed_point!(u16, MAX);
impl_nodata_fixed_point!(u32, MAX);
impl_nodata_fixed_point!(u64, MAX);
impl_nodata_fixed_point!(i8, MIN);
impl_nodata_fixed_point!(i16, MIN);
impl_nodata_fixed_point!(i32, MIN);
impl_nodata_fixed_point!(i64, MIN);

impl_nodata_floating_point!(f32);
impl_nodata_floating_point!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_values() {
        assert_eq!(u8::NODATA, u8::MAX);
        assert_eq!(u64::NODATA, u64::MAX);
        assert_eq!(i32::NODATA, i32::MIN);
        assert_eq!(i32::NODATA, -2147483648);
        assert!(f32::NODATA.is_nan());
        assert!(f64::NODATA.is_nan());
    }

    #[test]
    fn nan_is_nodata() {
        assert!(f64::NAN.is_nodata());
        assert!(!0.0_f64.is_nodata());
        assert!(!0_i32.is_nodata());
        assert!(i32::MIN.is_nodata());
    }
}
