//! Macros for dispatching on `AnyRaster` and `CellType` variants.
//!
//! These macros reduce boilerplate when working with type-erased rasters.

/// Dispatch on `AnyRaster` variants and apply an expression to the inner raster.
///
/// The result is not re-wrapped in `AnyRaster`, making it suitable for
/// operations that return a concrete type (not dependent on the variant).
///
/// # Example
///
/// ```ignore
/// let len = dispatch_anyraster!(any_raster, ras, ras.len());
/// ```
#[macro_export]
macro_rules! dispatch_anyraster {
    ($raster:expr, $var:ident, $expr:expr) => {
        match $raster {
            $crate::AnyRaster::U8($var) => $expr,
            $crate::AnyRaster::U16($var) => $expr,
            $crate::AnyRaster::U32($var) => $expr,
            $crate::AnyRaster::U64($var) => $expr,
            $crate::AnyRaster::I8($var) => $expr,
            $crate::AnyRaster::I16($var) => $expr,
            $crate::AnyRaster::I32($var) => $expr,
            $crate::AnyRaster::I64($var) => $expr,
            $crate::AnyRaster::F32($var) => $expr,
            $crate::AnyRaster::F64($var) => $expr,
        }
    };
}

/// Dispatch on `AnyRaster` variants and wrap the result back in the same variant.
///
/// Useful when the operation returns the same element type as the input.
///
/// # Example
///
/// ```ignore
/// let converted = apply_to_anyraster!(any_raster, ras, ras.unary(|v| v));
/// ```
#[macro_export]
macro_rules! apply_to_anyraster {
    ($raster:expr, $var:ident, $expr:expr) => {
        match $raster {
            $crate::AnyRaster::U8($var) => $crate::AnyRaster::U8($expr),
            $crate::AnyRaster::U16($var) => $crate::AnyRaster::U16($expr),
            $crate::AnyRaster::U32($var) => $crate::AnyRaster::U32($expr),
            $crate::AnyRaster::U64($var) => $crate::AnyRaster::U64($expr),
            $crate::AnyRaster::I8($var) => $crate::AnyRaster::I8($expr),
            $crate::AnyRaster::I16($var) => $crate::AnyRaster::I16($expr),
            $crate::AnyRaster::I32($var) => $crate::AnyRaster::I32($expr),
            $crate::AnyRaster::I64($var) => $crate::AnyRaster::I64($expr),
            $crate::AnyRaster::F32($var) => $crate::AnyRaster::F32($expr),
            $crate::AnyRaster::F64($var) => $crate::AnyRaster::F64($expr),
        }
    };
}

/// Dispatch on `CellType` and execute an expression with the corresponding Rust type.
///
/// The expression `$expr` is evaluated with `$t` bound to the concrete type
/// (u8, i32, f64, ...) and the result is wrapped in the corresponding
/// `AnyRaster` variant.
///
/// # Example
///
/// ```ignore
/// let empty = dispatch_celltype!(cell_type, T, DenseRaster::<T>::filled_with_nodata(size));
/// ```
#[macro_export]
macro_rules! dispatch_celltype {
    ($cell_type:expr, $t:ident, $expr:expr) => {
        match $cell_type {
            $crate::CellType::Uint8 => {
                type $t = u8;
                $crate::AnyRaster::U8($expr)
            }
            $crate::CellType::Uint16 => {
                type $t = u16;
                $crate::AnyRaster::U16($expr)
            }
            $crate::CellType::Uint32 => {
                type $t = u32;
                $crate::AnyRaster::U32($expr)
            }
            $crate::CellType::Uint64 => {
                type $t = u64;
                $crate::AnyRaster::U64($expr)
            }
            $crate::CellType::Int8 => {
                type $t = i8;
                $crate::AnyRaster::I8($expr)
            }
            $crate::CellType::Int16 => {
                type $t = i16;
                $crate::AnyRaster::I16($expr)
            }
            $crate::CellType::Int32 => {
                type $t = i32;
                $crate::AnyRaster::I32($expr)
            }
            $crate::CellType::Int64 => {
                type $t = i64;
                $crate::AnyRaster::I64($expr)
            }
            $crate::CellType::Float32 => {
                type $t = f32;
                $crate::AnyRaster::F32($expr)
            }
            $crate::CellType::Float64 => {
                type $t = f64;
                $crate::AnyRaster::F64($expr)
            }
        }
    };
}

/// Define a method on `AnyRaster` that forwards to the inner raster and
/// returns a non-`AnyRaster` type.
macro_rules! anyraster_method {
    ($method:ident, $ret:ty) => {
        pub fn $method(&self) -> $ret {
            $crate::dispatch_anyraster!(self, ras, ras.$method())
        }
    };
}
