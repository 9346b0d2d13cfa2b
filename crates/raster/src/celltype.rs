use crate::Error;

/// The storage type of the cells in a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum CellType {
    Int8 = 0,
    Uint8 = 1,
    Int16 = 2,
    Uint16 = 3,
    Int32 = 4,
    Uint32 = 5,
    Int64 = 6,
    Uint64 = 7,
    Float32 = 8,
    Float64 = 9,
}

impl CellType {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    pub const fn is_floating_point(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }

    const fn bits(self) -> u32 {
        match self {
            Self::Int8 | Self::Uint8 => 8,
            Self::Int16 | Self::Uint16 => 16,
            Self::Int32 | Self::Uint32 | Self::Float32 => 32,
            Self::Int64 | Self::Uint64 | Self::Float64 => 64,
        }
    }

    /// The smallest cell type that can hold values of both input types.
    ///
    /// Mixed signedness promotes to the next wider signed type, integers mixed
    /// with floating point promote to a float wide enough to represent the
    /// integer domain exactly.
    pub fn union(self, other: Self) -> Self {
        use CellType::*;

        if self == other {
            return self;
        }

        if self.is_floating_point() || other.is_floating_point() {
            let int_bits = if !self.is_floating_point() {
                self.bits()
            } else if !other.is_floating_point() {
                other.bits()
            } else {
                0
            };

            // f32 represents integers up to 16 bits exactly
            if self == Float64 || other == Float64 || int_bits > 16 {
                Float64
            } else {
                Float32
            }
        } else if self.is_signed() == other.is_signed() {
            if self.bits() >= other.bits() { self } else { other }
        } else {
            let (signed, unsigned) = if self.is_signed() { (self, other) } else { (other, self) };
            if signed.bits() > unsigned.bits() {
                signed
            } else {
                match unsigned.bits() {
                    8 => Int16,
                    16 => Int32,
                    32 => Int64,
                    _ => Float64,
                }
            }
        }
    }
}

impl std::str::FromStr for CellType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" => Ok(Self::Int8),
            "uint8" => Ok(Self::Uint8),
            "int16" => Ok(Self::Int16),
            "uint16" => Ok(Self::Uint16),
            "int32" => Ok(Self::Int32),
            "uint32" => Ok(Self::Uint32),
            "int64" => Ok(Self::Int64),
            "uint64" => Ok(Self::Uint64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            _ => Err(Error::InvalidArgument(format!("'{s}' is not a known cell type"))),
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
