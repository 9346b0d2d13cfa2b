//! Reclassification of cell values along break points.

use crate::Error;
use raster::{AnyRaster, CellIterator, CellType, DenseRaster, Nodata, RasterNum};

/// How cell values are classified along the break points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryStrategy {
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    #[default]
    LessThanOrEqualTo,
    Exact,
}

impl BoundaryStrategy {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqualTo => "GreaterThanOrEqualTo",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqualTo => "LessThanOrEqualTo",
            Self::Exact => "Exact",
        }
    }
}

impl std::str::FromStr for BoundaryStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GreaterThan" => Ok(Self::GreaterThan),
            "GreaterThanOrEqualTo" => Ok(Self::GreaterThanOrEqualTo),
            "LessThan" => Ok(Self::LessThan),
            "LessThanOrEqualTo" => Ok(Self::LessThanOrEqualTo),
            "Exact" => Ok(Self::Exact),
            _ => Err(Error::InvalidArgument(format!("'{s}' is not a known boundary strategy"))),
        }
    }
}

impl std::fmt::Display for BoundaryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Sorted mapping of break values to output values.
///
/// A group of breaks sharing one output value is expanded into individual
/// scalar entries, so mapping the group `[1, 2, 3]` to `9` is equivalent to
/// three single mappings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap<T> {
    entries: Vec<(T, T)>,
}

impl<T: Copy + PartialOrd> ValueMap<T> {
    pub fn new() -> Self {
        ValueMap { entries: Vec::new() }
    }

    /// Maps a single break value, an existing entry for the break is replaced.
    #[must_use]
    pub fn map(mut self, break_value: T, value: T) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|(b, _)| *b == break_value) {
            entry.1 = value;
            return self;
        }

        let pos = self
            .entries
            .partition_point(|(b, _)| matches!(b.partial_cmp(&break_value), Some(std::cmp::Ordering::Less)));
        self.entries.insert(pos, (break_value, value));
        self
    }

    /// Maps a group of break values to one shared output value.
    #[must_use]
    pub fn map_group(mut self, breaks: impl IntoIterator<Item = T>, value: T) -> Self {
        for break_value in breaks {
            self = self.map(break_value, value);
        }

        self
    }

    pub fn entries(&self) -> &[(T, T)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The output value for `v`, `None` when no break matches.
    pub fn classify(&self, v: T, strategy: BoundaryStrategy) -> Option<T> {
        let entry = match strategy {
            BoundaryStrategy::LessThanOrEqualTo => self.entries.iter().find(|(b, _)| v <= *b),
            BoundaryStrategy::LessThan => self.entries.iter().find(|(b, _)| v < *b),
            BoundaryStrategy::GreaterThanOrEqualTo => self.entries.iter().rev().find(|(b, _)| v >= *b),
            BoundaryStrategy::GreaterThan => self.entries.iter().rev().find(|(b, _)| v > *b),
            BoundaryStrategy::Exact => self.entries.iter().find(|(b, _)| v == *b),
        };

        entry.map(|(_, value)| *value)
    }
}

/// The numeric domain of a reclassification together with the optional nodata
/// replacement. When no replacement is given nodata cells keep the canonical
/// sentinel of the domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Reclassification {
    Int {
        value_map: ValueMap<i32>,
        replace_nodata_with: Option<i32>,
    },
    Float {
        value_map: ValueMap<f64>,
        replace_nodata_with: Option<f64>,
    },
}

impl Reclassification {
    pub fn result_cell_type(&self) -> CellType {
        match self {
            Reclassification::Int { .. } => CellType::Int32,
            Reclassification::Float { .. } => CellType::Float64,
        }
    }
}

/// Single dispatch point for all reclassify variants.
/// Values not covered by any break become nodata.
pub(crate) fn reclassify_raster(
    raster: &AnyRaster,
    reclassification: &Reclassification,
    strategy: BoundaryStrategy,
) -> AnyRaster {
    let size = raster.size();

    match reclassification {
        Reclassification::Int {
            value_map,
            replace_nodata_with,
        } => {
            let replacement = replace_nodata_with.unwrap_or(i32::NODATA);

            let mut out = DenseRaster::<i32>::filled_with_nodata(size);
            for (dst, cell) in out.iter_mut().zip(CellIterator::for_raster_with_size(size)) {
                *dst = match raster.sample(cell) {
                    None => replacement,
                    Some(v) => {
                        let value = i32::from_sample(v);
                        if value.is_nodata() {
                            i32::NODATA
                        } else {
                            value_map.classify(value, strategy).unwrap_or(i32::NODATA)
                        }
                    }
                };
            }

            AnyRaster::from(out)
        }
        Reclassification::Float {
            value_map,
            replace_nodata_with,
        } => {
            let replacement = replace_nodata_with.unwrap_or(f64::NODATA);

            let mut out = DenseRaster::<f64>::filled_with_nodata(size);
            for (dst, cell) in out.iter_mut().zip(CellIterator::for_raster_with_size(size)) {
                *dst = match raster.sample(cell) {
                    None => replacement,
                    Some(v) => value_map.classify(v, strategy).unwrap_or(f64::NODATA),
                };
            }

            AnyRaster::from(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster::{Cell, RasterSize};

    #[test]
    fn grouped_breaks_expand_to_scalar_entries() {
        let grouped = ValueMap::new().map_group([1, 2, 3], 9);
        let scalar = ValueMap::new().map(1, 9).map(2, 9).map(3, 9);

        assert_eq!(grouped, scalar);
        assert_eq!(grouped.entries(), &[(1, 9), (2, 9), (3, 9)]);
    }

    #[test]
    fn map_replaces_existing_breaks() {
        let map = ValueMap::new().map(5, 1).map(5, 2);
        assert_eq!(map.entries(), &[(5, 2)]);
    }

    #[test]
    fn boundary_strategies() {
        let map = ValueMap::new().map(10, 1).map(20, 2);

        assert_eq!(map.classify(5, BoundaryStrategy::LessThanOrEqualTo), Some(1));
        assert_eq!(map.classify(10, BoundaryStrategy::LessThanOrEqualTo), Some(1));
        assert_eq!(map.classify(15, BoundaryStrategy::LessThanOrEqualTo), Some(2));
        assert_eq!(map.classify(25, BoundaryStrategy::LessThanOrEqualTo), None);

        assert_eq!(map.classify(10, BoundaryStrategy::LessThan), Some(2));
        assert_eq!(map.classify(20, BoundaryStrategy::LessThan), None);

        assert_eq!(map.classify(25, BoundaryStrategy::GreaterThanOrEqualTo), Some(2));
        assert_eq!(map.classify(20, BoundaryStrategy::GreaterThanOrEqualTo), Some(2));
        assert_eq!(map.classify(15, BoundaryStrategy::GreaterThanOrEqualTo), Some(1));
        assert_eq!(map.classify(5, BoundaryStrategy::GreaterThanOrEqualTo), None);

        assert_eq!(map.classify(20, BoundaryStrategy::GreaterThan), Some(1));
        assert_eq!(map.classify(10, BoundaryStrategy::GreaterThan), None);

        assert_eq!(map.classify(10, BoundaryStrategy::Exact), Some(1));
        assert_eq!(map.classify(11, BoundaryStrategy::Exact), None);
    }

    #[test]
    fn strategy_token_parsing() {
        assert_eq!(
            "LessThanOrEqualTo".parse::<BoundaryStrategy>().ok(),
            Some(BoundaryStrategy::LessThanOrEqualTo)
        );
        assert!(matches!(
            "AboveOrBelow".parse::<BoundaryStrategy>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn int_reclassification() {
        let source = AnyRaster::from(
            DenseRaster::new(RasterSize::square(2), vec![1_i32, 15, i32::NODATA, 42]).expect("valid raster"),
        );

        let reclassification = Reclassification::Int {
            value_map: ValueMap::new().map(10, 100).map(20, 200),
            replace_nodata_with: None,
        };

        let result = reclassify_raster(&source, &reclassification, BoundaryStrategy::LessThanOrEqualTo);

        assert_eq!(result.cell_type(), CellType::Int32);
        assert_eq!(result.sample(Cell::from_row_col(0, 0)), Some(100.0));
        assert_eq!(result.sample(Cell::from_row_col(0, 1)), Some(200.0));
        // nodata is preserved without a replacement, uncovered values become nodata
        assert_eq!(result.sample(Cell::from_row_col(1, 0)), None);
        assert_eq!(result.sample(Cell::from_row_col(1, 1)), None);
    }

    #[test]
    fn nodata_replacement() {
        let source = AnyRaster::from(
            DenseRaster::new(RasterSize::square(2), vec![1_i32, 15, i32::NODATA, 42]).expect("valid raster"),
        );

        let reclassification = Reclassification::Int {
            value_map: ValueMap::new().map(10, 100).map(20, 200),
            replace_nodata_with: Some(-1),
        };

        let result = reclassify_raster(&source, &reclassification, BoundaryStrategy::LessThanOrEqualTo);
        assert_eq!(result.sample(Cell::from_row_col(1, 0)), Some(-1.0));
    }

    #[test]
    fn float_reclassification() {
        let source = AnyRaster::from(
            DenseRaster::new(RasterSize::square(2), vec![0.5_f64, 1.5, f64::NAN, 9.0]).expect("valid raster"),
        );

        let reclassification = Reclassification::Float {
            value_map: ValueMap::new().map(1.0, 10.0).map(2.0, 20.0),
            replace_nodata_with: None,
        };

        let result = reclassify_raster(&source, &reclassification, BoundaryStrategy::LessThanOrEqualTo);

        assert_eq!(result.cell_type(), CellType::Float64);
        assert_eq!(result.sample(Cell::from_row_col(0, 0)), Some(10.0));
        assert_eq!(result.sample(Cell::from_row_col(0, 1)), Some(20.0));
        assert_eq!(result.sample(Cell::from_row_col(1, 0)), None);
        assert_eq!(result.sample(Cell::from_row_col(1, 1)), None);
    }

    #[test]
    fn grouped_and_scalar_reclassification_are_equivalent() {
        let source = AnyRaster::from(
            DenseRaster::new(RasterSize::square(2), vec![1_i32, 2, 3, 4]).expect("valid raster"),
        );

        let grouped = Reclassification::Int {
            value_map: ValueMap::new().map_group([1, 2, 3], 9),
            replace_nodata_with: None,
        };
        let scalar = Reclassification::Int {
            value_map: ValueMap::new().map(1, 9).map(2, 9).map(3, 9),
            replace_nodata_with: None,
        };

        assert_eq!(
            reclassify_raster(&source, &grouped, BoundaryStrategy::Exact),
            reclassify_raster(&source, &scalar, BoundaryStrategy::Exact)
        );
    }
}
