//! Record keys for untiled and tiled layers.
//!
//! Untiled records are keyed by their projected extent, tiled records by their
//! grid coordinate. Both exist in a spatial and a spatial-temporal variant,
//! modeled as distinct types rather than a runtime flag.

use serde::{Deserialize, Serialize};

use crate::{Crs, Extent};

/// Grid coordinate of a tile, row 0 is the northern edge of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpatialKey {
    pub col: i32,
    pub row: i32,
}

impl SpatialKey {
    pub const fn new(col: i32, row: i32) -> Self {
        SpatialKey { col, row }
    }
}

impl PartialOrd for SpatialKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpatialKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl std::fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Timestamp in milliseconds. Zero is a valid instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeInstant(pub i64);

impl TimeInstant {
    pub const fn from_millis(millis: i64) -> Self {
        TimeInstant(millis)
    }

    pub const fn millis(self) -> i64 {
        self.0
    }
}

/// Grid coordinate of a tile combined with a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpaceTimeKey {
    pub col: i32,
    pub row: i32,
    pub instant: TimeInstant,
}

impl SpaceTimeKey {
    pub const fn new(col: i32, row: i32, instant: TimeInstant) -> Self {
        SpaceTimeKey { col, row, instant }
    }
}

impl PartialOrd for SpaceTimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpaceTimeKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row
            .cmp(&other.row)
            .then(self.col.cmp(&other.col))
            .then(self.instant.cmp(&other.instant))
    }
}

/// Key of a tiled layer record.
pub trait TileKey: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug {
    fn spatial(&self) -> SpatialKey;
    fn with_spatial(self, spatial: SpatialKey) -> Self;

    /// Componentwise minimum, used when folding key bounds.
    fn combine_min(self, other: Self) -> Self;
    /// Componentwise maximum, used when folding key bounds.
    fn combine_max(self, other: Self) -> Self;
}

impl TileKey for SpatialKey {
    fn spatial(&self) -> SpatialKey {
        *self
    }

    fn with_spatial(self, spatial: SpatialKey) -> Self {
        spatial
    }

    fn combine_min(self, other: Self) -> Self {
        SpatialKey::new(self.col.min(other.col), self.row.min(other.row))
    }

    fn combine_max(self, other: Self) -> Self {
        SpatialKey::new(self.col.max(other.col), self.row.max(other.row))
    }
}

impl TileKey for SpaceTimeKey {
    fn spatial(&self) -> SpatialKey {
        SpatialKey::new(self.col, self.row)
    }

    fn with_spatial(self, spatial: SpatialKey) -> Self {
        SpaceTimeKey::new(spatial.col, spatial.row, self.instant)
    }

    fn combine_min(self, other: Self) -> Self {
        SpaceTimeKey::new(
            self.col.min(other.col),
            self.row.min(other.row),
            self.instant.min(other.instant),
        )
    }

    fn combine_max(self, other: Self) -> Self {
        SpaceTimeKey::new(
            self.col.max(other.col),
            self.row.max(other.row),
            self.instant.max(other.instant),
        )
    }
}

/// Key of an untiled layer record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedExtent {
    pub extent: Extent,
    pub crs: Crs,
}

impl ProjectedExtent {
    pub fn new(extent: Extent, crs: impl Into<Crs>) -> Self {
        ProjectedExtent {
            extent,
            crs: crs.into(),
        }
    }
}

/// Key of an untiled layer record with a time component.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalProjectedExtent {
    pub extent: Extent,
    pub crs: Crs,
    pub instant: TimeInstant,
}

impl TemporalProjectedExtent {
    pub fn new(extent: Extent, crs: impl Into<Crs>, instant: TimeInstant) -> Self {
        TemporalProjectedExtent {
            extent,
            crs: crs.into(),
            instant,
        }
    }
}

/// Key of an untiled layer record, ties the record to the matching tiled key variant.
pub trait SourceKey: Clone + std::fmt::Debug {
    type Tiled: TileKey;

    fn extent(&self) -> &Extent;
    fn crs(&self) -> &Crs;

    /// The tiled key for a record landing in the given grid cell.
    fn tile_key(&self, spatial: SpatialKey) -> Self::Tiled;
}

impl SourceKey for ProjectedExtent {
    type Tiled = SpatialKey;

    fn extent(&self) -> &Extent {
        &self.extent
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn tile_key(&self, spatial: SpatialKey) -> SpatialKey {
        spatial
    }
}

impl SourceKey for TemporalProjectedExtent {
    type Tiled = SpaceTimeKey;

    fn extent(&self) -> &Extent {
        &self.extent
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn tile_key(&self, spatial: SpatialKey) -> SpaceTimeKey {
        SpaceTimeKey::new(spatial.col, spatial.row, self.instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spatial_key_ordering_is_row_major() {
        assert!(SpatialKey::new(5, 0) < SpatialKey::new(0, 1));
        assert!(SpatialKey::new(0, 1) < SpatialKey::new(1, 1));
    }

    #[test]
    fn key_bounds_combination() {
        let a = SpaceTimeKey::new(3, 1, TimeInstant(100));
        let b = SpaceTimeKey::new(1, 4, TimeInstant(50));

        assert_eq!(a.combine_min(b), SpaceTimeKey::new(1, 1, TimeInstant(50)));
        assert_eq!(a.combine_max(b), SpaceTimeKey::new(3, 4, TimeInstant(100)));
    }

    #[test]
    fn zero_instant_is_a_valid_timestamp() {
        let key = TemporalProjectedExtent::new(Extent::new(0.0, 0.0, 1.0, 1.0), 4326_u32, TimeInstant(0));
        assert_eq!(key.tile_key(SpatialKey::new(2, 3)), SpaceTimeKey::new(2, 3, TimeInstant(0)));
    }

    #[test]
    fn key_json_wire_format() {
        let json = serde_json::to_value(SpatialKey::new(2, 3)).expect("serializable");
        assert_eq!(json["col"], 2);
        assert_eq!(json["row"], 3);

        let json = serde_json::to_value(SpaceTimeKey::new(2, 3, TimeInstant(1000))).expect("serializable");
        assert_eq!(json["instant"], 1000);
    }
}
