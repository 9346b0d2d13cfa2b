//! Coordinate reference system identifiers.
//!
//! The crs is carried as an opaque identifier string, no reprojection happens
//! in this crate. Numeric EPSG codes are coerced to their decimal string form.

use serde::{Deserialize, Serialize};

use crate::Extent;

pub const WGS84: u32 = 4326;
pub const WGS84_WEB_MERCATOR: u32 = 3857;

const WEB_MERCATOR_HALF_CIRCUMFERENCE_M: f64 = 20_037_508.342_789_244;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(String);

impl Crs {
    pub fn new(definition: impl Into<String>) -> Self {
        Crs(definition.into())
    }

    pub fn from_epsg(code: u32) -> Self {
        Crs(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The EPSG code when the identifier is a plain or `EPSG:` prefixed code.
    pub fn epsg(&self) -> Option<u32> {
        let def = self.0.trim();
        let code = def.strip_prefix("EPSG:").or_else(|| def.strip_prefix("epsg:")).unwrap_or(def);
        code.parse().ok()
    }

    /// The world extent of the crs, used by the global layout scheme.
    /// Only known for a fixed set of EPSG codes.
    pub fn world_extent(&self) -> Option<Extent> {
        match self.epsg()? {
            WGS84 => Some(Extent::new(-180.0, -90.0, 180.0, 90.0)),
            WGS84_WEB_MERCATOR => Some(Extent::new(
                -WEB_MERCATOR_HALF_CIRCUMFERENCE_M,
                -WEB_MERCATOR_HALF_CIRCUMFERENCE_M,
                WEB_MERCATOR_HALF_CIRCUMFERENCE_M,
                WEB_MERCATOR_HALF_CIRCUMFERENCE_M,
            )),
            _ => None,
        }
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Crs::from_epsg(code)
    }
}

impl From<&str> for Crs {
    fn from(definition: &str) -> Self {
        Crs::new(definition)
    }
}

impl From<String> for Crs {
    fn from(definition: String) -> Self {
        Crs::new(definition)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_are_coerced_to_strings() {
        assert_eq!(Crs::from(4326_u32).as_str(), "4326");
        assert_eq!(Crs::from_epsg(3857).as_str(), "3857");
    }

    #[test]
    fn epsg_parsing() {
        assert_eq!(Crs::new("4326").epsg(), Some(4326));
        assert_eq!(Crs::new("EPSG:3857").epsg(), Some(3857));
        assert_eq!(Crs::new("epsg:3857").epsg(), Some(3857));
        assert_eq!(Crs::new("+proj=longlat +datum=WGS84").epsg(), None);
    }

    #[test]
    fn world_extents() {
        assert_eq!(
            Crs::from_epsg(WGS84).world_extent(),
            Some(Extent::new(-180.0, -90.0, 180.0, 90.0))
        );

        let mercator = Crs::new("EPSG:3857").world_extent().expect("known world extent");
        assert!(mercator.width() > 4.0e7);
        assert_eq!(Crs::new("+proj=custom").world_extent(), None);
    }
}
