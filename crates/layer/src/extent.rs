//! World space rectangle used for raster extents and tile grids.

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

use crate::Point;

/// Axis aligned bounding rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    #[serde(rename = "xmin")]
    pub min_x: f64,
    #[serde(rename = "ymin")]
    pub min_y: f64,
    #[serde(rename = "xmax")]
    pub max_x: f64,
    #[serde(rename = "ymax")]
    pub max_y: f64,
}

impl Extent {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Extent {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_points(p1: Point, p2: Point) -> Self {
        Extent {
            min_x: p1.x().min(p2.x()),
            min_y: p1.y().min(p2.y()),
            max_x: p1.x().max(p2.x()),
            max_y: p1.y().max(p2.y()),
        }
    }

    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.max_y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.max_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// True when the point lies within the extent.
    /// The minimum edges are inclusive, the maximum edges exclusive, so a point
    /// on a shared edge belongs to exactly one of two adjacent extents.
    pub fn contains(&self, p: Point) -> bool {
        p.x() >= self.min_x && p.x() < self.max_x && p.y() >= self.min_y && p.y() < self.max_y
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        if !self.intersects(other) {
            return None;
        }

        Some(Extent {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// The minimal extent containing both extents.
    pub fn combine(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl AbsDiffEq for Extent {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.min_x.abs_diff_eq(&other.min_x, epsilon)
            && self.min_y.abs_diff_eq(&other.min_y, epsilon)
            && self.max_x.abs_diff_eq(&other.max_x, epsilon)
            && self.max_y.abs_diff_eq(&other.max_y, epsilon)
    }
}

impl RelativeEq for Extent {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.min_x.relative_eq(&other.min_x, epsilon, max_relative)
            && self.min_y.relative_eq(&other.min_y, epsilon, max_relative)
            && self.max_x.relative_eq(&other.max_x, epsilon, max_relative)
            && self.max_y.relative_eq(&other.max_y, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_the_union() {
        let e1 = Extent::new(0.0, 0.0, 4.0, 4.0);
        let e2 = Extent::new(3.0, 2.0, 7.0, 6.0);

        assert_eq!(e1.combine(&e2), Extent::new(0.0, 0.0, 7.0, 6.0));
        assert_eq!(e2.combine(&e1), e1.combine(&e2));
        assert_eq!(e1.combine(&e1), e1);
    }

    #[test]
    fn intersection() {
        let e1 = Extent::new(0.0, 0.0, 4.0, 4.0);
        let e2 = Extent::new(3.0, 2.0, 7.0, 6.0);

        assert_eq!(e1.intersection(&e2), Some(Extent::new(3.0, 2.0, 4.0, 4.0)));

        // adjacent extents do not intersect
        let e3 = Extent::new(4.0, 0.0, 8.0, 4.0);
        assert!(!e1.intersects(&e3));
        assert_eq!(e1.intersection(&e3), None);
    }

    #[test]
    fn contains_is_closed_open() {
        let e = Extent::new(0.0, 0.0, 4.0, 4.0);

        assert!(e.contains(Point::new(0.0, 0.0)));
        assert!(e.contains(Point::new(3.999, 3.999)));
        assert!(!e.contains(Point::new(4.0, 2.0)));
        assert!(!e.contains(Point::new(2.0, 4.0)));
        assert!(!e.contains(Point::new(-0.001, 2.0)));
    }

    #[test]
    fn json_wire_format() {
        let e = Extent::new(0.0, 0.0, 10.0, 6.0);
        let json = serde_json::to_value(e).expect("serializable");

        assert_eq!(json["xmin"], 0.0);
        assert_eq!(json["ymax"], 6.0);

        let back: Extent = serde_json::from_value(json).expect("deserializable");
        assert_eq!(back, e);
    }
}
