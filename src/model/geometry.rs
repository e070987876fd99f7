//! Planar and spatial primitives shared by the drawing model and the kernel.

use serde::{Deserialize, Serialize};

/// Point in the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Check if two points coincide within tolerance.
    pub fn approx_eq(&self, other: &Point2) -> bool {
        use crate::config::float_cmp::approx_eq;
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

/// Displacement in model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Straight segment in the drawing plane (z = 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point2,
    pub end: Point2,
}

impl LineSegment {
    /// Create a new segment.
    pub const fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }
}

/// Axis-aligned bounding box in the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub min: Point2,
    pub max: Point2,
}

impl Extents {
    /// Create extents from two corners, in any order.
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest extents containing all points, or `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point2>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.including(*p)))
    }

    /// Grow the extents to include a point.
    pub fn including(self, p: Point2) -> Self {
        Self {
            min: Point2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Crossing-window test: true if the boxes touch or overlap.
    pub fn overlaps(&self, other: &Extents) -> bool {
        use crate::config::EPS;
        self.min.x <= other.max.x + EPS
            && other.min.x <= self.max.x + EPS
            && self.min.y <= other.max.y + EPS
            && other.min.y <= self.max.y + EPS
    }

    /// The two corner-to-corner diagonals used to cross out a failed part.
    ///
    /// Top-left to bottom-right first, then bottom-left to top-right.
    pub fn diagonals(&self) -> [LineSegment; 2] {
        [
            LineSegment::new(
                Point2::new(self.min.x, self.max.y),
                Point2::new(self.max.x, self.min.y),
            ),
            LineSegment::new(self.min, self.max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_normalizes_corners() {
        let e = Extents::new(Point2::new(10.0, 0.0), Point2::new(0.0, 5.0));
        assert_eq!(e.min, Point2::new(0.0, 0.0));
        assert_eq!(e.max, Point2::new(10.0, 5.0));
        assert_eq!(e.width(), 10.0);
        assert_eq!(e.height(), 5.0);
    }

    #[test]
    fn test_extents_from_points() {
        let pts = [
            Point2::new(1.0, 2.0),
            Point2::new(-3.0, 4.0),
            Point2::new(5.0, -1.0),
        ];
        let e = Extents::from_points(&pts).unwrap();
        assert_eq!(e.min, Point2::new(-3.0, -1.0));
        assert_eq!(e.max, Point2::new(5.0, 4.0));
        assert!(Extents::from_points(&Vec::<Point2>::new()).is_none());
    }

    #[test]
    fn test_extents_overlap_includes_touching() {
        let a = Extents::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = Extents::new(Point2::new(10.0, 0.0), Point2::new(20.0, 10.0));
        let c = Extents::new(Point2::new(11.0, 0.0), Point2::new(20.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_diagonals_span_corners() {
        let e = Extents::new(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0));
        let [first, second] = e.diagonals();
        assert_eq!(first.start, Point2::new(0.0, 2.0));
        assert_eq!(first.end, Point2::new(4.0, 0.0));
        assert_eq!(second.start, Point2::new(0.0, 0.0));
        assert_eq!(second.end, Point2::new(4.0, 2.0));
    }
}
