//! Geometry primitives in source-frame pixel coordinates
//!
//! Core abstraction for the line of interest and the boxes reported by detectors.

mod intersect;

pub use intersect::{intersects, segments_intersect};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in source-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The line of interest, captured once per session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub p1: Point,
    pub p2: Point,
}

impl LineSegment {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Same segment with its endpoints swapped
    pub fn reversed(&self) -> Self {
        Self::new(self.p2, self.p1)
    }
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.p1, self.p2)
    }
}

/// Parses `x1,y1,x2,y2`
impl FromStr for LineSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid coordinate in '{}': {}", s, e))?;

        match values.as_slice() {
            [x1, y1, x2, y2] => Ok(Self::new(Point::new(*x1, *y1), Point::new(*x2, *y2))),
            _ => Err(format!("expected x1,y1,x2,y2 but got '{}'", s)),
        }
    }
}

/// Axis-aligned rectangle `(x1, y1)`-`(x2, y2)` with `x1 <= x2` and `y1 <= y2`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its corners
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create from top-left corner and size
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Finite coordinates and no negative extent
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }

    /// Closed-bounds containment test
    pub fn contains(&self, point: Point) -> bool {
        self.x1 <= point.x && point.x <= self.x2 && self.y1 <= point.y && point.y <= self.y2
    }

    /// Calculate intersection over union (IoU) with another box
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        intersection / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_validity() {
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(BoundingBox::new(5.0, 5.0, 5.0, 5.0).is_valid());
        assert!(!BoundingBox::new(10.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!BoundingBox::new(0.0, 10.0, 10.0, 0.0).is_valid());
        assert!(!BoundingBox::new(0.0, 0.0, f64::NAN, 10.0).is_valid());
    }

    #[test]
    fn test_box_iou() {
        let box1 = BoundingBox::from_xywh(0.0, 0.0, 10.0, 10.0);
        let box2 = BoundingBox::from_xywh(5.0, 5.0, 10.0, 10.0);

        let iou = box1.iou(&box2);
        assert!((iou - 25.0 / 175.0).abs() < 1e-9);
        assert_eq!(box1.iou(&BoundingBox::from_xywh(20.0, 20.0, 5.0, 5.0)), 0.0);
    }

    #[test]
    fn test_line_parsing() {
        let line: LineSegment = "10, 20,30,40".parse().unwrap();
        assert_eq!(line.p1, Point::new(10.0, 20.0));
        assert_eq!(line.p2, Point::new(30.0, 40.0));

        assert!("1,2,3".parse::<LineSegment>().is_err());
        assert!("1,2,x,4".parse::<LineSegment>().is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains(Point::new(0.0, 10.0)));
        assert!(!bbox.contains(Point::new(10.5, 5.0)));
    }
}
